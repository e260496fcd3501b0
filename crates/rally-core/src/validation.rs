//! Field-level input rules shared by activity, comment and account input.
//!
//! Lengths are counted in characters, not bytes, so CJK titles and usernames
//! are measured the way a user reads them.

use std::sync::LazyLock;

use regex::Regex;

use crate::Violation;

static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[a-zA-Z0-9_\x{4e00}-\x{9fa5}]+$").expect("valid username regex")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex")
});

static PHONE_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^1[3-9][0-9]{9}$").expect("valid phone regex"));

pub const USERNAME_CHARS: (usize, usize) = (3, 20);
pub const PASSWORD_CHARS: (usize, usize) = (6, 50);

pub fn char_len(value: &str) -> usize { value.chars().count() }

/// Require `value` to be between `min` and `max` characters inclusive.
pub fn check_len(
  field: &str,
  value: &str,
  min: usize,
  max: usize,
) -> Result<(), Violation> {
  let len = char_len(value);
  if len < min {
    return Err(Violation::validation(format!(
      "{field} must be at least {min} characters"
    )));
  }
  if len > max {
    return Err(Violation::validation(format!(
      "{field} must be at most {max} characters"
    )));
  }
  Ok(())
}

/// Trim `raw` and treat an all-whitespace value as absent.
pub fn non_blank(raw: Option<String>) -> Option<String> {
  raw
    .map(|s| s.trim().to_owned())
    .filter(|s| !s.is_empty())
}

pub fn check_username(username: &str) -> Result<(), Violation> {
  check_len("username", username, USERNAME_CHARS.0, USERNAME_CHARS.1)?;
  if !USERNAME_RE.is_match(username) {
    return Err(Violation::validation(
      "username may only contain letters, digits, underscores and CJK characters",
    ));
  }
  Ok(())
}

pub fn check_email(email: &str) -> Result<(), Violation> {
  if !EMAIL_RE.is_match(email) {
    return Err(Violation::validation("email address is not valid"));
  }
  Ok(())
}

pub fn check_password(password: &str) -> Result<(), Violation> {
  check_len("password", password, PASSWORD_CHARS.0, PASSWORD_CHARS.1)
}

/// Mainland mobile number: 11 digits starting with `1[3-9]`.
pub fn check_phone(phone: &str) -> Result<(), Violation> {
  if !PHONE_RE.is_match(phone) {
    return Err(Violation::validation("phone number is not valid"));
  }
  Ok(())
}
