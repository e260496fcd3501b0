//! Accounts: registration, credential checks, and the identity lookups the
//! rest of the engine projects through.
//!
//! Passwords are stored as argon2 PHC strings.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rally_core::{
  Violation,
  store::{Collection, CollectionStore},
  user::{Principal, PublicUser, User},
  validation::{
    check_email, check_password, check_phone, check_username, non_blank,
  },
};
use rand_core::OsRng;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::{Engine, Error, Result};

/// Input to [`Engine::register`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
  pub username: String,
  pub email:    String,
  pub password: String,
  #[serde(default)]
  pub phone:    Option<String>,
}

pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc).is_ok_and(|parsed| {
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok()
  })
}

fn bad_credentials() -> Error {
  Violation::unauthorized("invalid username or password").into()
}

impl<S: CollectionStore> Engine<S> {
  pub async fn register(&self, input: NewAccount) -> Result<PublicUser> {
    let username = input.username.trim().to_owned();
    let email = input.email.trim().to_owned();
    let phone = non_blank(input.phone).unwrap_or_default();

    check_username(&username)?;
    check_email(&email)?;
    check_password(&input.password)?;
    if !phone.is_empty() {
      check_phone(&phone)?;
    }

    let _guard = self.locks.users.lock().await;
    let mut users = self.users().await?;
    if users
      .iter()
      .any(|u| u.username == username || u.email.eq_ignore_ascii_case(&email))
    {
      return Err(Violation::conflict("username or email is already taken").into());
    }

    let user = User {
      id: Uuid::new_v4(),
      username,
      email,
      password: hash_password(&input.password)?,
      phone,
      register_time: self.now(),
    };
    users.push(user.clone());
    self.save(Collection::Users, &users).await?;

    info!(user_id = %user.id, username = %user.username, "account registered");
    Ok(user.sanitized())
  }

  /// Resolve `login` (username or email) and `password` to a principal.
  pub async fn authenticate(&self, login: &str, password: &str) -> Result<Principal> {
    let login = login.trim();
    if login.is_empty() || password.is_empty() {
      return Err(bad_credentials());
    }

    let users = self.users().await?;
    let user = users
      .iter()
      .find(|u| u.username == login || u.email.eq_ignore_ascii_case(login))
      .ok_or_else(bad_credentials)?;

    if !verify_password(password, &user.password) {
      return Err(bad_credentials());
    }
    Ok(user.principal())
  }

  pub async fn change_password(
    &self,
    principal: &Principal,
    old_password: &str,
    new_password: &str,
  ) -> Result<()> {
    check_password(new_password)?;

    let _guard = self.locks.users.lock().await;
    let mut users = self.users().await?;
    let user = users
      .iter_mut()
      .find(|u| u.id == principal.user_id)
      .ok_or_else(|| Violation::not_found("user not found"))?;

    if !verify_password(old_password, &user.password) {
      return Err(Violation::unauthorized("current password is incorrect").into());
    }
    user.password = hash_password(new_password)?;
    self.save(Collection::Users, &users).await?;

    info!(user_id = %principal.user_id, "password changed");
    Ok(())
  }

  pub async fn user_by_id(&self, id: Uuid) -> Result<Option<PublicUser>> {
    Ok(
      self
        .users()
        .await?
        .iter()
        .find(|u| u.id == id)
        .map(User::sanitized),
    )
  }

  pub async fn all_users(&self) -> Result<Vec<PublicUser>> {
    Ok(self.users().await?.iter().map(User::sanitized).collect())
  }
}
