//! Comments, replies and likes scoped to an activity.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Violation, datetime::timestamp, validation::check_len};

pub const COMMENT_MAX_CHARS: usize = 500;
pub const REPLY_MAX_CHARS: usize = 300;

/// The persisted shape of the Comments collection: each activity's comments,
/// keyed by activity id.
pub type CommentBook = BTreeMap<Uuid, Vec<Comment>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
  pub id:          Uuid,
  pub author_id:   Uuid,
  pub content:     String,
  #[serde(with = "timestamp")]
  pub create_time: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
  pub id:          Uuid,
  pub activity_id: Uuid,
  pub author_id:   Uuid,
  pub content:     String,
  #[serde(with = "timestamp")]
  pub create_time: NaiveDateTime,
  #[serde(default)]
  pub likes:       Vec<Uuid>,
  /// Append-only; insertion order is display order.
  #[serde(default)]
  pub replies:     Vec<Reply>,
}

impl Comment {
  /// Flip `user_id`'s like. Returns whether the user now likes the comment.
  pub fn toggle_like(&mut self, user_id: Uuid) -> bool {
    if let Some(pos) = self.likes.iter().position(|id| *id == user_id) {
      self.likes.remove(pos);
      false
    } else {
      self.likes.push(user_id);
      true
    }
  }
}

/// Trim comment or reply text and enforce its length bounds.
pub fn check_content(
  what: &str,
  raw: &str,
  max: usize,
) -> Result<String, Violation> {
  let content = raw.trim();
  if content.is_empty() {
    return Err(Violation::validation(format!("{what} cannot be empty")));
  }
  check_len(what, content, 1, max)?;
  Ok(content.to_owned())
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn comment() -> Comment {
    Comment {
      id:          Uuid::new_v4(),
      activity_id: Uuid::new_v4(),
      author_id:   Uuid::new_v4(),
      content:     "count me in".into(),
      create_time: NaiveDate::from_ymd_opt(2025, 2, 2)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap(),
      likes:       Vec::new(),
      replies:     Vec::new(),
    }
  }

  #[test]
  fn like_toggle_is_an_involution() {
    let mut c = comment();
    let user = Uuid::new_v4();
    assert!(c.toggle_like(user));
    assert_eq!(c.likes, vec![user]);
    assert!(!c.toggle_like(user));
    assert!(c.likes.is_empty());
  }

  #[test]
  fn content_bounds() {
    assert_eq!(check_content("comment", "  hi  ", 500).unwrap(), "hi");
    assert!(check_content("comment", "   ", 500).is_err());
    assert!(check_content("reply", &"x".repeat(301), REPLY_MAX_CHARS).is_err());
    assert!(check_content("reply", &"x".repeat(300), REPLY_MAX_CHARS).is_ok());
  }
}
