//! Users, their sanitized projection, and the acting principal.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::datetime::timestamp;

/// A stored account. `password` holds an argon2 PHC string and never leaves
/// the engine; everything outward-facing uses [`PublicUser`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id:            Uuid,
  pub username:      String,
  pub email:         String,
  pub password:      String,
  #[serde(default)]
  pub phone:         String,
  #[serde(with = "timestamp")]
  pub register_time: NaiveDateTime,
}

impl User {
  pub fn sanitized(&self) -> PublicUser {
    PublicUser {
      id:            self.id,
      username:      self.username.clone(),
      email:         self.email.clone(),
      phone:         self.phone.clone(),
      register_time: self.register_time,
    }
  }

  pub fn principal(&self) -> Principal {
    Principal { user_id: self.id, username: self.username.clone() }
  }
}

/// A user record with no secret fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
  pub id:            Uuid,
  pub username:      String,
  pub email:         String,
  #[serde(default)]
  pub phone:         String,
  #[serde(with = "timestamp")]
  pub register_time: NaiveDateTime,
}

/// The authenticated caller of a mutating operation. Passed explicitly into
/// every engine call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
  pub user_id:  Uuid,
  pub username: String,
}
