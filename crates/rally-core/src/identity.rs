//! The identity lookup the read-side projections are written against.

use std::collections::HashMap;

use uuid::Uuid;

use crate::user::{PublicUser, User};

/// Resolves user ids to sanitized user records.
pub trait Identity {
  fn user_by_id(&self, id: Uuid) -> Option<&PublicUser>;
}

/// A point-in-time snapshot of the Users collection, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
  users: HashMap<Uuid, PublicUser>,
}

impl UserDirectory {
  pub fn new(users: impl IntoIterator<Item = PublicUser>) -> Self {
    Self { users: users.into_iter().map(|u| (u.id, u)).collect() }
  }

  pub fn from_users(users: &[User]) -> Self {
    Self::new(users.iter().map(User::sanitized))
  }

  pub fn len(&self) -> usize { self.users.len() }

  pub fn is_empty(&self) -> bool { self.users.is_empty() }
}

impl Identity for UserDirectory {
  fn user_by_id(&self, id: Uuid) -> Option<&PublicUser> { self.users.get(&id) }
}
