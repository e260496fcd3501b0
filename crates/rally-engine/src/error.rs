//! Error type for `rally-engine`.

use rally_core::{ErrorKind, Violation, store::Collection};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// An expected business-rule outcome the caller should show and recover
  /// from.
  #[error(transparent)]
  Violation(#[from] Violation),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("stored {collection} collection could not be decoded: {source}")]
  Corrupt {
    collection: Collection,
    #[source]
    source:     serde_json::Error,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("password hashing failed: {0}")]
  PasswordHash(String),
}

impl Error {
  pub fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(err))
  }

  /// The business-rule kind, or `None` for an infrastructure fault.
  pub fn kind(&self) -> Option<ErrorKind> {
    match self {
      Self::Violation(v) => Some(v.kind),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
