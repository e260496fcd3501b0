//! The business-rule error taxonomy shared by every engine module.
//!
//! A [`Violation`] is an expected, caller-recoverable outcome. Infrastructure
//! faults are not represented here; they belong to the storage backend's own
//! error type.

use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

/// Which rule a rejected operation ran into.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
)]
pub enum ErrorKind {
  /// Malformed or missing input.
  ValidationError,
  /// Unknown id.
  NotFoundError,
  /// The acting principal lacks permission.
  AuthorizationError,
  /// Duplicate, or already in the requested state.
  ConflictError,
  /// The roster is full.
  CapacityError,
  /// Not legal for the current derived or explicit state.
  InvalidStateError,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct Violation {
  #[serde(rename = "errorKind")]
  pub kind:    ErrorKind,
  pub message: String,
}

impl Violation {
  pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
    Self { kind, message: message.into() }
  }

  pub fn validation(message: impl Into<String>) -> Self {
    Self::new(ErrorKind::ValidationError, message)
  }

  pub fn not_found(message: impl Into<String>) -> Self {
    Self::new(ErrorKind::NotFoundError, message)
  }

  pub fn unauthorized(message: impl Into<String>) -> Self {
    Self::new(ErrorKind::AuthorizationError, message)
  }

  pub fn conflict(message: impl Into<String>) -> Self {
    Self::new(ErrorKind::ConflictError, message)
  }

  pub fn capacity(message: impl Into<String>) -> Self {
    Self::new(ErrorKind::CapacityError, message)
  }

  pub fn invalid_state(message: impl Into<String>) -> Self {
    Self::new(ErrorKind::InvalidStateError, message)
  }
}
