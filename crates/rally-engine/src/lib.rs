//! The Rally domain consistency engine.
//!
//! [`Engine`] owns a [`CollectionStore`] and a [`Clock`] and exposes every
//! business operation: the activity lifecycle, roster registration, the order
//! workflow, comments, and accounts. Every mutation is a read of the whole
//! affected collection, an in-memory change, and a full write-back, performed
//! while holding that collection's lock so concurrent callers cannot lose
//! each other's updates or overfill a roster.
//!
//! Operations take the acting [`Principal`](rally_core::user::Principal)
//! explicitly. Business-rule failures come back as
//! [`Error::Violation`]; storage faults as [`Error::Storage`].

pub mod accounts;
pub mod activities;
pub mod comments;
pub mod error;
pub mod orders;
pub mod registration;
pub mod views;

mod collections;

use std::sync::Arc;

use chrono::{NaiveDateTime, SubsecRound as _};
use rally_core::{
  datetime::{Clock, SystemClock},
  store::CollectionStore,
};

use collections::CollectionLocks;

pub use error::{Error, Result};

/// The engine. One instance should own a given store; locks are not shared
/// between instances.
pub struct Engine<S> {
  store: Arc<S>,
  clock: Arc<dyn Clock>,
  locks: CollectionLocks,
}

impl<S: CollectionStore> Engine<S> {
  /// An engine reading the host's local time.
  pub fn new(store: Arc<S>) -> Self {
    Self::with_clock(store, Arc::new(SystemClock))
  }

  pub fn with_clock(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
    Self { store, clock, locks: CollectionLocks::default() }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  /// The current wall-clock time, truncated to whole seconds so that records
  /// compare equal before and after a persistence round-trip.
  pub fn now(&self) -> NaiveDateTime { self.clock.now().trunc_subsecs(0) }
}

#[cfg(test)]
mod tests;
