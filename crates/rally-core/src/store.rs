//! The `CollectionStore` trait: the persistence collaborator.
//!
//! The store is a plain key-value map of named collections. Each collection is
//! read and written as one whole JSON document; no querying is pushed down to
//! storage. Higher layers (`rally-engine`) depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use serde_json::Value;
use strum::{Display, EnumIter};

/// The named collections the engine persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Collection {
  Users,
  Activities,
  Orders,
  Comments,
}

impl Collection {
  /// The storage key. These match the keys existing stored data was written
  /// under and must not change.
  pub fn key(self) -> &'static str {
    match self {
      Self::Users => "sports_activity_users",
      Self::Activities => "sports_activity_activities",
      Self::Orders => "sports_activity_orders",
      Self::Comments => "sports_activity_comments",
    }
  }
}

/// Abstraction over a key-value collection backend.
///
/// There are no partial updates: a write replaces the whole collection. The
/// store makes no attempt to serialise writers; callers that read, modify and
/// write back must hold their own exclusion.
pub trait CollectionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read a whole collection. `None` if it has never been written.
  fn read(
    &self,
    collection: Collection,
  ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send + '_;

  /// Replace a whole collection.
  fn write(
    &self,
    collection: Collection,
    value: Value,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Replace several collections at once. Either every write lands or none
  /// does.
  fn write_batch(
    &self,
    writes: Vec<(Collection, Value)>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
