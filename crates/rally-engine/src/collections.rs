//! Typed whole-collection accessors over the store, and the locks that
//! serialise read-modify-write cycles.
//!
//! Because every write replaces a whole collection, the collection itself is
//! the unit of exclusion: two writers on different activities would still
//! clobber each other if they only locked their own activity. Locks are
//! always taken in declaration order (users, activities, orders, comments).

use rally_core::{
  activity::Activity,
  comment::CommentBook,
  identity::UserDirectory,
  order::Order,
  store::{Collection, CollectionStore},
  user::User,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{Engine, Error, Result};

#[derive(Debug, Default)]
pub(crate) struct CollectionLocks {
  pub users:      Mutex<()>,
  pub activities: Mutex<()>,
  pub orders:     Mutex<()>,
  pub comments:   Mutex<()>,
}

impl<S: CollectionStore> Engine<S> {
  async fn load<T>(&self, collection: Collection) -> Result<T>
  where
    T: DeserializeOwned + Default,
  {
    let raw = self
      .store
      .read(collection)
      .await
      .map_err(Error::storage)?;

    match raw {
      None | Some(Value::Null) => Ok(T::default()),
      Some(value) => serde_json::from_value(value)
        .map_err(|source| Error::Corrupt { collection, source }),
    }
  }

  pub(crate) async fn save<T>(&self, collection: Collection, value: &T) -> Result<()>
  where
    T: Serialize + Sync,
  {
    let value = serde_json::to_value(value)?;
    self
      .store
      .write(collection, value)
      .await
      .map_err(Error::storage)
  }

  /// Persist activities and orders together.
  pub(crate) async fn save_activities_and_orders(
    &self,
    activities: &[Activity],
    orders: &[Order],
  ) -> Result<()> {
    let writes = vec![
      (Collection::Activities, serde_json::to_value(activities)?),
      (Collection::Orders, serde_json::to_value(orders)?),
    ];
    self
      .store
      .write_batch(writes)
      .await
      .map_err(Error::storage)
  }

  // ── Snapshots ─────────────────────────────────────────────────────────────

  pub(crate) async fn users(&self) -> Result<Vec<User>> {
    self.load(Collection::Users).await
  }

  /// Every stored activity, in creation order.
  pub async fn activities(&self) -> Result<Vec<Activity>> {
    self.load(Collection::Activities).await
  }

  /// Every stored order, in creation order.
  pub async fn orders(&self) -> Result<Vec<Order>> {
    self.load(Collection::Orders).await
  }

  /// Every stored comment, grouped by activity id.
  pub async fn comment_book(&self) -> Result<CommentBook> {
    self.load(Collection::Comments).await
  }

  /// A fresh identity snapshot for read-side projection.
  pub async fn directory(&self) -> Result<UserDirectory> {
    Ok(UserDirectory::from_users(&self.users().await?))
  }
}
