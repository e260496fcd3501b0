//! [`SqliteStore`]: the SQLite implementation of [`CollectionStore`].

use std::path::Path;

use rally_core::store::{Collection, CollectionStore};
use rusqlite::OptionalExtension as _;
use serde_json::Value;

use crate::{
  Result,
  encode::{decode_value, encode_now, encode_value},
  schema::SCHEMA,
};

const UPSERT: &str = "
INSERT INTO collections (name, value_json, updated_at)
VALUES (?1, ?2, ?3)
ON CONFLICT(name) DO UPDATE SET
  value_json = excluded.value_json,
  updated_at = excluded.updated_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rally collection store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Names of every collection that has been written at least once.
  pub async fn collection_names(&self) -> Result<Vec<String>> {
    let names = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT name FROM collections ORDER BY name")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(names)
  }
}

// ─── CollectionStore impl ────────────────────────────────────────────────────

impl CollectionStore for SqliteStore {
  type Error = crate::Error;

  async fn read(&self, collection: Collection) -> Result<Option<Value>> {
    let key = collection.key();

    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value_json FROM collections WHERE name = ?1",
              rusqlite::params![key],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .as_deref()
      .map(|s| decode_value(collection, s))
      .transpose()
  }

  async fn write(&self, collection: Collection, value: Value) -> Result<()> {
    let key    = collection.key();
    let json   = encode_value(&value);
    let at_str = encode_now();

    self
      .conn
      .call(move |conn| {
        conn.execute(UPSERT, rusqlite::params![key, json, at_str])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn write_batch(&self, writes: Vec<(Collection, Value)>) -> Result<()> {
    let rows: Vec<(&'static str, String)> = writes
      .iter()
      .map(|(collection, value)| (collection.key(), encode_value(value)))
      .collect();
    let at_str = encode_now();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for (key, json) in &rows {
          tx.execute(UPSERT, rusqlite::params![key, json, at_str])?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
