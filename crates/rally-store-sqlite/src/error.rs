//! Error type for `rally-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error in collection {collection}: {source}")]
  Json {
    collection: &'static str,
    #[source]
    source:     serde_json::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
