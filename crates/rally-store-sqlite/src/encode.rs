//! Encoding helpers between collection documents and the text columns they
//! are stored in.
//!
//! Documents are stored as compact JSON. `updated_at` uses the same
//! `YYYY-MM-DD HH:MM:SS` local-time format as the records themselves.

use chrono::Local;
use rally_core::{datetime::format_timestamp, store::Collection};
use serde_json::Value;

use crate::{Error, Result};

pub fn encode_value(value: &Value) -> String { value.to_string() }

pub fn decode_value(collection: Collection, raw: &str) -> Result<Value> {
  serde_json::from_str(raw).map_err(|source| Error::Json {
    collection: collection.key(),
    source,
  })
}

pub fn encode_now() -> String { format_timestamp(Local::now().naive_local()) }
