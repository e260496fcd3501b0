//! The success half of the uniform result shape: `{"ok": true, ...}`.

use std::collections::BTreeMap;

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Success<T> {
  ok:   bool,
  #[serde(flatten)]
  body: T,
}

/// Flatten `body`'s fields next to `"ok": true`. `body` must serialize as a
/// map or struct.
pub fn ok<T: Serialize>(body: T) -> Json<Success<T>> {
  Json(Success { ok: true, body })
}

/// `{"ok": true, "<key>": value}`.
pub fn keyed<T: Serialize>(
  key: &'static str,
  value: T,
) -> Json<Success<BTreeMap<&'static str, T>>> {
  ok(BTreeMap::from([(key, value)]))
}

/// `{"ok": true, "message": "..."}` for operations with nothing to return.
pub fn done(
  message: &'static str,
) -> Json<Success<BTreeMap<&'static str, &'static str>>> {
  keyed("message", message)
}
