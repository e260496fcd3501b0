//! SQL schema for the Rally SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per named collection. The whole collection is one JSON document
-- and is always replaced as a unit.
CREATE TABLE IF NOT EXISTS collections (
    name        TEXT PRIMARY KEY,  -- storage key, e.g. 'sports_activity_orders'
    value_json  TEXT NOT NULL,
    updated_at  TEXT NOT NULL      -- YYYY-MM-DD HH:MM:SS, local time
);

PRAGMA user_version = 1;
";
