//! Wall-clock handling: the persisted date/time text formats and the
//! [`Clock`] seam every status derivation reads "now" from.
//!
//! All times are naive local wall-clock values. Activities are scheduled as a
//! calendar date plus an `HH:mm` time, and audit timestamps are stored as
//! `YYYY-MM-DD HH:mm:ss`.

use std::sync::{Mutex, PoisonError};

use chrono::{Local, NaiveDateTime, NaiveTime, TimeDelta};

/// Format of every persisted audit timestamp (`createTime`, `updateTime`, ...).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format of an activity's scheduled start time.
pub const CLOCK_TIME_FORMAT: &str = "%H:%M";

pub fn format_timestamp(at: NaiveDateTime) -> String {
  at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_clock_time(time: NaiveTime) -> String {
  time.format(CLOCK_TIME_FORMAT).to_string()
}

/// Parse `HH:mm`, tolerating a trailing `:ss`.
pub fn parse_clock_time(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
  NaiveTime::parse_from_str(raw, CLOCK_TIME_FORMAT)
    .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
}

// ─── Clock ───────────────────────────────────────────────────────────────────

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
  fn now(&self) -> NaiveDateTime;
}

/// The host's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> NaiveDateTime { Local::now().naive_local() }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
  now: Mutex<NaiveDateTime>,
}

impl ManualClock {
  pub fn new(now: NaiveDateTime) -> Self { Self { now: Mutex::new(now) } }

  pub fn set(&self, now: NaiveDateTime) {
    *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
  }

  pub fn advance(&self, by: TimeDelta) {
    let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
    *now += by;
  }
}

impl Clock for ManualClock {
  fn now(&self) -> NaiveDateTime {
    *self.now.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

// ─── Serde adapters ──────────────────────────────────────────────────────────

/// `#[serde(with = "timestamp")]` for `YYYY-MM-DD HH:mm:ss` fields.
pub mod timestamp {
  use chrono::NaiveDateTime;
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  use super::TIMESTAMP_FORMAT;

  pub fn serialize<S: Serializer>(
    at: &NaiveDateTime,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&at.format(TIMESTAMP_FORMAT))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT)
      .map_err(D::Error::custom)
  }
}

/// `#[serde(with = "clock_time")]` for `HH:mm` fields.
pub mod clock_time {
  use chrono::NaiveTime;
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  use super::{CLOCK_TIME_FORMAT, parse_clock_time};

  pub fn serialize<S: Serializer>(
    time: &NaiveTime,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format(CLOCK_TIME_FORMAT))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<NaiveTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_clock_time(&raw).map_err(D::Error::custom)
  }

  /// The same format for optional input fields; pair with `#[serde(default)]`.
  pub mod option {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    use super::super::{CLOCK_TIME_FORMAT, parse_clock_time};

    pub fn serialize<S: Serializer>(
      time: &Option<NaiveTime>,
      serializer: S,
    ) -> Result<S::Ok, S::Error> {
      match time {
        Some(t) => serializer.collect_str(&t.format(CLOCK_TIME_FORMAT)),
        None => serializer.serialize_none(),
      }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
      deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
      Option::<String>::deserialize(deserializer)?
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_clock_time(raw.trim()).map_err(D::Error::custom))
        .transpose()
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  #[test]
  fn clock_time_accepts_seconds() {
    let t = parse_clock_time("09:30:15").unwrap();
    assert_eq!(format_clock_time(t), "09:30");
    assert!(parse_clock_time("9h30").is_err());
  }

  #[test]
  fn manual_clock_advances() {
    let start = NaiveDate::from_ymd_opt(2025, 3, 1)
      .unwrap()
      .and_hms_opt(10, 0, 0)
      .unwrap();
    let clock = ManualClock::new(start);
    clock.advance(TimeDelta::minutes(90));
    assert_eq!(format_timestamp(clock.now()), "2025-03-01 11:30:00");
  }
}
