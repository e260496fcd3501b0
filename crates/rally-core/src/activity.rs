//! Activities: the scheduled, capacity-bounded events members join.
//!
//! An activity's lifecycle status is never stored. It is a pure function of
//! the scheduled start and the current wall-clock time, computed on every
//! read by [`compute_status`].

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{
  Violation,
  datetime::{clock_time, timestamp},
  validation::{check_len, char_len, non_blank},
};

/// How long an activity counts as `ongoing` after its start.
pub const RUN_LENGTH_HOURS: i64 = 2;

/// Latest calendar year an activity may be scheduled in. Keeps dates in the
/// four-digit `YYYY-MM-DD` form.
pub const MAX_YEAR: i32 = 9999;

/// Upper bound on `maxParticipants`.
pub const MAX_PARTICIPANTS_LIMIT: u32 = 100;

const TITLE_CHARS: (usize, usize) = (2, 50);
const LOCATION_CHARS: (usize, usize) = (2, 100);
const DESCRIPTION_MAX_CHARS: usize = 500;
const RULES_MAX_CHARS: usize = 300;

// ─── Enums ───────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActivityType {
  Basketball,
  Football,
  Badminton,
  Yoga,
  Swimming,
  Tennis,
  Other,
}

/// Derived lifecycle state. See [`compute_status`].
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ActivityStatus {
  Upcoming,
  Ongoing,
  Finished,
}

/// Partition time around an activity's start into three contiguous intervals:
/// `[.., start)` upcoming, `[start, start + 2h)` ongoing, `[start + 2h, ..)`
/// finished. A start too late to add the run length to never finishes.
pub fn compute_status(
  date: NaiveDate,
  time: NaiveTime,
  now: NaiveDateTime,
) -> ActivityStatus {
  let start = date.and_time(time);
  let end = start.checked_add_signed(TimeDelta::hours(RUN_LENGTH_HOURS));
  if now < start {
    ActivityStatus::Upcoming
  } else if end.is_none_or(|end| now < end) {
    ActivityStatus::Ongoing
  } else {
    ActivityStatus::Finished
  }
}

// ─── Activity ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
  pub id:               Uuid,
  pub title:            String,
  #[serde(rename = "type")]
  pub kind:             ActivityType,
  #[serde(default)]
  pub description:      String,
  pub date:             NaiveDate,
  #[serde(with = "clock_time")]
  pub time:             NaiveTime,
  pub location:         String,
  pub max_participants: u32,
  /// Registration order is preserved.
  #[serde(default)]
  pub participants:     Vec<Uuid>,
  pub creator_id:       Uuid,
  #[serde(default)]
  pub rules:            String,
  #[serde(with = "timestamp")]
  pub create_time:      NaiveDateTime,
}

impl Activity {
  pub fn starts_at(&self) -> NaiveDateTime { self.date.and_time(self.time) }

  pub fn status_at(&self, now: NaiveDateTime) -> ActivityStatus {
    compute_status(self.date, self.time, now)
  }

  pub fn has_participant(&self, user_id: Uuid) -> bool {
    self.participants.contains(&user_id)
  }

  pub fn is_full(&self) -> bool {
    self.participants.len() >= self.max_participants as usize
  }

  pub fn remaining_slots(&self) -> u32 {
    self
      .max_participants
      .saturating_sub(self.participants.len() as u32)
  }

  /// Check every field-level rule that applies to a stored activity. Used on
  /// creation and again after a patch is merged.
  fn check_fields(&self, now: NaiveDateTime) -> Result<(), Violation> {
    check_len("title", &self.title, TITLE_CHARS.0, TITLE_CHARS.1)?;
    check_len("location", &self.location, LOCATION_CHARS.0, LOCATION_CHARS.1)?;
    if char_len(&self.description) > DESCRIPTION_MAX_CHARS {
      return Err(Violation::validation(format!(
        "description must be at most {DESCRIPTION_MAX_CHARS} characters"
      )));
    }
    if char_len(&self.rules) > RULES_MAX_CHARS {
      return Err(Violation::validation(format!(
        "rules must be at most {RULES_MAX_CHARS} characters"
      )));
    }
    if self.date.year() > MAX_YEAR {
      return Err(Violation::validation(format!(
        "date must not be later than the year {MAX_YEAR}"
      )));
    }
    if self.starts_at() < now {
      return Err(Violation::validation(
        "activity start cannot be earlier than the current time",
      ));
    }
    Ok(())
  }
}

fn check_max_participants(raw: i64) -> Result<u32, Violation> {
  if raw < 1 {
    return Err(Violation::validation(
      "maxParticipants must be at least 1",
    ));
  }
  if raw > i64::from(MAX_PARTICIPANTS_LIMIT) {
    return Err(Violation::validation(format!(
      "maxParticipants must be at most {MAX_PARTICIPANTS_LIMIT}"
    )));
  }
  Ok(raw as u32)
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// Input to activity creation. Every field is optional at the type level so
/// that absent input surfaces as a `ValidationError` rather than a decode
/// failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
  pub title:            Option<String>,
  #[serde(rename = "type")]
  pub kind:             Option<ActivityType>,
  pub description:      Option<String>,
  pub rules:            Option<String>,
  pub date:             Option<NaiveDate>,
  #[serde(default, with = "clock_time::option")]
  pub time:             Option<NaiveTime>,
  pub location:         Option<String>,
  pub max_participants: Option<i64>,
}

impl NewActivity {
  /// Validate the input and build the stored record with an empty roster.
  pub fn into_activity(
    self,
    id: Uuid,
    creator_id: Uuid,
    now: NaiveDateTime,
  ) -> Result<Activity, Violation> {
    let (
      Some(title),
      Some(kind),
      Some(date),
      Some(time),
      Some(location),
      Some(max_participants),
    ) = (
      non_blank(self.title),
      self.kind,
      self.date,
      self.time,
      non_blank(self.location),
      self.max_participants,
    )
    else {
      return Err(Violation::validation(
        "title, type, date, time, location and maxParticipants are required",
      ));
    };

    let activity = Activity {
      id,
      title,
      kind,
      description: self.description.unwrap_or_default().trim().to_owned(),
      date,
      time,
      location,
      max_participants: check_max_participants(max_participants)?,
      participants: Vec::new(),
      creator_id,
      rules: self.rules.unwrap_or_default().trim().to_owned(),
      create_time: now,
    };
    activity.check_fields(now)?;
    Ok(activity)
  }
}

/// A shallow patch over the editable fields of an [`Activity`]. Identity,
/// roster, creator and creation time are not patchable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPatch {
  pub title:            Option<String>,
  #[serde(rename = "type")]
  pub kind:             Option<ActivityType>,
  pub description:      Option<String>,
  pub rules:            Option<String>,
  pub date:             Option<NaiveDate>,
  #[serde(default, with = "clock_time::option")]
  pub time:             Option<NaiveTime>,
  pub location:         Option<String>,
  pub max_participants: Option<i64>,
}

impl ActivityPatch {
  /// Merge onto `current`, returning the updated record.
  pub fn apply(
    self,
    current: &Activity,
    now: NaiveDateTime,
  ) -> Result<Activity, Violation> {
    let mut next = current.clone();

    if let Some(raw) = self.max_participants {
      if raw < current.participants.len() as i64 {
        return Err(Violation::validation(format!(
          "maxParticipants cannot be lower than the {} registered participants",
          current.participants.len()
        )));
      }
      next.max_participants = check_max_participants(raw)?;
    }
    if let Some(title) = self.title {
      next.title = title.trim().to_owned();
    }
    if let Some(kind) = self.kind {
      next.kind = kind;
    }
    if let Some(description) = self.description {
      next.description = description.trim().to_owned();
    }
    if let Some(rules) = self.rules {
      next.rules = rules.trim().to_owned();
    }
    if let Some(date) = self.date {
      next.date = date;
    }
    if let Some(time) = self.time {
      next.time = time;
    }
    if let Some(location) = self.location {
      next.location = location.trim().to_owned();
    }

    next.check_fields(now)?;
    Ok(next)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ErrorKind;

  fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
      .unwrap()
      .and_hms_opt(h, min, s)
      .unwrap()
  }

  fn input(now: NaiveDateTime) -> NewActivity {
    let start = now + TimeDelta::days(1);
    NewActivity {
      title:            Some("Sunday pickup".into()),
      kind:             Some(ActivityType::Basketball),
      description:      None,
      rules:            None,
      date:             Some(start.date()),
      time:             Some(start.time()),
      location:         Some("North court".into()),
      max_participants: Some(10),
    }
  }

  #[test]
  fn status_partitions_at_boundaries() {
    let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let time = NaiveTime::from_hms_opt(18, 0, 0).unwrap();

    let cases = [
      (at(2025, 6, 1, 17, 59, 59), ActivityStatus::Upcoming),
      (at(2025, 6, 1, 18, 0, 0), ActivityStatus::Ongoing),
      (at(2025, 6, 1, 19, 59, 59), ActivityStatus::Ongoing),
      (at(2025, 6, 1, 20, 0, 0), ActivityStatus::Finished),
      (at(2025, 6, 2, 9, 0, 0), ActivityStatus::Finished),
    ];
    for (now, expected) in cases {
      assert_eq!(compute_status(date, time, now), expected, "at {now}");
    }
  }

  #[test]
  fn status_is_monotonic_over_time() {
    let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let time = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
    let mut now = at(2025, 6, 1, 15, 0, 0);
    let mut last = ActivityStatus::Upcoming;
    while now < at(2025, 6, 1, 23, 0, 0) {
      let status = compute_status(date, time, now);
      assert!(status >= last);
      last = status;
      now += TimeDelta::minutes(7);
    }
    assert_eq!(last, ActivityStatus::Finished);
  }

  #[test]
  fn status_near_calendar_end_does_not_overflow() {
    let now = at(2025, 1, 1, 12, 0, 0);
    let last = NaiveDateTime::MAX;
    assert_eq!(
      compute_status(last.date(), last.time(), now),
      ActivityStatus::Upcoming
    );
    assert_eq!(
      compute_status(last.date(), last.time(), last),
      ActivityStatus::Ongoing
    );
  }

  #[test]
  fn create_rejects_dates_past_four_digit_years() {
    let now = at(2025, 1, 1, 12, 0, 0);

    let mut far = input(now);
    far.date = NaiveDate::from_ymd_opt(10000, 1, 1);
    let err = far
      .into_activity(Uuid::new_v4(), Uuid::new_v4(), now)
      .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ValidationError);

    let mut last = input(now);
    last.date = NaiveDate::from_ymd_opt(9999, 12, 31);
    assert!(last.into_activity(Uuid::new_v4(), Uuid::new_v4(), now).is_ok());
  }

  #[test]
  fn create_requires_fields() {
    let now = at(2025, 1, 1, 12, 0, 0);
    let mut missing = input(now);
    missing.location = Some("   ".into());
    let err = missing.into_activity(Uuid::new_v4(), Uuid::new_v4(), now);
    assert_eq!(err.unwrap_err().kind, ErrorKind::ValidationError);
  }

  #[test]
  fn create_rejects_bad_capacity_and_past_start() {
    let now = at(2025, 1, 1, 12, 0, 0);

    for bad in [0, -3, 101] {
      let mut i = input(now);
      i.max_participants = Some(bad);
      assert!(i.into_activity(Uuid::new_v4(), Uuid::new_v4(), now).is_err());
    }

    let mut past = input(now);
    past.date = Some(now.date());
    past.time = Some(NaiveTime::from_hms_opt(11, 59, 0).unwrap());
    let err = past
      .into_activity(Uuid::new_v4(), Uuid::new_v4(), now)
      .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ValidationError);
  }

  #[test]
  fn create_builds_empty_roster() {
    let now = at(2025, 1, 1, 12, 0, 0);
    let creator = Uuid::new_v4();
    let a = input(now)
      .into_activity(Uuid::new_v4(), creator, now)
      .unwrap();
    assert!(a.participants.is_empty());
    assert_eq!(a.creator_id, creator);
    assert_eq!(a.status_at(now), ActivityStatus::Upcoming);
    assert_eq!(a.remaining_slots(), 10);
  }

  #[test]
  fn patch_cannot_shrink_below_roster() {
    let now = at(2025, 1, 1, 12, 0, 0);
    let mut a = input(now)
      .into_activity(Uuid::new_v4(), Uuid::new_v4(), now)
      .unwrap();
    a.participants = vec![Uuid::new_v4(), Uuid::new_v4()];

    let shrink = ActivityPatch { max_participants: Some(1), ..Default::default() };
    assert_eq!(
      shrink.apply(&a, now).unwrap_err().kind,
      ErrorKind::ValidationError
    );

    let exact = ActivityPatch { max_participants: Some(2), ..Default::default() };
    let patched = exact.apply(&a, now).unwrap();
    assert!(patched.is_full());
  }

  #[test]
  fn patch_merges_only_given_fields() {
    let now = at(2025, 1, 1, 12, 0, 0);
    let a = input(now)
      .into_activity(Uuid::new_v4(), Uuid::new_v4(), now)
      .unwrap();
    let patch = ActivityPatch {
      title: Some("Evening run".into()),
      kind: Some(ActivityType::Other),
      ..Default::default()
    };
    let patched = patch.apply(&a, now).unwrap();
    assert_eq!(patched.title, "Evening run");
    assert_eq!(patched.kind, ActivityType::Other);
    assert_eq!(patched.location, a.location);
    assert_eq!(patched.id, a.id);
  }

  #[test]
  fn legacy_status_field_is_ignored() {
    let raw = serde_json::json!({
      "id": Uuid::new_v4(),
      "title": "Yoga",
      "type": "yoga",
      "description": "",
      "date": "2025-05-01",
      "time": "08:30",
      "location": "Park",
      "maxParticipants": 5,
      "participants": [],
      "creatorId": Uuid::new_v4(),
      "rules": "",
      "status": "upcoming",
      "createTime": "2025-04-01 10:00:00"
    });
    let a: Activity = serde_json::from_value(raw).unwrap();
    assert_eq!(a.kind, ActivityType::Yoga);
    let back = serde_json::to_value(&a).unwrap();
    assert!(back.get("status").is_none());
    assert_eq!(back["time"], "08:30");
    assert_eq!(back["maxParticipants"], 5);
  }
}
