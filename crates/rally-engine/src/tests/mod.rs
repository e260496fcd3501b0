//! Engine tests against the SQLite store, driven by a manual clock.

mod activities;

use std::sync::{
  Arc,
  atomic::{AtomicBool, Ordering},
};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rally_core::{
  ErrorKind,
  activity::{Activity, ActivityType, NewActivity},
  datetime::ManualClock,
  store::{Collection, CollectionStore},
  user::{Principal, User},
};
use rally_store_sqlite::SqliteStore;
use serde_json::Value;
use uuid::Uuid;

use crate::{Engine, Error, Result};

// ─── Fixtures ────────────────────────────────────────────────────────────────

/// 2030-06-01 09:00:00, the instant every test starts at.
pub(crate) fn t0() -> NaiveDateTime {
  NaiveDate::from_ymd_opt(2030, 6, 1)
    .unwrap()
    .and_hms_opt(9, 0, 0)
    .unwrap()
}

/// An activity starting one day after [`t0`].
pub(crate) fn tomorrow() -> NaiveDateTime { t0() + TimeDelta::days(1) }

pub(crate) fn new_activity(title: &str, max: i64) -> NewActivity {
  let start = tomorrow();
  NewActivity {
    title:            Some(title.into()),
    kind:             Some(ActivityType::Basketball),
    description:      Some("Half-court pickup game".into()),
    rules:            None,
    date:             Some(start.date()),
    time:             Some(start.time()),
    location:         Some("North Gym".into()),
    max_participants: Some(max),
  }
}

pub(crate) struct Harness<S = SqliteStore> {
  pub engine: Arc<Engine<S>>,
  pub clock:  Arc<ManualClock>,
  pub alice:  Principal,
  pub bob:    Principal,
  pub carol:  Principal,
  pub dave:   Principal,
}

impl<S: CollectionStore> Harness<S> {
  async fn with_store(store: S) -> Self {
    let clock = Arc::new(ManualClock::new(t0()));
    let engine = Arc::new(Engine::with_clock(Arc::new(store), clock.clone()));
    let people = seed_users(&engine, &["alice", "bob", "carol", "dave"]).await;
    let [alice, bob, carol, dave] = <[Principal; 4]>::try_from(people).unwrap();
    Self { engine, clock, alice, bob, carol, dave }
  }

  /// Move the clock to `offset` after the start of the activities created by
  /// [`new_activity`].
  pub fn at_start_plus(&self, offset: TimeDelta) {
    self.clock.set(tomorrow() + offset);
  }

  pub async fn activity(&self, creator: &Principal, max: i64) -> Activity {
    self
      .engine
      .create_activity(new_activity("Pickup basketball", max), creator)
      .await
      .unwrap()
  }

  pub async fn roster(&self, activity_id: Uuid) -> Vec<Uuid> {
    self
      .engine
      .get_activity(activity_id)
      .await
      .unwrap()
      .activity
      .participants
  }
}

pub(crate) async fn harness() -> Harness {
  Harness::with_store(SqliteStore::open_in_memory().await.unwrap()).await
}

/// Write accounts straight into the Users collection. Skips password hashing;
/// these users never authenticate.
pub(crate) async fn seed_users<S: CollectionStore>(
  engine: &Engine<S>,
  names: &[&str],
) -> Vec<Principal> {
  let mut users = engine.users().await.unwrap();
  let added: Vec<User> = names
    .iter()
    .map(|name| User {
      id:            Uuid::new_v4(),
      username:      (*name).to_owned(),
      email:         format!("{name}@example.com"),
      password:      String::from("unused"),
      phone:         String::from("13800138000"),
      register_time: t0(),
    })
    .collect();
  users.extend(added.iter().cloned());
  engine.save(Collection::Users, &users).await.unwrap();
  added.iter().map(User::principal).collect()
}

#[track_caller]
pub(crate) fn assert_kind<T: std::fmt::Debug>(result: Result<T>, kind: ErrorKind) {
  match result {
    Err(err) => assert_eq!(err.kind(), Some(kind), "unexpected error: {err}"),
    Ok(value) => panic!("expected {kind}, got Ok({value:?})"),
  }
}

// ─── Fault injection ─────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub(crate) enum FaultError {
  #[error("injected storage fault")]
  Injected,

  #[error(transparent)]
  Inner(#[from] rally_store_sqlite::Error),
}

/// Wraps a real store and fails writes on demand.
pub(crate) struct FailingStore {
  inner:        SqliteStore,
  fail_writes:  AtomicBool,
  fail_batches: AtomicBool,
}

impl FailingStore {
  async fn new() -> Self {
    Self {
      inner:        SqliteStore::open_in_memory().await.unwrap(),
      fail_writes:  AtomicBool::new(false),
      fail_batches: AtomicBool::new(false),
    }
  }

  pub fn fail_writes(&self, on: bool) { self.fail_writes.store(on, Ordering::SeqCst) }

  pub fn fail_batches(&self, on: bool) {
    self.fail_batches.store(on, Ordering::SeqCst)
  }
}

impl CollectionStore for FailingStore {
  type Error = FaultError;

  async fn read(&self, collection: Collection) -> Result<Option<Value>, FaultError> {
    Ok(self.inner.read(collection).await?)
  }

  async fn write(&self, collection: Collection, value: Value) -> Result<(), FaultError> {
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(FaultError::Injected);
    }
    Ok(self.inner.write(collection, value).await?)
  }

  async fn write_batch(
    &self,
    writes: Vec<(Collection, Value)>,
  ) -> Result<(), FaultError> {
    if self.fail_batches.load(Ordering::SeqCst) {
      return Err(FaultError::Injected);
    }
    Ok(self.inner.write_batch(writes).await?)
  }
}

pub(crate) async fn failing_harness() -> Harness<FailingStore> {
  Harness::with_store(FailingStore::new().await).await
}

// ─── Storage faults ──────────────────────────────────────────────────────────

#[tokio::test]
async fn storage_fault_is_not_a_violation() {
  let h = failing_harness().await;
  h.engine.store().fail_writes(true);

  let err = h
    .engine
    .create_activity(new_activity("Pickup basketball", 4), &h.alice)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Storage(_)), "got {err:?}");
  assert_eq!(err.kind(), None);
  assert!(h.engine.activities().await.unwrap().is_empty());
}

#[tokio::test]
async fn corrupt_collection_is_reported() {
  let h = harness().await;
  h.engine
    .store()
    .write(Collection::Activities, serde_json::json!({ "not": "a list" }))
    .await
    .unwrap();

  let err = h.engine.list_activities().await.unwrap_err();
  assert!(
    matches!(err, Error::Corrupt { collection: Collection::Activities, .. }),
    "got {err:?}"
  );
}

#[tokio::test]
async fn now_is_truncated_to_seconds() {
  let h = harness().await;
  h.clock.set(t0() + TimeDelta::milliseconds(750));
  assert_eq!(h.engine.now(), t0());
}
