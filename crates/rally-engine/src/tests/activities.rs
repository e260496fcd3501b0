use chrono::TimeDelta;
use rally_core::{
  ErrorKind,
  activity::{ActivityPatch, ActivityStatus, ActivityType},
  store::{Collection, CollectionStore as _},
};
use serde_json::json;
use uuid::Uuid;

use super::{assert_kind, harness, new_activity, t0, tomorrow};

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_rejects_extended_years() {
  let h = harness().await;
  for date in [
    chrono::NaiveDate::from_ymd_opt(262142, 12, 31),
    chrono::NaiveDate::from_ymd_opt(10000, 1, 1),
  ] {
    let mut input = new_activity("Far away", 4);
    input.date = date;
    assert_kind(
      h.engine.create_activity(input, &h.alice).await,
      ErrorKind::ValidationError,
    );
  }

  let mut last = new_activity("Year-end run", 4);
  last.date = chrono::NaiveDate::from_ymd_opt(9999, 12, 31);
  last.time = chrono::NaiveTime::from_hms_opt(23, 0, 0);
  h.engine.create_activity(last, &h.alice).await.unwrap();
  assert_eq!(h.engine.list_activities().await.unwrap().len(), 1);
}

#[tokio::test]
async fn stored_extended_year_does_not_break_reads() {
  let h = harness().await;
  h.engine
    .store()
    .write(
      Collection::Activities,
      json!([{
        "id": Uuid::new_v4(),
        "title": "Legacy record",
        "type": "other",
        "date": "+262142-12-31",
        "time": "23:00",
        "location": "Nowhere",
        "maxParticipants": 4,
        "creatorId": h.alice.user_id,
        "createTime": "2030-01-01 00:00:00"
      }]),
    )
    .await
    .unwrap();

  let views = h.engine.list_activities().await.unwrap();
  assert_eq!(views.len(), 1);
  assert_eq!(views[0].status, ActivityStatus::Upcoming);
}

#[tokio::test]
async fn create_stores_an_empty_roster() {
  let h = harness().await;
  let created = h.activity(&h.alice, 4).await;

  assert_eq!(created.creator_id, h.alice.user_id);
  assert!(created.participants.is_empty());
  assert_eq!(created.create_time, t0());

  let stored = h.engine.activities().await.unwrap();
  assert_eq!(stored, vec![created]);
}

#[tokio::test]
async fn create_requires_core_fields() {
  let h = harness().await;
  let mut input = new_activity("Pickup basketball", 4);
  input.location = Some("   ".into());

  assert_kind(
    h.engine.create_activity(input, &h.alice).await,
    ErrorKind::ValidationError,
  );
  assert!(h.engine.activities().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_bounds_max_participants() {
  let h = harness().await;
  for max in [0, -3, 101] {
    assert_kind(
      h.engine
        .create_activity(new_activity("Pickup basketball", max), &h.alice)
        .await,
      ErrorKind::ValidationError,
    );
  }
  h.engine
    .create_activity(new_activity("Pickup basketball", 100), &h.alice)
    .await
    .unwrap();
}

#[tokio::test]
async fn create_rejects_a_start_in_the_past() {
  let h = harness().await;
  h.clock.set(tomorrow() + TimeDelta::minutes(1));
  assert_kind(
    h.engine
      .create_activity(new_activity("Pickup basketball", 4), &h.alice)
      .await,
    ErrorKind::ValidationError,
  );
}

// ─── Derived status ──────────────────────────────────────────────────────────

#[tokio::test]
async fn status_follows_the_clock() {
  let h = harness().await;
  let a = h.activity(&h.alice, 4).await;
  let (engine, id) = (&h.engine, a.id);
  let status = move || async move { engine.get_activity(id).await.unwrap().status };

  assert_eq!(status().await, ActivityStatus::Upcoming);
  h.at_start_plus(TimeDelta::zero());
  assert_eq!(status().await, ActivityStatus::Ongoing);
  h.at_start_plus(TimeDelta::hours(2) - TimeDelta::seconds(1));
  assert_eq!(status().await, ActivityStatus::Ongoing);
  h.at_start_plus(TimeDelta::hours(2));
  assert_eq!(status().await, ActivityStatus::Finished);
}

#[tokio::test]
async fn stored_status_field_is_ignored() {
  let h = harness().await;
  let id = Uuid::new_v4();
  h.engine
    .store()
    .write(
      Collection::Activities,
      json!([{
        "id": id,
        "title": "Sunrise yoga",
        "type": "yoga",
        "description": "",
        "date": "2030-06-02",
        "time": "07:30",
        "location": "Riverside Park",
        "maxParticipants": 10,
        "participants": [],
        "creatorId": h.alice.user_id,
        "status": "finished",
        "rules": "",
        "createTime": "2030-05-30 12:00:00"
      }]),
    )
    .await
    .unwrap();

  let view = h.engine.get_activity(id).await.unwrap();
  assert_eq!(view.status, ActivityStatus::Upcoming);
  assert_eq!(view.activity.kind, ActivityType::Yoga);
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn creator_can_patch_while_upcoming() {
  let h = harness().await;
  let a = h.activity(&h.alice, 4).await;

  let patch = ActivityPatch {
    title: Some("  Evening basketball ".into()),
    max_participants: Some(8),
    ..Default::default()
  };
  let updated = h.engine.update_activity(a.id, patch, &h.alice).await.unwrap();

  assert_eq!(updated.title, "Evening basketball");
  assert_eq!(updated.max_participants, 8);
  assert_eq!(updated.location, a.location);
  assert_eq!(h.engine.activities().await.unwrap(), vec![updated]);
}

#[tokio::test]
async fn only_the_creator_can_patch() {
  let h = harness().await;
  let a = h.activity(&h.alice, 4).await;
  let patch = ActivityPatch { title: Some("Hijacked".into()), ..Default::default() };

  assert_kind(
    h.engine.update_activity(a.id, patch, &h.bob).await,
    ErrorKind::AuthorizationError,
  );
}

#[tokio::test]
async fn patch_is_refused_once_started() {
  let h = harness().await;
  let a = h.activity(&h.alice, 4).await;
  h.at_start_plus(TimeDelta::minutes(10));

  assert_kind(
    h.engine
      .update_activity(a.id, ActivityPatch::default(), &h.alice)
      .await,
    ErrorKind::InvalidStateError,
  );
}

#[tokio::test]
async fn patch_cannot_shrink_below_the_roster() {
  let h = harness().await;
  let a = h.activity(&h.alice, 4).await;
  h.engine.join(a.id, &h.bob).await.unwrap();
  h.engine.join(a.id, &h.carol).await.unwrap();

  let shrink = |n| ActivityPatch { max_participants: Some(n), ..Default::default() };
  assert_kind(
    h.engine.update_activity(a.id, shrink(1), &h.alice).await,
    ErrorKind::ValidationError,
  );
  let updated = h.engine.update_activity(a.id, shrink(2), &h.alice).await.unwrap();
  assert!(updated.is_full());
}

#[tokio::test]
async fn patch_unknown_activity_is_not_found() {
  let h = harness().await;
  assert_kind(
    h.engine
      .update_activity(Uuid::new_v4(), ActivityPatch::default(), &h.alice)
      .await,
    ErrorKind::NotFoundError,
  );
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn creator_can_delete_at_any_status() {
  let h = harness().await;
  let a = h.activity(&h.alice, 4).await;
  h.at_start_plus(TimeDelta::minutes(30));

  assert_kind(
    h.engine.delete_activity(a.id, &h.bob).await,
    ErrorKind::AuthorizationError,
  );
  let removed = h.engine.delete_activity(a.id, &h.alice).await.unwrap();
  assert_eq!(removed.id, a.id);
  assert_kind(h.engine.get_activity(a.id).await, ErrorKind::NotFoundError);
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn detail_read_resolves_people() {
  let h = harness().await;
  let a = h.activity(&h.alice, 4).await;
  h.engine.join(a.id, &h.bob).await.unwrap();

  let view = h.engine.get_activity(a.id).await.unwrap();
  assert_eq!(view.creator.unwrap().username, "alice");
  let names: Vec<_> = view
    .participant_details
    .unwrap()
    .into_iter()
    .map(|u| u.username)
    .collect();
  assert_eq!(names, ["bob"]);

  let listed = h.engine.list_activities().await.unwrap();
  assert!(listed[0].participant_details.is_none());
}

#[tokio::test]
async fn search_matches_title_location_and_description() {
  let h = harness().await;
  h.activity(&h.alice, 4).await;
  let mut swim = new_activity("Lap swim", 6);
  swim.kind = Some(ActivityType::Swimming);
  swim.location = Some("Aquatic Centre".into());
  swim.description = None;
  h.engine.create_activity(swim, &h.bob).await.unwrap();

  let titles = |views: Vec<crate::views::ActivityView>| -> Vec<String> {
    views.into_iter().map(|v| v.activity.title).collect()
  };

  assert_eq!(
    titles(h.engine.search_activities("AQUATIC").await.unwrap()),
    ["Lap swim"]
  );
  assert_eq!(
    titles(h.engine.search_activities("half-court").await.unwrap()),
    ["Pickup basketball"]
  );
  assert_eq!(h.engine.search_activities("  ").await.unwrap().len(), 2);
  assert!(h.engine.search_activities("tennis").await.unwrap().is_empty());
}

#[tokio::test]
async fn stats_zero_fill_statuses() {
  let h = harness().await;
  h.activity(&h.alice, 4).await;
  h.activity(&h.bob, 4).await;

  let stats = h.engine.activity_stats().await.unwrap();
  assert_eq!(stats.total, 2);
  assert_eq!(stats.by_type.get(&ActivityType::Basketball), Some(&2));
  assert_eq!(stats.by_type.get(&ActivityType::Yoga), None);
  assert_eq!(stats.by_status.get(&ActivityStatus::Upcoming), Some(&2));
  assert_eq!(stats.by_status.get(&ActivityStatus::Ongoing), Some(&0));
  assert_eq!(stats.by_status.get(&ActivityStatus::Finished), Some(&0));
}

#[tokio::test]
async fn user_activities_split_created_and_joined() {
  let h = harness().await;
  let mine = h.activity(&h.alice, 4).await;
  let theirs = h.activity(&h.bob, 4).await;
  h.engine.join(theirs.id, &h.alice).await.unwrap();
  h.activity(&h.carol, 4).await;

  let split = h.engine.user_activities(h.alice.user_id).await.unwrap();
  assert_eq!(split.created.len(), 1);
  assert_eq!(split.created[0].activity.id, mine.id);
  assert_eq!(split.joined.len(), 1);
  assert_eq!(split.joined[0].activity.id, theirs.id);
}
