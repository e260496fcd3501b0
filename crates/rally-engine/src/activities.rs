//! Activity lifecycle: create, update, delete, and the read paths.
//!
//! Status is derived from the clock on every read; it is never written.

use std::collections::BTreeMap;

use rally_core::{
  Violation,
  activity::{Activity, ActivityPatch, ActivityStatus, ActivityType, NewActivity},
  identity::UserDirectory,
  store::{Collection, CollectionStore},
  user::Principal,
};
use serde::Serialize;
use strum::IntoEnumIterator as _;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{Engine, Result, views::ActivityView};

/// Aggregate counts over every stored activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
  pub total:     usize,
  /// Only types with at least one activity appear.
  pub by_type:   BTreeMap<ActivityType, usize>,
  /// Every status appears, zero-filled.
  pub by_status: BTreeMap<ActivityStatus, usize>,
}

/// A member's activities, split by relationship.
#[derive(Debug, Clone, Serialize)]
pub struct UserActivities {
  pub created: Vec<ActivityView>,
  pub joined:  Vec<ActivityView>,
}

pub(crate) fn position(activities: &[Activity], id: Uuid) -> Result<usize> {
  activities
    .iter()
    .position(|a| a.id == id)
    .ok_or_else(|| Violation::not_found(format!("activity {id} not found")).into())
}

fn ensure_creator(
  activity: &Activity,
  principal: &Principal,
  action: &str,
) -> Result<(), Violation> {
  if activity.creator_id != principal.user_id {
    return Err(Violation::unauthorized(format!(
      "only the creator can {action} this activity"
    )));
  }
  Ok(())
}

impl<S: CollectionStore> Engine<S> {
  // ── Writes ────────────────────────────────────────────────────────────────

  /// Validate `input` and append a new activity created by `principal`.
  pub async fn create_activity(
    &self,
    input: NewActivity,
    principal: &Principal,
  ) -> Result<Activity> {
    let activity =
      input.into_activity(Uuid::new_v4(), principal.user_id, self.now())?;

    let _guard = self.locks.activities.lock().await;
    let mut activities = self.activities().await?;
    activities.push(activity.clone());
    self.save(Collection::Activities, &activities).await?;

    info!(activity_id = %activity.id, creator = %principal.user_id, "activity created");
    Ok(activity)
  }

  /// Merge `patch` into an activity. Creator only, and only while upcoming.
  pub async fn update_activity(
    &self,
    id: Uuid,
    patch: ActivityPatch,
    principal: &Principal,
  ) -> Result<Activity> {
    let _guard = self.locks.activities.lock().await;
    let mut activities = self.activities().await?;
    let idx = position(&activities, id)?;
    let now = self.now();

    let current = &activities[idx];
    ensure_creator(current, principal, "edit")?;
    let status = current.status_at(now);
    if status != ActivityStatus::Upcoming {
      debug!(activity_id = %id, %status, "edit rejected after start");
      return Err(
        Violation::invalid_state(format!(
          "a {status} activity can no longer be edited"
        ))
        .into(),
      );
    }

    let next = patch.apply(current, now)?;
    activities[idx] = next.clone();
    self.save(Collection::Activities, &activities).await?;

    info!(activity_id = %id, "activity updated");
    Ok(next)
  }

  /// Remove an activity outright. Creator only, at any status. Orders and
  /// comments that reference it are left in place.
  pub async fn delete_activity(&self, id: Uuid, principal: &Principal) -> Result<Activity> {
    let _guard = self.locks.activities.lock().await;
    let mut activities = self.activities().await?;
    let idx = position(&activities, id)?;
    ensure_creator(&activities[idx], principal, "delete")?;

    let removed = activities.remove(idx);
    self.save(Collection::Activities, &activities).await?;

    info!(activity_id = %id, "activity deleted");
    Ok(removed)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub async fn list_activities(&self) -> Result<Vec<ActivityView>> {
    let directory = self.directory().await?;
    let now = self.now();
    Ok(
      self
        .activities()
        .await?
        .into_iter()
        .map(|a| ActivityView::project(a, now, &directory))
        .collect(),
    )
  }

  /// Detail read, including the resolved participant list.
  pub async fn get_activity(&self, id: Uuid) -> Result<ActivityView> {
    let mut activities = self.activities().await?;
    let idx = position(&activities, id)?;
    let directory = self.directory().await?;
    let activity = activities.swap_remove(idx);
    Ok(
      ActivityView::project(activity, self.now(), &directory)
        .with_participants(&directory),
    )
  }

  /// Case-insensitive substring match over title, location and description.
  /// A blank keyword returns everything.
  pub async fn search_activities(&self, keyword: &str) -> Result<Vec<ActivityView>> {
    let all = self.list_activities().await?;
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
      return Ok(all);
    }
    Ok(
      all
        .into_iter()
        .filter(|view| {
          let a = &view.activity;
          [&a.title, &a.location, &a.description]
            .iter()
            .any(|field| field.to_lowercase().contains(&keyword))
        })
        .collect(),
    )
  }

  pub async fn activity_stats(&self) -> Result<ActivityStats> {
    let activities = self.activities().await?;
    let now = self.now();

    let mut by_status: BTreeMap<ActivityStatus, usize> =
      ActivityStatus::iter().map(|s| (s, 0)).collect();
    let mut by_type = BTreeMap::new();
    for activity in &activities {
      *by_status.entry(activity.status_at(now)).or_default() += 1;
      *by_type.entry(activity.kind).or_default() += 1;
    }

    Ok(ActivityStats { total: activities.len(), by_type, by_status })
  }

  /// Activities `user_id` created and activities they are registered for.
  pub async fn user_activities(&self, user_id: Uuid) -> Result<UserActivities> {
    let activities = self.activities().await?;
    let directory: UserDirectory = self.directory().await?;
    let now = self.now();

    let mut created = Vec::new();
    let mut joined = Vec::new();
    for activity in activities {
      if activity.creator_id == user_id {
        created.push(ActivityView::project(activity, now, &directory));
      } else if activity.has_participant(user_id) {
        joined.push(ActivityView::project(activity, now, &directory));
      }
    }
    Ok(UserActivities { created, joined })
  }
}
