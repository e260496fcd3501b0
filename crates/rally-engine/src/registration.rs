//! Roster registration: join and leave, checked directly against the
//! activity's participant list.

use chrono::NaiveDateTime;
use rally_core::{
  Violation,
  activity::{Activity, ActivityStatus},
  store::{Collection, CollectionStore},
  user::Principal,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{Engine, Result, activities::position};

/// Rules for putting `user_id` on `activity`'s roster, in precedence order.
///
/// Order confirmation runs the same checks, so they live outside the engine.
pub(crate) fn check_join(
  activity: &Activity,
  user_id: Uuid,
  now: NaiveDateTime,
) -> Result<(), Violation> {
  if activity.creator_id == user_id {
    return Err(Violation::unauthorized(
      "the creator cannot join their own activity",
    ));
  }
  if activity.has_participant(user_id) {
    return Err(Violation::conflict("already joined this activity"));
  }
  if activity.is_full() {
    return Err(Violation::capacity(format!(
      "activity is full ({} of {})",
      activity.participants.len(),
      activity.max_participants
    )));
  }
  let status = activity.status_at(now);
  if status != ActivityStatus::Upcoming {
    return Err(Violation::invalid_state(format!(
      "cannot join a {status} activity"
    )));
  }
  Ok(())
}

/// Leaving is refused while the activity is running. Leaving after it has
/// finished is allowed.
pub(crate) fn check_leave(
  activity: &Activity,
  user_id: Uuid,
  now: NaiveDateTime,
) -> Result<(), Violation> {
  if !activity.has_participant(user_id) {
    return Err(Violation::invalid_state("not registered for this activity"));
  }
  if activity.status_at(now) == ActivityStatus::Ongoing {
    return Err(Violation::invalid_state(
      "cannot leave an activity that is under way",
    ));
  }
  Ok(())
}

impl<S: CollectionStore> Engine<S> {
  /// Append `principal` to the roster.
  ///
  /// A second join by the same user is a `ConflictError`; callers should
  /// read that as "already joined".
  pub async fn join(&self, activity_id: Uuid, principal: &Principal) -> Result<Activity> {
    let _guard = self.locks.activities.lock().await;
    let mut activities = self.activities().await?;
    let idx = position(&activities, activity_id)?;

    let activity = &mut activities[idx];
    if let Err(violation) = check_join(activity, principal.user_id, self.now()) {
      debug!(%activity_id, user = %principal.user_id, %violation, "join rejected");
      return Err(violation.into());
    }
    activity.participants.push(principal.user_id);
    let joined = activity.clone();

    self.save(Collection::Activities, &activities).await?;
    info!(
      %activity_id,
      user = %principal.user_id,
      participants = joined.participants.len(),
      "joined activity"
    );
    Ok(joined)
  }

  /// Remove `principal` from the roster.
  pub async fn leave(&self, activity_id: Uuid, principal: &Principal) -> Result<Activity> {
    let _guard = self.locks.activities.lock().await;
    let mut activities = self.activities().await?;
    let idx = position(&activities, activity_id)?;

    let activity = &mut activities[idx];
    if let Err(violation) = check_leave(activity, principal.user_id, self.now()) {
      debug!(%activity_id, user = %principal.user_id, %violation, "leave rejected");
      return Err(violation.into());
    }
    activity.participants.retain(|id| *id != principal.user_id);
    let left = activity.clone();

    self.save(Collection::Activities, &activities).await?;
    info!(%activity_id, user = %principal.user_id, "left activity");
    Ok(left)
  }
}
