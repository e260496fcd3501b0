//! Read-side projections.
//!
//! Stored records carry only ids. Views join them against an [`Identity`]
//! snapshot and attach the derived activity status at read time; nothing
//! here is ever persisted.

use chrono::NaiveDateTime;
use rally_core::{
  activity::{Activity, ActivityStatus},
  comment::Comment,
  identity::Identity,
  order::Order,
  user::PublicUser,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
  #[serde(flatten)]
  pub activity:            Activity,
  pub status:              ActivityStatus,
  /// `None` when the creator's account no longer resolves.
  pub creator:             Option<PublicUser>,
  /// Only filled on detail reads. Ids that no longer resolve are dropped.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub participant_details: Option<Vec<PublicUser>>,
}

impl ActivityView {
  pub fn project(
    activity: Activity,
    now: NaiveDateTime,
    identity: &impl Identity,
  ) -> Self {
    Self {
      status: activity.status_at(now),
      creator: identity.user_by_id(activity.creator_id).cloned(),
      participant_details: None,
      activity,
    }
  }

  pub fn with_participants(mut self, identity: &impl Identity) -> Self {
    self.participant_details = Some(
      self
        .activity
        .participants
        .iter()
        .filter_map(|id| identity.user_by_id(*id).cloned())
        .collect(),
    );
    self
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
  #[serde(flatten)]
  pub order:    Order,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user:     Option<PublicUser>,
  /// `None` when the activity has since been deleted; display falls back to
  /// the order's own snapshot.
  pub activity: Option<ActivityView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
  #[serde(flatten)]
  pub comment: Comment,
  pub author:  Option<PublicUser>,
}

impl CommentView {
  pub fn project(comment: Comment, identity: &impl Identity) -> Self {
    Self { author: identity.user_by_id(comment.author_id).cloned(), comment }
  }
}
