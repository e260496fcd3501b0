//! Orders: auditable, editable requests to participate in an activity.
//!
//! An order snapshots the activity's display fields and the participant's
//! contact details when it is created. Confirming an order is what puts the
//! participant on the activity roster; the engine performs that side effect.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{
  Violation,
  activity::Activity,
  datetime::{format_clock_time, timestamp},
  user::PublicUser,
  validation::non_blank,
};

/// Every generated order number starts with this.
pub const ORDER_NUMBER_PREFIX: &str = "SA";

// ─── Status ──────────────────────────────────────────────────────────────────

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
pub enum OrderStatus {
  Pending,
  Confirmed,
  Cancelled,
  Completed,
}

impl OrderStatus {
  /// `cancelled` and `completed` have no outgoing transitions.
  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Cancelled | Self::Completed)
  }

  /// An order counts against the one-per-(user, activity) limit unless it
  /// was cancelled.
  pub fn is_active(self) -> bool { self != Self::Cancelled }

  /// Decide whether `self -> to` is a legal transition.
  ///
  /// Requesting the state an order is already in is a conflict; anything
  /// leaving a terminal state, returning to `pending`, or completing an
  /// unconfirmed order is an invalid state.
  pub fn check_transition(self, to: Self) -> Result<(), Violation> {
    if self == to {
      return Err(Violation::conflict(format!("order is already {to}")));
    }
    if self.is_terminal() {
      return Err(Violation::invalid_state(format!(
        "a {self} order cannot change status"
      )));
    }
    match (self, to) {
      (Self::Pending, Self::Confirmed | Self::Cancelled)
      | (Self::Confirmed, Self::Cancelled | Self::Completed) => Ok(()),
      _ => Err(Violation::invalid_state(format!(
        "a {self} order cannot become {to}"
      ))),
    }
  }
}

// ─── Order data ──────────────────────────────────────────────────────────────

/// The denormalised snapshot carried by an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
  pub activity_title:       String,
  pub activity_date:        String,
  pub activity_time:        String,
  pub activity_location:    String,
  pub participant_name:     String,
  #[serde(default)]
  pub participant_phone:    String,
  #[serde(default)]
  pub special_requirements: String,
  #[serde(default)]
  pub emergency_contact:    String,
}

impl OrderData {
  /// Snapshot `activity` and fill contact fields from `input`, falling back
  /// to the orderer's profile for name and phone.
  pub fn snapshot(
    activity: &Activity,
    orderer: &PublicUser,
    input: NewOrderData,
  ) -> Self {
    Self {
      activity_title:       activity.title.clone(),
      activity_date:        activity.date.to_string(),
      activity_time:        format_clock_time(activity.time),
      activity_location:    activity.location.clone(),
      participant_name:     non_blank(input.participant_name)
        .unwrap_or_else(|| orderer.username.clone()),
      participant_phone:    non_blank(input.participant_phone)
        .unwrap_or_else(|| orderer.phone.clone()),
      special_requirements: input.special_requirements.unwrap_or_default(),
      emergency_contact:    input.emergency_contact.unwrap_or_default(),
    }
  }
}

/// Contact fields a participant may supply when creating an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderData {
  pub participant_name:     Option<String>,
  pub participant_phone:    Option<String>,
  pub special_requirements: Option<String>,
  pub emergency_contact:    Option<String>,
}

/// A shallow patch over [`OrderData`]. Activity-derived fields may be edited
/// too; they are not checked against the live activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDataPatch {
  pub activity_title:       Option<String>,
  pub activity_date:        Option<String>,
  pub activity_time:        Option<String>,
  pub activity_location:    Option<String>,
  pub participant_name:     Option<String>,
  pub participant_phone:    Option<String>,
  pub special_requirements: Option<String>,
  pub emergency_contact:    Option<String>,
}

impl OrderDataPatch {
  pub fn apply(self, data: &mut OrderData) {
    let fields = [
      (self.activity_title, &mut data.activity_title),
      (self.activity_date, &mut data.activity_date),
      (self.activity_time, &mut data.activity_time),
      (self.activity_location, &mut data.activity_location),
      (self.participant_name, &mut data.participant_name),
      (self.participant_phone, &mut data.participant_phone),
      (self.special_requirements, &mut data.special_requirements),
      (self.emergency_contact, &mut data.emergency_contact),
    ];
    for (patch, slot) in fields {
      if let Some(value) = patch {
        *slot = value;
      }
    }
  }
}

// ─── Order ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id:            Uuid,
  pub order_number:  String,
  pub activity_id:   Uuid,
  pub user_id:       Uuid,
  pub status:        OrderStatus,
  pub order_data:    OrderData,
  #[serde(with = "timestamp")]
  pub create_time:   NaiveDateTime,
  #[serde(with = "timestamp")]
  pub update_time:   NaiveDateTime,
  /// Audit note recorded with the most recent status change.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status_reason: Option<String>,
}

impl Order {
  pub fn is_active_for(&self, user_id: Uuid, activity_id: Uuid) -> bool {
    self.user_id == user_id
      && self.activity_id == activity_id
      && self.status.is_active()
  }
}
