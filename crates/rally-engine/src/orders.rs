//! The order workflow.
//!
//! An order moves `pending -> confirmed -> completed`, and may be cancelled
//! from `pending` or `confirmed`. Confirmation puts the order's owner on the
//! activity roster in the same write as the status change: if the roster
//! rejects the owner, the order stays where it was.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rally_core::{
  ErrorKind, Violation,
  activity::ActivityStatus,
  identity::Identity as _,
  order::{
    NewOrderData, ORDER_NUMBER_PREFIX, Order, OrderData, OrderDataPatch,
    OrderStatus,
  },
  store::{Collection, CollectionStore},
  user::Principal,
  validation::non_blank,
};
use rand_core::{OsRng, RngCore as _};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  Engine, Result,
  activities::position,
  registration::check_join,
  views::{ActivityView, OrderView},
};

const ORDER_SUFFIX_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ORDER_SUFFIX_LEN: usize = 6;
const RECENT_ORDERS: usize = 10;

/// `SA` + `YYYYMMDD` + six random base-36 characters. Uniqueness is not
/// checked.
pub fn generate_order_number(now: NaiveDateTime) -> String {
  let suffix: String = (0..ORDER_SUFFIX_LEN)
    .map(|_| {
      let i = OsRng.next_u32() as usize % ORDER_SUFFIX_ALPHABET.len();
      char::from(ORDER_SUFFIX_ALPHABET[i])
    })
    .collect();
  format!("{ORDER_NUMBER_PREFIX}{}{suffix}", now.format("%Y%m%d"))
}

/// Optional narrowing for [`Engine::search_orders`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilters {
  pub status:      Option<OrderStatus>,
  pub user_id:     Option<Uuid>,
  pub activity_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
  pub total:         usize,
  /// Every status appears, zero-filled.
  pub by_status:     BTreeMap<OrderStatus, usize>,
  /// Newest first.
  pub recent_orders: Vec<Order>,
}

fn order_position(orders: &[Order], id: Uuid) -> Result<usize> {
  orders
    .iter()
    .position(|o| o.id == id)
    .ok_or_else(|| Violation::not_found(format!("order {id} not found")).into())
}

fn stats_of(mut orders: Vec<Order>) -> OrderStats {
  let mut by_status: BTreeMap<OrderStatus, usize> =
    OrderStatus::iter().map(|s| (s, 0)).collect();
  for order in &orders {
    *by_status.entry(order.status).or_default() += 1;
  }

  let total = orders.len();
  orders.sort_by(|a, b| b.create_time.cmp(&a.create_time));
  orders.truncate(RECENT_ORDERS);

  OrderStats { total, by_status, recent_orders: orders }
}

fn newest_first(views: &mut [OrderView]) {
  views.sort_by(|a, b| b.order.create_time.cmp(&a.order.create_time));
}

impl<S: CollectionStore> Engine<S> {
  // ── Writes ────────────────────────────────────────────────────────────────

  /// Request a place on an upcoming activity. The roster is not touched until
  /// the order is confirmed. The activity stays locked until the order is
  /// stored, so the snapshot matches what was checked.
  pub async fn create_order(
    &self,
    activity_id: Uuid,
    input: NewOrderData,
    principal: &Principal,
  ) -> Result<Order> {
    let _activities_guard = self.locks.activities.lock().await;
    let _orders_guard = self.locks.orders.lock().await;

    let activities = self.activities().await?;
    let activity = &activities[position(&activities, activity_id)?];
    let now = self.now();

    if activity.creator_id == principal.user_id {
      return Err(
        Violation::unauthorized("the creator cannot order a place on their own activity")
          .into(),
      );
    }
    let status = activity.status_at(now);
    if status != ActivityStatus::Upcoming {
      return Err(
        Violation::invalid_state(format!(
          "cannot create an order for a {status} activity"
        ))
        .into(),
      );
    }

    let directory = self.directory().await?;
    let orderer = directory.user_by_id(principal.user_id).ok_or_else(|| {
      Violation::not_found(format!("user {} not found", principal.user_id))
    })?;

    let mut orders = self.orders().await?;
    if orders
      .iter()
      .any(|o| o.is_active_for(principal.user_id, activity_id))
    {
      debug!(%activity_id, user = %principal.user_id, "duplicate order rejected");
      return Err(
        Violation::conflict("an active order for this activity already exists")
          .into(),
      );
    }

    let order = Order {
      id:            Uuid::new_v4(),
      order_number:  generate_order_number(now),
      activity_id,
      user_id:       principal.user_id,
      status:        OrderStatus::Pending,
      order_data:    OrderData::snapshot(activity, orderer, input),
      create_time:   now,
      update_time:   now,
      status_reason: None,
    };
    orders.push(order.clone());
    self.save(Collection::Orders, &orders).await?;

    info!(
      order_id = %order.id,
      order_number = %order.order_number,
      %activity_id,
      user = %principal.user_id,
      "order created"
    );
    Ok(order)
  }

  /// Merge `patch` into a pending order's snapshot. Owner only.
  pub async fn update_order_data(
    &self,
    order_id: Uuid,
    patch: OrderDataPatch,
    principal: &Principal,
  ) -> Result<Order> {
    let _guard = self.locks.orders.lock().await;
    let mut orders = self.orders().await?;
    let idx = order_position(&orders, order_id)?;

    let order = &mut orders[idx];
    if order.user_id != principal.user_id {
      return Err(Violation::unauthorized("only the orderer can edit this order").into());
    }
    if order.status != OrderStatus::Pending {
      return Err(
        Violation::invalid_state(format!(
          "a {} order can no longer be edited",
          order.status
        ))
        .into(),
      );
    }

    patch.apply(&mut order.order_data);
    order.update_time = self.now();
    let updated = order.clone();

    self.save(Collection::Orders, &orders).await?;
    info!(%order_id, "order data updated");
    Ok(updated)
  }

  /// Move an order to `new_status`.
  ///
  /// The order's owner and the related activity's creator may both act. On
  /// `confirmed` the owner is added to the roster atomically with the status
  /// change; an owner already on the roster counts as joined. `reason` is
  /// kept as the order's audit note.
  pub async fn set_order_status(
    &self,
    order_id: Uuid,
    new_status: OrderStatus,
    principal: &Principal,
    reason: Option<String>,
  ) -> Result<Order> {
    let _activities_guard = self.locks.activities.lock().await;
    let _orders_guard = self.locks.orders.lock().await;

    let mut activities = self.activities().await?;
    let mut orders = self.orders().await?;
    let idx = order_position(&orders, order_id)?;
    let now = self.now();

    let order = &mut orders[idx];
    let activity_idx = activities.iter().position(|a| a.id == order.activity_id);
    let is_owner = order.user_id == principal.user_id;
    let is_creator = activity_idx
      .is_some_and(|i| activities[i].creator_id == principal.user_id);
    if !is_owner && !is_creator {
      return Err(
        Violation::unauthorized(
          "only the orderer or the activity's creator can change this order",
        )
        .into(),
      );
    }

    order.status.check_transition(new_status)?;

    let mut roster_changed = false;
    if new_status == OrderStatus::Confirmed {
      let Some(ai) = activity_idx else {
        return Err(
          Violation::not_found(format!(
            "activity {} no longer exists",
            order.activity_id
          ))
          .into(),
        );
      };
      let activity = &mut activities[ai];
      match check_join(activity, order.user_id, now) {
        Ok(()) => {
          activity.participants.push(order.user_id);
          roster_changed = true;
        }
        Err(v) if v.kind == ErrorKind::ConflictError => {
          debug!(%order_id, "orderer already on roster");
        }
        Err(violation) => {
          debug!(%order_id, %violation, "confirmation rejected by roster");
          return Err(violation.into());
        }
      }
    }

    let from = order.status;
    order.status = new_status;
    order.update_time = now;
    order.status_reason = non_blank(reason);
    let updated = order.clone();

    if roster_changed {
      self.save_activities_and_orders(&activities, &orders).await?;
    } else {
      self.save(Collection::Orders, &orders).await?;
    }

    info!(
      %order_id,
      %from,
      to = %new_status,
      actor = %principal.user_id,
      "order status changed"
    );
    Ok(updated)
  }

  pub async fn confirm_order(&self, order_id: Uuid, principal: &Principal) -> Result<Order> {
    self
      .set_order_status(order_id, OrderStatus::Confirmed, principal, None)
      .await
  }

  /// Cancelling never removes an existing registration.
  pub async fn cancel_order(
    &self,
    order_id: Uuid,
    principal: &Principal,
    reason: Option<String>,
  ) -> Result<Order> {
    self
      .set_order_status(order_id, OrderStatus::Cancelled, principal, reason)
      .await
  }

  pub async fn complete_order(&self, order_id: Uuid, principal: &Principal) -> Result<Order> {
    self
      .set_order_status(order_id, OrderStatus::Completed, principal, None)
      .await
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Project orders with their user and activity.
  async fn project_orders(&self, orders: Vec<Order>) -> Result<Vec<OrderView>> {
    let directory = self.directory().await?;
    let activities = self.activities().await?;
    let now = self.now();

    Ok(
      orders
        .into_iter()
        .map(|order| {
          let activity = activities
            .iter()
            .find(|a| a.id == order.activity_id)
            .map(|a| ActivityView::project(a.clone(), now, &directory));
          OrderView {
            user: directory.user_by_id(order.user_id).cloned(),
            activity,
            order,
          }
        })
        .collect(),
    )
  }

  pub async fn get_order(&self, order_id: Uuid) -> Result<OrderView> {
    let mut orders = self.orders().await?;
    let idx = order_position(&orders, order_id)?;
    let order = orders.swap_remove(idx);
    self
      .project_orders(vec![order])
      .await?
      .pop()
      .ok_or_else(|| Violation::not_found(format!("order {order_id} not found")).into())
  }

  /// `user_id`'s orders, newest first.
  pub async fn user_orders(&self, user_id: Uuid) -> Result<Vec<OrderView>> {
    let orders: Vec<Order> = self
      .orders()
      .await?
      .into_iter()
      .filter(|o| o.user_id == user_id)
      .collect();
    let mut views = self.project_orders(orders).await?;
    newest_first(&mut views);
    Ok(views)
  }

  /// Orders placed against `activity_id`, newest first.
  pub async fn activity_orders(&self, activity_id: Uuid) -> Result<Vec<OrderView>> {
    let orders: Vec<Order> = self
      .orders()
      .await?
      .into_iter()
      .filter(|o| o.activity_id == activity_id)
      .collect();
    let mut views = self.project_orders(orders).await?;
    newest_first(&mut views);
    Ok(views)
  }

  /// Case-insensitive keyword match on order number, activity title,
  /// participant name or username, narrowed by `filters`. Newest first.
  pub async fn search_orders(
    &self,
    keyword: &str,
    filters: &OrderFilters,
  ) -> Result<Vec<OrderView>> {
    let orders = self.orders().await?;
    self.search_in(orders, keyword, filters).await
  }

  pub async fn order_stats(&self) -> Result<OrderStats> {
    Ok(stats_of(self.orders().await?))
  }

  // ── Reads scoped to a caller ──────────────────────────────────────────────

  /// Orders `principal` may see: their own, and every order placed on an
  /// activity they created.
  pub async fn visible_orders(&self, principal: &Principal) -> Result<Vec<Order>> {
    let created: Vec<Uuid> = self
      .activities()
      .await?
      .into_iter()
      .filter(|a| a.creator_id == principal.user_id)
      .map(|a| a.id)
      .collect();
    Ok(
      self
        .orders()
        .await?
        .into_iter()
        .filter(|o| o.user_id == principal.user_id || created.contains(&o.activity_id))
        .collect(),
    )
  }

  /// [`Engine::get_order`] for the order's owner or the activity's creator.
  pub async fn get_order_for(
    &self,
    order_id: Uuid,
    principal: &Principal,
  ) -> Result<OrderView> {
    let view = self.get_order(order_id).await?;
    let is_creator = view
      .activity
      .as_ref()
      .is_some_and(|a| a.activity.creator_id == principal.user_id);
    if view.order.user_id != principal.user_id && !is_creator {
      return Err(
        Violation::unauthorized(
          "only the orderer or the activity's creator can view this order",
        )
        .into(),
      );
    }
    Ok(view)
  }

  /// [`Engine::activity_orders`] for the activity's creator.
  pub async fn activity_orders_for(
    &self,
    activity_id: Uuid,
    principal: &Principal,
  ) -> Result<Vec<OrderView>> {
    let activities = self.activities().await?;
    let activity = &activities[position(&activities, activity_id)?];
    if activity.creator_id != principal.user_id {
      return Err(
        Violation::unauthorized(
          "only the activity's creator can list its orders",
        )
        .into(),
      );
    }
    self.activity_orders(activity_id).await
  }

  /// [`Engine::search_orders`] over [`Engine::visible_orders`].
  pub async fn search_orders_for(
    &self,
    keyword: &str,
    filters: &OrderFilters,
    principal: &Principal,
  ) -> Result<Vec<OrderView>> {
    let orders = self.visible_orders(principal).await?;
    self.search_in(orders, keyword, filters).await
  }

  /// [`Engine::order_stats`] over [`Engine::visible_orders`].
  pub async fn order_stats_for(&self, principal: &Principal) -> Result<OrderStats> {
    Ok(stats_of(self.visible_orders(principal).await?))
  }

  async fn search_in(
    &self,
    orders: Vec<Order>,
    keyword: &str,
    filters: &OrderFilters,
  ) -> Result<Vec<OrderView>> {
    let keyword = keyword.trim().to_lowercase();

    let mut views: Vec<OrderView> = self
      .project_orders(orders)
      .await?
      .into_iter()
      .filter(|v| filters.status.is_none_or(|s| v.order.status == s))
      .filter(|v| filters.user_id.is_none_or(|u| v.order.user_id == u))
      .filter(|v| filters.activity_id.is_none_or(|a| v.order.activity_id == a))
      .filter(|v| {
        if keyword.is_empty() {
          return true;
        }
        let data = &v.order.order_data;
        [
          Some(&v.order.order_number),
          Some(&data.activity_title),
          Some(&data.participant_name),
          v.user.as_ref().map(|u| &u.username),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&keyword))
      })
      .collect();
    newest_first(&mut views);
    Ok(views)
  }
}
