//! Handlers for `/orders` endpoints.
//!
//! Every route needs credentials. Reads only see orders the caller placed or
//! that were placed on activities the caller created.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/orders` | `?q=&status=&userId=&activityId=`, all optional |
//! | `GET`   | `/orders/stats` | |
//! | `GET`   | `/orders/{id}` | With user and activity. Owner or creator |
//! | `PATCH` | `/orders/{id}` | Owner only, while pending |
//! | `POST`  | `/orders/{id}/status` | Body: `{"status","reason"?}` |
//! | `POST`  | `/orders/{id}/confirm` | Registers the orderer |
//! | `POST`  | `/orders/{id}/cancel` | Body: `{"reason"?}` |
//! | `POST`  | `/orders/{id}/complete` | |

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use rally_core::{
  order::{OrderDataPatch, OrderStatus},
  store::CollectionStore,
};
use rally_engine::{Engine, orders::OrderFilters};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ApiError,
  auth::CurrentUser,
  extract::{Body, Ids, Params},
  reply::keyed,
};

// ─── Search ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
  #[serde(default)]
  pub q:           String,
  pub status:      Option<OrderStatus>,
  pub user_id:     Option<Uuid>,
  pub activity_id: Option<Uuid>,
}

/// `GET /orders`
pub async fn search<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  CurrentUser(principal): CurrentUser,
  Params(params): Params<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
  let filters = OrderFilters {
    status:      params.status,
    user_id:     params.user_id,
    activity_id: params.activity_id,
  };
  let orders = engine
    .search_orders_for(&params.q, &filters, &principal)
    .await?;
  Ok(keyed("orders", orders))
}

/// `GET /orders/stats`
pub async fn stats<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  CurrentUser(principal): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
  Ok(keyed("stats", engine.order_stats_for(&principal).await?))
}

// ─── Single order ────────────────────────────────────────────────────────────

/// `GET /orders/{id}`
pub async fn get_one<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  Ids(id): Ids<Uuid>,
  CurrentUser(principal): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
  Ok(keyed("order", engine.get_order_for(id, &principal).await?))
}

/// `PATCH /orders/{id}`
pub async fn update_data<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  Ids(id): Ids<Uuid>,
  CurrentUser(principal): CurrentUser,
  Body(patch): Body<OrderDataPatch>,
) -> Result<impl IntoResponse, ApiError> {
  Ok(keyed("order", engine.update_order_data(id, patch, &principal).await?))
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: OrderStatus,
  #[serde(default)]
  pub reason: Option<String>,
}

/// `POST /orders/{id}/status`
pub async fn set_status<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  Ids(id): Ids<Uuid>,
  CurrentUser(principal): CurrentUser,
  Body(body): Body<StatusBody>,
) -> Result<impl IntoResponse, ApiError> {
  let order = engine
    .set_order_status(id, body.status, &principal, body.reason)
    .await?;
  Ok(keyed("order", order))
}

/// `POST /orders/{id}/confirm`
pub async fn confirm<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  Ids(id): Ids<Uuid>,
  CurrentUser(principal): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
  Ok(keyed("order", engine.confirm_order(id, &principal).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct ReasonBody {
  #[serde(default)]
  pub reason: Option<String>,
}

/// `POST /orders/{id}/cancel`
pub async fn cancel<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  Ids(id): Ids<Uuid>,
  CurrentUser(principal): CurrentUser,
  body: Option<Body<ReasonBody>>,
) -> Result<impl IntoResponse, ApiError> {
  let reason = body.and_then(|Body(body)| body.reason);
  Ok(keyed("order", engine.cancel_order(id, &principal, reason).await?))
}

/// `POST /orders/{id}/complete`
pub async fn complete<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  Ids(id): Ids<Uuid>,
  CurrentUser(principal): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
  Ok(keyed("order", engine.complete_order(id, &principal).await?))
}
