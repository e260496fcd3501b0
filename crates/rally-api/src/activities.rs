//! Handlers for `/activities` endpoints, including roster registration and
//! order placement.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/activities` | Optional `?q=<keyword>` |
//! | `POST`   | `/activities` | Body: activity fields |
//! | `GET`    | `/activities/stats` | |
//! | `GET`    | `/activities/{id}` | With participant details |
//! | `PATCH`  | `/activities/{id}` | Creator only, while upcoming |
//! | `DELETE` | `/activities/{id}` | Creator only |
//! | `POST`   | `/activities/{id}/join` | |
//! | `POST`   | `/activities/{id}/leave` | |
//! | `GET`    | `/activities/{id}/orders` | Creator only, newest first |
//! | `POST`   | `/activities/{id}/orders` | Body: contact fields, may be `{}` |

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use rally_core::{
  activity::{ActivityPatch, NewActivity},
  order::NewOrderData,
  store::CollectionStore,
};
use rally_engine::Engine;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ApiError,
  auth::CurrentUser,
  extract::{Body, Ids, Params},
  reply::{done, keyed},
};

// ─── List / search ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub q: Option<String>,
}

/// `GET /activities[?q=<keyword>]`
pub async fn list<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  _: CurrentUser,
  Params(params): Params<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
  let activities = match params.q {
    Some(q) => engine.search_activities(&q).await?,
    None => engine.list_activities().await?,
  };
  Ok(keyed("activities", activities))
}

/// `GET /activities/stats`
pub async fn stats<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  _: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
  Ok(keyed("stats", engine.activity_stats().await?))
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

/// `POST /activities`
pub async fn create<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  CurrentUser(principal): CurrentUser,
  Body(input): Body<NewActivity>,
) -> Result<impl IntoResponse, ApiError> {
  let activity = engine.create_activity(input, &principal).await?;
  Ok((StatusCode::CREATED, keyed("activity", activity)))
}

/// `GET /activities/{id}`
pub async fn get_one<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  Ids(id): Ids<Uuid>,
  _: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
  Ok(keyed("activity", engine.get_activity(id).await?))
}

/// `PATCH /activities/{id}`
pub async fn update<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  Ids(id): Ids<Uuid>,
  CurrentUser(principal): CurrentUser,
  Body(patch): Body<ActivityPatch>,
) -> Result<impl IntoResponse, ApiError> {
  let activity = engine.update_activity(id, patch, &principal).await?;
  Ok(keyed("activity", activity))
}

/// `DELETE /activities/{id}`
pub async fn delete<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  Ids(id): Ids<Uuid>,
  CurrentUser(principal): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
  engine.delete_activity(id, &principal).await?;
  Ok(done("activity deleted"))
}

// ─── Registration ────────────────────────────────────────────────────────────

/// `POST /activities/{id}/join`
pub async fn join<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  Ids(id): Ids<Uuid>,
  CurrentUser(principal): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
  Ok(keyed("activity", engine.join(id, &principal).await?))
}

/// `POST /activities/{id}/leave`
pub async fn leave<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  Ids(id): Ids<Uuid>,
  CurrentUser(principal): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
  Ok(keyed("activity", engine.leave(id, &principal).await?))
}

// ─── Orders ──────────────────────────────────────────────────────────────────

/// `GET /activities/{id}/orders`. Creator only.
pub async fn orders<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  Ids(id): Ids<Uuid>,
  CurrentUser(principal): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
  Ok(keyed("orders", engine.activity_orders_for(id, &principal).await?))
}

/// `POST /activities/{id}/orders`
pub async fn place_order<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  Ids(id): Ids<Uuid>,
  CurrentUser(principal): CurrentUser,
  Body(input): Body<NewOrderData>,
) -> Result<impl IntoResponse, ApiError> {
  let order = engine.create_order(id, input, &principal).await?;
  Ok((StatusCode::CREATED, keyed("order", order)))
}
