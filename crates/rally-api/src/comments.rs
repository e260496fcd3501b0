//! Handlers for `/activities/{id}/comments` endpoints.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use rally_core::store::CollectionStore;
use rally_engine::Engine;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ApiError,
  auth::CurrentUser,
  extract::{Body, Ids},
  reply::{done, keyed, ok},
};

#[derive(Debug, Deserialize)]
pub struct ContentBody {
  pub content: String,
}

/// `GET /activities/{id}/comments`, newest first.
pub async fn list<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  Ids(activity_id): Ids<Uuid>,
  _: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
  Ok(keyed("comments", engine.comments(activity_id).await?))
}

/// `GET /activities/{id}/comments/stats`
pub async fn stats<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  Ids(activity_id): Ids<Uuid>,
  _: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
  Ok(keyed("stats", engine.comment_stats(activity_id).await?))
}

/// `POST /activities/{id}/comments`
pub async fn add<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  Ids(activity_id): Ids<Uuid>,
  CurrentUser(principal): CurrentUser,
  Body(body): Body<ContentBody>,
) -> Result<impl IntoResponse, ApiError> {
  let comment = engine
    .add_comment(activity_id, &body.content, &principal)
    .await?;
  Ok((StatusCode::CREATED, keyed("comment", comment)))
}

/// `DELETE /activities/{id}/comments/{comment_id}`
pub async fn delete<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  Ids((activity_id, comment_id)): Ids<(Uuid, Uuid)>,
  CurrentUser(principal): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
  engine
    .delete_comment(activity_id, comment_id, &principal)
    .await?;
  Ok(done("comment deleted"))
}

/// `POST /activities/{id}/comments/{comment_id}/like` toggles the caller's
/// like.
pub async fn like<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  Ids((activity_id, comment_id)): Ids<(Uuid, Uuid)>,
  CurrentUser(principal): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
  Ok(ok(engine.toggle_like(activity_id, comment_id, &principal).await?))
}

/// `POST /activities/{id}/comments/{comment_id}/replies`
pub async fn reply<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  Ids((activity_id, comment_id)): Ids<(Uuid, Uuid)>,
  CurrentUser(principal): CurrentUser,
  Body(body): Body<ContentBody>,
) -> Result<impl IntoResponse, ApiError> {
  let reply = engine
    .add_reply(activity_id, comment_id, &body.content, &principal)
    .await?;
  Ok((StatusCode::CREATED, keyed("reply", reply)))
}
