//! Handlers for account endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/accounts` | Public. Body: `{"username","email","password","phone"?}` |
//! | `GET`  | `/me` | The authenticated caller |
//! | `POST` | `/me/password` | Body: `{"oldPassword","newPassword"}` |
//! | `GET`  | `/me/activities` | `{created, joined}` |
//! | `GET`  | `/me/orders` | Newest first |
//! | `GET`  | `/users` | Sanitized records |
//! | `GET`  | `/users/{id}` | 404 if not found |

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use rally_core::{Violation, store::CollectionStore};
use rally_engine::{Engine, accounts::NewAccount};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ApiError,
  auth::CurrentUser,
  extract::{Body, Ids},
  reply::{done, keyed, ok},
};

// ─── Registration ────────────────────────────────────────────────────────────

/// `POST /accounts`
pub async fn register<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  Body(input): Body<NewAccount>,
) -> Result<impl IntoResponse, ApiError> {
  let user = engine.register(input).await?;
  Ok((StatusCode::CREATED, keyed("user", user)))
}

// ─── Current user ────────────────────────────────────────────────────────────

/// `GET /me`
pub async fn me<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  CurrentUser(principal): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
  let user = engine
    .user_by_id(principal.user_id)
    .await?
    .ok_or_else(|| rally_engine::Error::from(Violation::not_found("user not found")))?;
  Ok(keyed("user", user))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordBody {
  pub old_password: String,
  pub new_password: String,
}

/// `POST /me/password`
pub async fn change_password<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  CurrentUser(principal): CurrentUser,
  Body(body): Body<PasswordBody>,
) -> Result<impl IntoResponse, ApiError> {
  engine
    .change_password(&principal, &body.old_password, &body.new_password)
    .await?;
  Ok(done("password changed"))
}

/// `GET /me/activities`
pub async fn my_activities<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  CurrentUser(principal): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
  Ok(ok(engine.user_activities(principal.user_id).await?))
}

/// `GET /me/orders`
pub async fn my_orders<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  CurrentUser(principal): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
  Ok(keyed("orders", engine.user_orders(principal.user_id).await?))
}

// ─── Directory ───────────────────────────────────────────────────────────────

/// `GET /users`
pub async fn list_users<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  _: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
  Ok(keyed("users", engine.all_users().await?))
}

/// `GET /users/{id}`
pub async fn get_user<S: CollectionStore + 'static>(
  State(engine): State<Arc<Engine<S>>>,
  Ids(id): Ids<Uuid>,
  _: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
  let user = engine.user_by_id(id).await?.ok_or_else(|| {
    rally_engine::Error::from(Violation::not_found(format!("user {id} not found")))
  })?;
  Ok(keyed("user", user))
}
