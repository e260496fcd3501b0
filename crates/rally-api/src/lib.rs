//! JSON HTTP API for Rally.
//!
//! Exposes an axum [`Router`] over an [`Engine`] backed by any
//! [`CollectionStore`]. Every response body has the uniform result shape:
//! `{"ok": true, ...}` on success, `{"ok": false, "errorKind", "message"}` on
//! failure. Every endpoint except account registration requires HTTP Basic
//! credentials. Order reads are limited to the orderer and the activity's
//! creator. TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rally_api::api_router(engine.clone()))
//! ```

pub mod accounts;
pub mod activities;
pub mod auth;
pub mod comments;
pub mod error;
pub mod extract;
pub mod orders;
pub mod reply;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use rally_core::store::CollectionStore;
use rally_engine::Engine;

pub use error::ApiError;

/// Build a fully-materialised API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(engine: Arc<Engine<S>>) -> Router<()>
where
  S: CollectionStore + 'static,
{
  Router::new()
    // Accounts
    .route("/accounts", post(accounts::register::<S>))
    .route("/me", get(accounts::me::<S>))
    .route("/me/password", post(accounts::change_password::<S>))
    .route("/me/activities", get(accounts::my_activities::<S>))
    .route("/me/orders", get(accounts::my_orders::<S>))
    .route("/users", get(accounts::list_users::<S>))
    .route("/users/{id}", get(accounts::get_user::<S>))
    // Activities
    .route(
      "/activities",
      get(activities::list::<S>).post(activities::create::<S>),
    )
    .route("/activities/stats", get(activities::stats::<S>))
    .route(
      "/activities/{id}",
      get(activities::get_one::<S>)
        .patch(activities::update::<S>)
        .delete(activities::delete::<S>),
    )
    .route("/activities/{id}/join", post(activities::join::<S>))
    .route("/activities/{id}/leave", post(activities::leave::<S>))
    .route(
      "/activities/{id}/orders",
      get(activities::orders::<S>).post(activities::place_order::<S>),
    )
    // Comments
    .route(
      "/activities/{id}/comments",
      get(comments::list::<S>).post(comments::add::<S>),
    )
    .route("/activities/{id}/comments/stats", get(comments::stats::<S>))
    .route(
      "/activities/{id}/comments/{comment_id}",
      delete(comments::delete::<S>),
    )
    .route(
      "/activities/{id}/comments/{comment_id}/like",
      post(comments::like::<S>),
    )
    .route(
      "/activities/{id}/comments/{comment_id}/replies",
      post(comments::reply::<S>),
    )
    // Orders
    .route("/orders", get(orders::search::<S>))
    .route("/orders/stats", get(orders::stats::<S>))
    .route(
      "/orders/{id}",
      get(orders::get_one::<S>).patch(orders::update_data::<S>),
    )
    .route("/orders/{id}/status", post(orders::set_status::<S>))
    .route("/orders/{id}/confirm", post(orders::confirm::<S>))
    .route("/orders/{id}/cancel", post(orders::cancel::<S>))
    .route("/orders/{id}/complete", post(orders::complete::<S>))
    .with_state(engine)
}
