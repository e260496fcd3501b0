//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure renders as `{"ok": false, "errorKind": ..., "message": ...}`.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use rally_core::ErrorKind;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// `errorKind` reported for infrastructure faults.
pub const STORAGE_FAULT: &str = "StorageFault";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Engine(#[from] rally_engine::Error),

  /// No usable credentials, or credentials that did not verify.
  #[error("unauthenticated: {0}")]
  Unauthenticated(String),

  /// The request could not be decoded.
  #[error("bad request: {0}")]
  BadRequest(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Failure<'a> {
  ok:         bool,
  error_kind: &'a str,
  message:    String,
}

fn status_for(kind: ErrorKind) -> StatusCode {
  match kind {
    ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
    ErrorKind::AuthorizationError => StatusCode::FORBIDDEN,
    ErrorKind::NotFoundError => StatusCode::NOT_FOUND,
    ErrorKind::ConflictError
    | ErrorKind::CapacityError
    | ErrorKind::InvalidStateError => StatusCode::CONFLICT,
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, kind, message) = match self {
      ApiError::Engine(rally_engine::Error::Violation(v)) => {
        (status_for(v.kind), v.kind.to_string(), v.message)
      }
      ApiError::Engine(e) => {
        error!(error = %e, "engine fault");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          STORAGE_FAULT.to_string(),
          e.to_string(),
        )
      }
      ApiError::Unauthenticated(m) => {
        let body = Failure {
          ok:         false,
          error_kind: "AuthorizationError",
          message:    m,
        };
        let mut res = (StatusCode::UNAUTHORIZED, Json(body)).into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"rally\""),
        );
        return res;
      }
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, ErrorKind::ValidationError.to_string(), m)
      }
    };

    let body = Failure { ok: false, error_kind: &kind, message };
    (status, Json(body)).into_response()
  }
}
