//! HTTP Basic-auth extractor resolving the acting [`Principal`].
//!
//! The username half of the credentials may be a username or an email
//! address; both are checked against the Users collection.

use std::sync::Arc;

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use rally_core::{ErrorKind, store::CollectionStore, user::Principal};
use rally_engine::Engine;

use crate::ApiError;

/// The authenticated caller. Present in a handler's arguments means the
/// request carried valid credentials.
pub struct CurrentUser(pub Principal);

/// Pull `(login, password)` out of an `Authorization: Basic` header.
pub fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), ApiError> {
  let missing = || ApiError::Unauthenticated("credentials required".into());

  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(missing)?;
  let encoded = header_val.strip_prefix("Basic ").ok_or_else(missing)?;

  let decoded = B64.decode(encoded.trim()).map_err(|_| missing())?;
  let creds = String::from_utf8(decoded).map_err(|_| missing())?;
  let (login, password) = creds.split_once(':').ok_or_else(missing)?;

  Ok((login.to_owned(), password.to_owned()))
}

impl<S> FromRequestParts<Arc<Engine<S>>> for CurrentUser
where
  S: CollectionStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    engine: &Arc<Engine<S>>,
  ) -> Result<Self, Self::Rejection> {
    let (login, password) = basic_credentials(&parts.headers)?;
    match engine.authenticate(&login, &password).await {
      Ok(principal) => Ok(CurrentUser(principal)),
      Err(rally_engine::Error::Violation(v))
        if v.kind == ErrorKind::AuthorizationError =>
      {
        Err(ApiError::Unauthenticated(v.message))
      }
      Err(e) => Err(e.into()),
    }
  }
}
