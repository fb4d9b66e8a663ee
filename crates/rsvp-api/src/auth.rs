//! Session token extraction and the [`AdminSession`] extractor.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, HeaderValue, header, request::Parts},
};
use rsvp_core::{
  session::{AdminUser, SessionProvider},
  store::RsvpStore,
};

use crate::{ApiState, error::ApiError};

/// Cookie that carries the access token between browser and server.
pub const SESSION_COOKIE: &str = "rsvp-session";

/// Pull the access token from `Authorization: Bearer` or, failing that, the
/// session cookie.
pub fn access_token(headers: &HeaderMap) -> Option<String> {
  let bearer = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.split_once(' '))
    .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
    .map(|(_, token)| token.trim())
    .filter(|t| !t.is_empty());
  if let Some(token) = bearer {
    return Some(token.to_owned());
  }

  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
    .map(|(_, value)| value.to_owned())
}

/// `Set-Cookie` value that stores `token` for `max_age_secs`.
pub fn session_cookie(token: &str, max_age_secs: i64) -> Option<HeaderValue> {
  HeaderValue::from_str(&format!(
    "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}"
  ))
  .ok()
}

/// `Set-Cookie` value that clears the session cookie.
pub fn clear_session_cookie() -> HeaderValue {
  HeaderValue::from_static("rsvp-session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Present in a handler's arguments means the caller holds a valid session.
///
/// Extraction runs before the handler body, so a rejected caller never
/// reaches the store.
#[derive(Debug, Clone)]
pub struct AdminSession {
  pub user:         AdminUser,
  pub access_token: String,
}

impl<S, P> FromRequestParts<ApiState<S, P>> for AdminSession
where
  S: RsvpStore + 'static,
  P: SessionProvider + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S, P>,
  ) -> Result<Self, Self::Rejection> {
    let access_token = access_token(&parts.headers).ok_or(ApiError::Unauthorized)?;

    let user = state
      .sessions
      .current_user(&access_token)
      .await
      .map_err(|e| {
        tracing::warn!(error = %e, "session check failed");
        ApiError::Unauthorized
      })?
      .ok_or(ApiError::Unauthorized)?;

    Ok(AdminSession { user, access_token })
  }
}
