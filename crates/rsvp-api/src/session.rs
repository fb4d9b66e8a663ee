//! Handlers for `/auth`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/login` | Body: [`Credentials`]; sets the session cookie |
//! | `POST` | `/auth/logout` | Always succeeds; clears the session cookie |
//! | `GET`  | `/auth/user` | Session required |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::{HeaderMap, header},
  response::IntoResponse,
};
use chrono::Utc;
use rsvp_core::{
  envelope::ApiResponse,
  session::{AdminUser, Credentials, SessionProvider},
  store::RsvpStore,
};

use crate::{
  ApiState,
  auth::{AdminSession, access_token, clear_session_cookie, session_cookie},
  error::ApiError,
};

/// `POST /auth/login`
pub async fn login<S, P>(
  State(state): State<ApiState<S, P>>,
  body: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RsvpStore,
  P: SessionProvider,
{
  let Json(credentials) = body.map_err(|_| ApiError::InvalidCredentials)?;
  let email = credentials.email.clone();

  let session = state
    .sessions
    .sign_in(credentials)
    .await
    .map_err(ApiError::session)?
    .ok_or_else(|| {
      tracing::warn!(%email, "rejected sign-in");
      ApiError::InvalidCredentials
    })?;

  tracing::info!(%email, "administrator signed in");

  let mut headers = HeaderMap::new();
  let max_age = (session.expires_at - Utc::now()).num_seconds().max(0);
  if let Some(cookie) = session_cookie(&session.access_token, max_age) {
    headers.insert(header::SET_COOKIE, cookie);
  }
  Ok((headers, Json(ApiResponse::ok(session))))
}

/// `POST /auth/logout`
pub async fn logout<S, P>(
  State(state): State<ApiState<S, P>>,
  headers: HeaderMap,
) -> impl IntoResponse
where
  S: RsvpStore,
  P: SessionProvider,
{
  if let Some(token) = access_token(&headers)
    && let Err(e) = state.sessions.sign_out(&token).await
  {
    tracing::warn!(error = %e, "sign-out failed; clearing cookie anyway");
  }
  (
    [(header::SET_COOKIE, clear_session_cookie())],
    Json(ApiResponse::empty()),
  )
}

/// `GET /auth/user`
pub async fn user(admin: AdminSession) -> Json<ApiResponse<AdminUser>> {
  Json(ApiResponse::ok(admin.user))
}
