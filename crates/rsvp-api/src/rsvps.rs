//! Handlers for `/rsvp`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/rsvp` | Public. Body: [`RsvpSubmission`]; returns 201 + stored record |
//! | `GET`  | `/rsvp` | Session required; every record, newest first |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use rsvp_core::{
  ValidationError,
  envelope::ApiResponse,
  rsvp::{Rsvp, RsvpSubmission},
  session::SessionProvider,
  store::{Privilege, RsvpStore, SortOrder},
};

use crate::{ApiState, auth::AdminSession, error::ApiError};

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /rsvp`: validate, then insert exactly one row.
///
/// Validation happens before the store is touched; a rejected submission
/// writes nothing.
pub async fn create<S, P>(
  State(state): State<ApiState<S, P>>,
  body: Result<Json<RsvpSubmission>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RsvpStore,
  P: SessionProvider,
{
  let Json(submission) = body.map_err(|rejection| {
    tracing::debug!(%rejection, "unreadable rsvp body");
    ValidationError::MalformedBody
  })?;

  let input = submission.validate()?;

  let rsvp = state
    .store
    .insert_one(state.intake_privilege, input)
    .await
    .map_err(|e| ApiError::persistence("Failed to save RSVP", e))?;

  tracing::info!(
    id = %rsvp.id,
    response = %rsvp.response,
    guests = rsvp.guests,
    "rsvp recorded"
  );
  Ok((StatusCode::CREATED, Json(ApiResponse::ok(rsvp))))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /rsvp`: all records, newest first. No pagination or server-side
/// filtering.
pub async fn list<S, P>(
  State(state): State<ApiState<S, P>>,
  admin: AdminSession,
) -> Result<Json<ApiResponse<Vec<Rsvp>>>, ApiError>
where
  S: RsvpStore,
  P: SessionProvider,
{
  let rsvps = state
    .store
    .select_all(Privilege::Elevated, SortOrder::NewestFirst)
    .await
    .map_err(|e| ApiError::persistence("Failed to fetch RSVPs", e))?;

  tracing::debug!(admin = %admin.user.email, count = rsvps.len(), "listed rsvps");
  Ok(Json(ApiResponse::ok(rsvps)))
}
