//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure leaves as `{ "success": false, "error": <message> }`.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use rsvp_core::{ValidationError, envelope::ApiResponse};
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("unauthorized")]
  Unauthorized,

  #[error("invalid login credentials")]
  InvalidCredentials,

  /// `context` is the only part the caller sees.
  #[error("{context}: {source}")]
  Persistence {
    context: &'static str,
    #[source]
    source:  BoxError,
  },

  #[error("session provider error: {0}")]
  Session(#[source] BoxError),
}

impl ApiError {
  pub fn persistence(
    context: &'static str,
    source: impl std::error::Error + Send + Sync + 'static,
  ) -> Self {
    Self::Persistence { context, source: Box::new(source) }
  }

  pub fn session(source: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Session(Box::new(source))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
      ApiError::Persistence { .. } | ApiError::Session(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      ApiError::Validation(e) => e.to_string(),
      ApiError::Unauthorized => "Unauthorized".to_owned(),
      ApiError::InvalidCredentials => "Invalid login credentials".to_owned(),
      ApiError::Persistence { context, source } => {
        tracing::error!(error = %source, "{context}");
        (*context).to_owned()
      }
      ApiError::Session(source) => {
        tracing::error!(error = %source, "session provider failure");
        "Internal server error".to_owned()
      }
    };
    (status, Json(ApiResponse::<()>::err(message))).into_response()
  }
}
