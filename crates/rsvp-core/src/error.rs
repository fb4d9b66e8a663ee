//! Error types for `rsvp-core`.

use thiserror::Error;

/// Why a guest submission was rejected.
///
/// The `Display` text is what the guest sees, so it must stay free of
/// internal detail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("Name and response are required")]
  MissingRequired,

  #[error("Invalid response value")]
  InvalidResponse,

  #[error("Guest count must be a positive whole number")]
  InvalidGuests,

  #[error("Invalid request body")]
  MalformedBody,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown rsvp response: {0:?}")]
  UnknownResponse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
