//! Error type for `rsvp-store-sqlite`.

use rsvp_core::store::Privilege;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] rsvp_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("stored guest count out of range: {0}")]
  GuestCount(i64),

  /// The key for this access level is not configured. Raised on use, never
  /// at open.
  #[error("no {0:?} access key configured")]
  MissingKey(Privilege),

  #[error("row policy denies {0} with restricted access")]
  PolicyDenied(&'static str),

  #[error("unsupported store url: {0:?}")]
  InvalidUrl(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
