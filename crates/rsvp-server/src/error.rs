//! Error type for `rsvp-server`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("store error: {0}")]
  Store(#[from] rsvp_store_sqlite::Error),

  /// A configured PHC string could not be parsed.
  #[error("invalid password hash for {email}: {reason}")]
  PasswordHash { email: String, reason: String },

  #[error("argon2 error: {0}")]
  Hashing(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
