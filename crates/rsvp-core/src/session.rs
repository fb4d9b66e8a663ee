//! The session provider contract.
//!
//! The provider owns all session state. Callers hold an opaque access token
//! and ask the provider who, if anyone, it belongs to.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::listeners::Subscription;

/// An authenticated administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
  pub id:    Uuid,
  pub email: String,
}

/// Email + password pair exchanged for a [`Session`].
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
  pub email:    String,
  pub password: String,
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credentials")
      .field("email", &self.email)
      .field("password", &"<redacted>")
      .finish()
  }
}

/// Proof of a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub access_token: String,
  pub user:         AdminUser,
  pub expires_at:   DateTime<Utc>,
}

/// A change in session state, delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
  SignedIn(AdminUser),
  SignedOut,
  /// The provider dropped the session on its own (TTL or revoked token).
  Expired,
}

impl SessionEvent {
  /// Whether a session exists after this event.
  pub fn has_session(&self) -> bool { matches!(self, Self::SignedIn(_)) }
}

/// Abstraction over the identity provider that issues administrator
/// sessions.
pub trait SessionProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Resolve `access_token` to its user. `None` when the token is unknown
  /// or expired.
  fn current_user<'a>(
    &'a self,
    access_token: &'a str,
  ) -> impl Future<Output = Result<Option<AdminUser>, Self::Error>> + Send + 'a;

  /// Exchange credentials for a session. `None` when the credentials are
  /// rejected.
  fn sign_in(
    &self,
    credentials: Credentials,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// End the session for `access_token`. Unknown tokens are not an error.
  fn sign_out<'a>(
    &'a self,
    access_token: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Register for session changes. Dropping the handle unregisters.
  fn subscribe(
    &self,
    listener: impl Fn(&SessionEvent) + Send + Sync + 'static,
  ) -> Subscription;
}
