//! JSON API for the RSVP service.
//!
//! Exposes an axum [`Router`] backed by any [`RsvpStore`] and
//! [`SessionProvider`]. TLS and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rsvp_api::api_router(state))
//! ```

pub mod auth;
pub mod error;
pub mod rsvps;
pub mod session;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use rsvp_core::{
  session::SessionProvider,
  store::{Privilege, RsvpStore},
};

pub use auth::{AdminSession, SESSION_COOKIE};
pub use error::ApiError;

// ─── State ────────────────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S, P> {
  pub store:            Arc<S>,
  pub sessions:         Arc<P>,
  /// Access level for public guest writes. Reads always use
  /// [`Privilege::Elevated`].
  pub intake_privilege: Privilege,
}

impl<S, P> ApiState<S, P> {
  pub fn new(store: Arc<S>, sessions: Arc<P>) -> Self {
    Self { store, sessions, intake_privilege: Privilege::Elevated }
  }

  pub fn with_intake_privilege(mut self, privilege: Privilege) -> Self {
    self.intake_privilege = privilege;
    self
  }
}

impl<S, P> Clone for ApiState<S, P> {
  fn clone(&self) -> Self {
    Self {
      store:            Arc::clone(&self.store),
      sessions:         Arc::clone(&self.sessions),
      intake_privilege: self.intake_privilege,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, P>(state: ApiState<S, P>) -> Router<()>
where
  S: RsvpStore + 'static,
  P: SessionProvider + 'static,
{
  Router::new()
    // Guest responses
    .route("/rsvp", get(rsvps::list::<S, P>).post(rsvps::create::<S, P>))
    // Administrator sessions
    .route("/auth/login", post(session::login::<S, P>))
    .route("/auth/logout", post(session::logout::<S, P>))
    .route("/auth/user", get(session::user))
    .with_state(state)
}
