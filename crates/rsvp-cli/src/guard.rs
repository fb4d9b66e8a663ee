//! Session gate for the admin screen.
//!
//! A [`GuardedView`] starts in [`GuardState::Checking`], asks the session
//! client who is signed in, and settles on `Authenticated` or
//! `Unauthenticated`. Once authenticated it listens for session changes and
//! drops to `Unauthenticated` the moment the session goes away.
//! `Unauthenticated` always ends with a redirect to the login screen and is
//! final for this instance; a fresh check needs a fresh `GuardedView`.

use std::{
  future::Future,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use rsvp_core::{
  listeners::Subscription,
  session::{AdminUser, SessionEvent},
};
use tokio::sync::mpsc::UnboundedSender;

/// Screens the TUI can be sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
  Login,
  Admin,
}

/// Something that can switch the visible screen.
pub trait Navigator: Send + Sync + 'static {
  fn navigate(&self, route: Route);
}

impl Navigator for UnboundedSender<Route> {
  fn navigate(&self, route: Route) {
    if self.send(route).is_err() {
      tracing::debug!(?route, "navigation dropped; receiver closed");
    }
  }
}

/// The session operations the gate needs.
pub trait SessionClient: Send + Sync {
  fn current_user(&self) -> impl Future<Output = anyhow::Result<Option<AdminUser>>> + Send + '_;

  fn sign_out(&self) -> impl Future<Output = anyhow::Result<()>> + Send + '_;

  fn subscribe(&self, listener: impl Fn(&SessionEvent) + Send + Sync + 'static) -> Subscription;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
  Checking,
  Authenticated(AdminUser),
  Unauthenticated,
}

pub struct GuardedView<N> {
  state:        Arc<Mutex<GuardState>>,
  navigator:    Arc<N>,
  subscription: Option<Subscription>,
}

fn lock(state: &Mutex<GuardState>) -> MutexGuard<'_, GuardState> {
  state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Move to `Unauthenticated` and send the user to the login screen.
fn redirect<N: Navigator>(state: &Mutex<GuardState>, navigator: &N) {
  *lock(state) = GuardState::Unauthenticated;
  navigator.navigate(Route::Login);
}

impl<N: Navigator> GuardedView<N> {
  pub fn new(navigator: N) -> Self {
    Self {
      state:        Arc::new(Mutex::new(GuardState::Checking)),
      navigator:    Arc::new(navigator),
      subscription: None,
    }
  }

  pub fn state(&self) -> GuardState { lock(&self.state).clone() }

  /// The signed-in administrator, if the gate is open.
  pub fn user(&self) -> Option<AdminUser> {
    match &*lock(&self.state) {
      GuardState::Authenticated(user) => Some(user.clone()),
      _ => None,
    }
  }

  pub fn is_authenticated(&self) -> bool { self.user().is_some() }

  /// Resolve `Checking`. A failed check counts as no session. Calling this in
  /// any other state only reports the current state.
  pub async fn check<C: SessionClient>(&mut self, client: &C) -> GuardState {
    if *lock(&self.state) != GuardState::Checking {
      return self.state();
    }

    match client.current_user().await {
      Ok(Some(user)) => {
        tracing::debug!(email = %user.email, "session confirmed");
        *lock(&self.state) = GuardState::Authenticated(user);
        self.watch(client);
      }
      Ok(None) => redirect(&self.state, &*self.navigator),
      Err(e) => {
        tracing::warn!(error = %e, "session check failed");
        redirect(&self.state, &*self.navigator);
      }
    }
    self.state()
  }

  fn watch<C: SessionClient>(&mut self, client: &C) {
    let state = Arc::clone(&self.state);
    let navigator = Arc::clone(&self.navigator);
    self.subscription = Some(client.subscribe(move |event| {
      if event.has_session() {
        return;
      }
      let was_authenticated = matches!(*lock(&state), GuardState::Authenticated(_));
      if was_authenticated {
        tracing::info!(?event, "session ended");
        redirect(&state, &*navigator);
      }
    }));
  }

  /// Sign out and go to the login screen. Navigation does not depend on the
  /// sign-out succeeding or on any session event arriving.
  pub async fn logout<C: SessionClient>(&mut self, client: &C) {
    if let Some(subscription) = self.subscription.take() {
      subscription.unsubscribe();
    }
    if let Err(e) = client.sign_out().await {
      tracing::warn!(error = %e, "sign-out failed");
    }
    redirect(&self.state, &*self.navigator);
  }
}
