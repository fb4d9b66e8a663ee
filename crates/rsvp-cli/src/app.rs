//! Application state machine and event dispatcher.

use std::future::Future;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rsvp_core::{
  session::{AdminUser, Credentials},
  stats::ResponseFilter,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
  admin::{AdminView, RsvpSource},
  client::ApiClient,
  guard::{GuardedView, Navigator as _, Route, SessionClient},
};

/// Everything the admin TUI asks of the server.
pub trait AdminClient: SessionClient + RsvpSource {
  /// `Ok(None)` when the credentials are rejected.
  fn sign_in<'a>(
    &'a self,
    credentials: &'a Credentials,
  ) -> impl Future<Output = anyhow::Result<Option<AdminUser>>> + Send + 'a;
}

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  Login,
  Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
  Email,
  Password,
}

/// Work that awaits the network. Queued by key handlers and run after the
/// next frame is drawn, so the loading state is visible while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
  EnterAdmin,
  Refresh,
  SignIn,
  Logout,
}

// ─── Login form ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct LoginForm {
  pub email:    String,
  pub password: String,
  pub focus:    LoginField,
  pub error:    Option<String>,
  pub busy:     bool,
}

impl LoginForm {
  fn new(email: String) -> Self {
    let focus = if email.is_empty() { LoginField::Email } else { LoginField::Password };
    Self { email, password: String::new(), focus, error: None, busy: false }
  }

  fn field_mut(&mut self) -> &mut String {
    match self.focus {
      LoginField::Email => &mut self.email,
      LoginField::Password => &mut self.password,
    }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<C = ApiClient> {
  pub screen:   Screen,
  pub login:    LoginForm,
  pub guard:    GuardedView<UnboundedSender<Route>>,
  pub admin:    AdminView,
  /// Row under the cursor in the admin table.
  pub selected: usize,
  pub pending:  Option<Pending>,
  client:       C,
  nav:          UnboundedSender<Route>,
  routes:       UnboundedReceiver<Route>,
}

impl<C: AdminClient> App<C> {
  /// Start on the admin screen; the guard decides whether it stays there.
  pub fn new(client: C, email: String) -> Self {
    let (nav, routes) = mpsc::unbounded_channel();
    Self {
      screen: Screen::Admin,
      login: LoginForm::new(email),
      guard: GuardedView::new(nav.clone()),
      admin: AdminView::new(),
      selected: 0,
      pending: Some(Pending::EnterAdmin),
      client,
      nav,
      routes,
    }
  }

  // ── Routing ───────────────────────────────────────────────────────────────

  /// Apply navigation requests raised since the last frame.
  pub fn drain_routes(&mut self) {
    while let Ok(route) = self.routes.try_recv() {
      match route {
        Route::Login => {
          self.screen = Screen::Login;
          self.login = LoginForm::new(std::mem::take(&mut self.login.email));
        }
        Route::Admin => {
          self.screen = Screen::Admin;
          self.pending = Some(Pending::EnterAdmin);
        }
      }
    }
  }

  /// Run queued network work.
  pub async fn run_pending(&mut self) {
    let Some(pending) = self.pending.take() else {
      return;
    };
    match pending {
      Pending::EnterAdmin => {
        // Re-entry always starts a fresh gate and a fresh view.
        self.guard = GuardedView::new(self.nav.clone());
        self.admin = AdminView::new();
        self.selected = 0;
        self.guard.check(&self.client).await;
        if self.guard.is_authenticated() {
          self.admin.activate(&self.client).await;
        }
      }
      Pending::Refresh => {
        self.admin.refresh_guarded(&self.guard, &self.client).await;
        self.clamp_selection();
      }
      Pending::SignIn => self.sign_in().await,
      Pending::Logout => self.guard.logout(&self.client).await,
    }
  }

  async fn sign_in(&mut self) {
    let credentials = Credentials {
      email:    self.login.email.trim().to_owned(),
      password: self.login.password.clone(),
    };
    let outcome = self.client.sign_in(&credentials).await;
    self.login.busy = false;
    match outcome {
      Ok(Some(user)) => {
        tracing::info!(email = %user.email, "signed in");
        self.login.error = None;
        self.login.password.clear();
        self.nav.navigate(Route::Admin);
      }
      Ok(None) => self.login.error = Some("Invalid login credentials".into()),
      Err(e) => self.login.error = Some(e.to_string()),
    }
  }

  fn clamp_selection(&mut self) {
    let len = self.admin.visible().len();
    self.selected = self.selected.min(len.saturating_sub(1));
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }
    if self.pending.is_some() {
      return true;
    }

    match self.screen {
      Screen::Login => self.handle_login_key(key),
      Screen::Admin => self.handle_admin_key(key),
    }
  }

  fn handle_login_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Esc => return false,
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
        self.login.focus = match self.login.focus {
          LoginField::Email => LoginField::Password,
          LoginField::Password => LoginField::Email,
        };
      }
      KeyCode::Enter => {
        if self.login.focus == LoginField::Email {
          self.login.focus = LoginField::Password;
        } else if self.login.email.trim().is_empty() || self.login.password.is_empty() {
          self.login.error = Some("Email and password are required".into());
        } else {
          self.login.busy = true;
          self.pending = Some(Pending::SignIn);
        }
      }
      KeyCode::Backspace => {
        self.login.field_mut().pop();
      }
      KeyCode::Char(c) => self.login.field_mut().push(c),
      _ => {}
    }
    true
  }

  fn handle_admin_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      // Filters
      KeyCode::Char('a') => self.set_filter(ResponseFilter::All),
      KeyCode::Char('y') => self.set_filter(ResponseFilter::Yes),
      KeyCode::Char('n') => self.set_filter(ResponseFilter::No),
      KeyCode::Char('m') => self.set_filter(ResponseFilter::Maybe),

      KeyCode::Char('r') if self.guard.is_authenticated() => {
        self.admin.mark_loading();
        self.pending = Some(Pending::Refresh);
      }
      KeyCode::Char('o') if self.guard.is_authenticated() => {
        self.pending = Some(Pending::Logout);
      }

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        if self.selected + 1 < self.admin.visible().len() {
          self.selected += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.selected = self.selected.saturating_sub(1);
      }

      _ => {}
    }
    true
  }

  fn set_filter(&mut self, filter: ResponseFilter) {
    self.admin.set_filter(filter);
    self.selected = 0;
  }
}
