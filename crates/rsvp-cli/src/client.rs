//! Async HTTP client wrapping the RSVP JSON API.
//!
//! The client holds the access token after a successful sign-in and attaches
//! it as a bearer token. Any `401` on an authenticated call means the server
//! no longer honours the token, so it is dropped and subscribers hear
//! [`SessionEvent::Expired`].

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result, anyhow, bail};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use rsvp_core::{
  envelope::ApiResponse,
  listeners::{Listeners, Subscription},
  rsvp::{Rsvp, RsvpSubmission},
  session::{AdminUser, Credentials, Session, SessionEvent},
};
use serde::de::DeserializeOwned;

use crate::{admin::RsvpSource, app::AdminClient, form::RsvpSink, guard::SessionClient};

/// Connection settings for the RSVP API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async HTTP client for the RSVP JSON API.
///
/// Cheap to clone; clones share the token and the subscriber list.
#[derive(Clone)]
pub struct ApiClient {
  client:    Client,
  config:    ApiConfig,
  token:     Arc<Mutex<Option<String>>>,
  listeners: Listeners<SessionEvent>,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self {
      client,
      config,
      token: Arc::default(),
      listeners: Listeners::new(),
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn token(&self) -> Option<String> {
    self.token.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }

  fn take_token(&self) -> Option<String> {
    self.token.lock().unwrap_or_else(PoisonError::into_inner).take()
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match self.token() {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  /// Forget the token after the server refused it.
  fn expire(&self) {
    if self.take_token().is_some() {
      tracing::info!("session rejected by server");
      self.listeners.emit(&SessionEvent::Expired);
    }
  }

  // ── RSVPs ─────────────────────────────────────────────────────────────────

  /// `POST /api/rsvp`
  pub async fn submit_rsvp(&self, submission: &RsvpSubmission) -> Result<Rsvp> {
    let resp = self
      .client
      .post(self.url("/rsvp"))
      .json(submission)
      .send()
      .await
      .context("POST /rsvp failed")?;

    envelope(resp, "Failed to submit RSVP")
      .await?
      .ok_or_else(|| anyhow!("server returned no record"))
  }

  /// `GET /api/rsvp`
  pub async fn list_rsvps(&self) -> Result<Vec<Rsvp>> {
    let resp = self
      .auth(self.client.get(self.url("/rsvp")))
      .send()
      .await
      .context("GET /rsvp failed")?;

    if resp.status() == StatusCode::UNAUTHORIZED {
      self.expire();
      bail!("Unauthorized");
    }
    Ok(envelope(resp, "Failed to fetch RSVPs").await?.unwrap_or_default())
  }
}

/// Decode the response envelope, turning `success: false` into an error that
/// carries the server's message.
async fn envelope<T: DeserializeOwned>(resp: Response, what: &str) -> Result<Option<T>> {
  let status = resp.status();
  let body: ApiResponse<T> = resp
    .json()
    .await
    .with_context(|| format!("{what}: unreadable response ({status})"))?;
  body
    .into_result(&format!("{what} ({status})"))
    .map_err(|message| anyhow!(message))
}

// ─── Seams used by the view models ───────────────────────────────────────────

impl SessionClient for ApiClient {
  /// `GET /api/auth/user`
  async fn current_user(&self) -> Result<Option<AdminUser>> {
    if self.token().is_none() {
      return Ok(None);
    }
    let resp = self
      .auth(self.client.get(self.url("/auth/user")))
      .send()
      .await
      .context("GET /auth/user failed")?;

    if resp.status() == StatusCode::UNAUTHORIZED {
      self.expire();
      return Ok(None);
    }
    envelope(resp, "Session check failed").await
  }

  /// `POST /api/auth/logout`. The local token is dropped even if the request
  /// fails.
  async fn sign_out(&self) -> Result<()> {
    let Some(token) = self.take_token() else {
      return Ok(());
    };
    self.listeners.emit(&SessionEvent::SignedOut);

    self
      .client
      .post(self.url("/auth/logout"))
      .bearer_auth(token)
      .send()
      .await
      .context("POST /auth/logout failed")?;
    Ok(())
  }

  fn subscribe(&self, listener: impl Fn(&SessionEvent) + Send + Sync + 'static) -> Subscription {
    self.listeners.subscribe(listener)
  }
}

impl AdminClient for ApiClient {
  /// `POST /api/auth/login`. `Ok(None)` when the credentials are rejected.
  async fn sign_in(&self, credentials: &Credentials) -> Result<Option<AdminUser>> {
    let resp = self
      .client
      .post(self.url("/auth/login"))
      .json(credentials)
      .send()
      .await
      .context("POST /auth/login failed")?;

    if resp.status() == StatusCode::UNAUTHORIZED {
      return Ok(None);
    }
    let session: Session = envelope(resp, "Sign-in failed")
      .await?
      .ok_or_else(|| anyhow!("server returned no session"))?;

    *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.access_token);
    self.listeners.emit(&SessionEvent::SignedIn(session.user.clone()));
    Ok(Some(session.user))
  }
}

impl RsvpSource for ApiClient {
  async fn fetch_rsvps(&self) -> Result<Vec<Rsvp>> { self.list_rsvps().await }
}

impl RsvpSink for ApiClient {
  async fn submit(&self, submission: &RsvpSubmission) -> Result<Rsvp> {
    self.submit_rsvp(submission).await
  }
}
