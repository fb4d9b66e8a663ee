//! Wiring for the RSVP HTTP server.
//!
//! Turns a [`ServerConfig`] into a ready-to-serve axum [`Router`]: the SQLite
//! store, the local session provider, and the JSON API nested under `/api`.

pub mod error;
pub mod sessions;

pub use error::{Error, Result};

use std::sync::Arc;

use axum::Router;
use chrono::TimeDelta;
use rsvp_api::{ApiState, api_router};
use rsvp_core::store::Privilege;
use rsvp_store_sqlite::{AccessKeys, RowPolicy, SqliteStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use sessions::{AdminAccount, LocalSessionProvider};

/// State type the server runs with.
pub type AppState = ApiState<SqliteStore, LocalSessionProvider>;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `RSVP_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  /// `sqlite://<path>`, a bare path, or `:memory:`.
  pub store_url:            String,
  pub anon_key:             String,
  /// Read on first elevated call, not at startup.
  #[serde(default)]
  pub service_role_key:     Option<String>,
  #[serde(default = "default_intake_privilege")]
  pub intake_privilege:     Privilege,
  #[serde(default)]
  pub public_insert_policy: bool,
  #[serde(default = "default_session_ttl_secs")]
  pub session_ttl_secs:     u64,
  #[serde(default)]
  pub admins:               Vec<AdminAccount>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 3000 }

fn default_intake_privilege() -> Privilege { Privilege::Elevated }

fn default_session_ttl_secs() -> u64 { 3600 }

impl ServerConfig {
  pub fn access_keys(&self) -> AccessKeys {
    AccessKeys {
      restricted: self.anon_key.clone(),
      elevated:   self.service_role_key.clone(),
    }
  }

  pub fn session_ttl(&self) -> TimeDelta {
    i64::try_from(self.session_ttl_secs)
      .ok()
      .and_then(TimeDelta::try_seconds)
      .unwrap_or(TimeDelta::MAX)
  }

  pub async fn open_store(&self) -> Result<SqliteStore> {
    let store = SqliteStore::connect(&self.store_url, self.access_keys())
      .await?
      .with_policy(RowPolicy { public_insert: self.public_insert_policy });
    Ok(store)
  }

  fn warn_on_gaps(&self) {
    if self.service_role_key.as_deref().is_none_or(str::is_empty) {
      tracing::warn!(
        "service_role_key is not set; admin reads and elevated writes will fail until it is"
      );
    }
    if self.intake_privilege == Privilege::Restricted && !self.public_insert_policy {
      tracing::warn!(
        "intake_privilege is restricted but public_insert_policy is off; guest submissions will be denied"
      );
    }
  }
}

// ─── Application ──────────────────────────────────────────────────────────────

/// Open the store and build the session provider described by `config`.
pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
  config.warn_on_gaps();

  let store = config.open_store().await?;
  let sessions = LocalSessionProvider::new(&config.admins, config.session_ttl())?;

  tracing::info!(
    store = %config.store_url,
    intake = ?config.intake_privilege,
    admins = config.admins.len(),
    "state ready"
  );

  Ok(ApiState::new(Arc::new(store), Arc::new(sessions))
    .with_intake_privilege(config.intake_privilege))
}

/// Build the full server router with request tracing.
pub fn app(state: AppState) -> Router {
  Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests;
