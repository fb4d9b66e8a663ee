//! [`LocalSessionProvider`], an in-process [`SessionProvider`] backed by
//! argon2-hashed administrator accounts from configuration.
//!
//! Access tokens are 256 random bits, hex-encoded. Only the SHA-256 digest of
//! a token is kept in memory, so a dump of the session table cannot be
//! replayed. Expired sessions are dropped lazily when looked up.

use std::{
  collections::HashMap,
  sync::{Mutex, MutexGuard, PoisonError},
};

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::{self, SaltString},
};
use chrono::{DateTime, TimeDelta, Utc};
use rand_core::{OsRng, RngCore};
use rsvp_core::{
  listeners::{Listeners, Subscription},
  session::{AdminUser, Credentials, Session, SessionEvent, SessionProvider},
};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{Error, Result};

/// One administrator as written in `config.toml`.
#[derive(Clone, Deserialize)]
pub struct AdminAccount {
  pub email:         String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Produce the argon2 PHC string for `password` with a fresh salt.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::Hashing(e.to_string()))
}

fn issue_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

fn token_digest(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

struct Account {
  user:          AdminUser,
  password_hash: String,
}

struct ActiveSession {
  user:       AdminUser,
  expires_at: DateTime<Utc>,
}

pub struct LocalSessionProvider {
  accounts:  Vec<Account>,
  ttl:       TimeDelta,
  /// Keyed by token digest.
  active:    Mutex<HashMap<String, ActiveSession>>,
  listeners: Listeners<SessionEvent>,
}

impl LocalSessionProvider {
  /// Every hash is parsed up front so a typo in the config fails at startup
  /// instead of at the first sign-in.
  pub fn new(admins: &[AdminAccount], ttl: TimeDelta) -> Result<Self> {
    let accounts = admins
      .iter()
      .map(|admin| {
        PasswordHash::new(&admin.password_hash).map_err(|e| Error::PasswordHash {
          email:  admin.email.clone(),
          reason: e.to_string(),
        })?;
        Ok(Account {
          user:          AdminUser {
            id:    Uuid::new_v4(),
            email: admin.email.trim().to_owned(),
          },
          password_hash: admin.password_hash.clone(),
        })
      })
      .collect::<Result<Vec<_>>>()?;

    if accounts.is_empty() {
      tracing::warn!("no administrator accounts configured; every sign-in will be rejected");
    }

    Ok(Self {
      accounts,
      ttl,
      active: Mutex::new(HashMap::new()),
      listeners: Listeners::new(),
    })
  }

  fn sessions(&self) -> MutexGuard<'_, HashMap<String, ActiveSession>> {
    self.active.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn verify(&self, credentials: &Credentials) -> Result<Option<AdminUser>> {
    let email = credentials.email.trim();
    let Some(account) = self
      .accounts
      .iter()
      .find(|a| a.user.email.eq_ignore_ascii_case(email))
    else {
      return Ok(None);
    };

    let hash = PasswordHash::new(&account.password_hash).map_err(|e| Error::PasswordHash {
      email:  account.user.email.clone(),
      reason: e.to_string(),
    })?;

    match Argon2::default().verify_password(credentials.password.as_bytes(), &hash) {
      Ok(()) => Ok(Some(account.user.clone())),
      Err(password_hash::Error::Password) => Ok(None),
      Err(e) => Err(Error::Hashing(e.to_string())),
    }
  }
}

impl SessionProvider for LocalSessionProvider {
  type Error = Error;

  async fn current_user(&self, access_token: &str) -> Result<Option<AdminUser>> {
    let digest = token_digest(access_token);
    let mut sessions = self.sessions();

    let Some(session) = sessions.get(&digest) else {
      return Ok(None);
    };
    if session.expires_at > Utc::now() {
      return Ok(Some(session.user.clone()));
    }

    let email = session.user.email.clone();
    sessions.remove(&digest);
    drop(sessions);

    tracing::info!(%email, "session expired");
    self.listeners.emit(&SessionEvent::Expired);
    Ok(None)
  }

  async fn sign_in(&self, credentials: Credentials) -> Result<Option<Session>> {
    let Some(user) = self.verify(&credentials)? else {
      return Ok(None);
    };

    let access_token = issue_token();
    let now = Utc::now();
    let expires_at = now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
    {
      let mut sessions = self.sessions();
      sessions.retain(|_, s| s.expires_at > now);
      sessions.insert(
        token_digest(&access_token),
        ActiveSession { user: user.clone(), expires_at },
      );
    }

    self.listeners.emit(&SessionEvent::SignedIn(user.clone()));
    Ok(Some(Session { access_token, user, expires_at }))
  }

  async fn sign_out(&self, access_token: &str) -> Result<()> {
    let removed = self.sessions().remove(&token_digest(access_token));
    if let Some(session) = removed {
      tracing::info!(email = %session.user.email, "administrator signed out");
      self.listeners.emit(&SessionEvent::SignedOut);
    }
    Ok(())
  }

  fn subscribe(&self, listener: impl Fn(&SessionEvent) + Send + Sync + 'static) -> Subscription {
    self.listeners.subscribe(listener)
  }
}
