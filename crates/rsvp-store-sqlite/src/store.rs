//! [`SqliteStore`], the SQLite implementation of [`RsvpStore`].

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use chrono::{SubsecRound as _, Utc};
use uuid::Uuid;

use rsvp_core::{
  rsvp::{NewRsvp, Rsvp},
  store::{Privilege, RsvpStore, SortOrder},
};

use crate::{
  encode::{encode_dt, encode_uuid, RawRsvp},
  schema::SCHEMA,
  Error, Result,
};

// ─── Location ────────────────────────────────────────────────────────────────

/// Where the database lives, parsed from a store URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
  Memory,
  File(PathBuf),
}

impl StoreLocation {
  /// Accepts `sqlite://<path>`, `sqlite::memory:`, `:memory:`, or a bare
  /// filesystem path. Any other URL scheme is rejected.
  pub fn parse(url: &str) -> Result<Self> {
    let url = url.trim();
    match url {
      "" => Err(Error::InvalidUrl(url.to_owned())),
      ":memory:" | "sqlite::memory:" | "sqlite://:memory:" => Ok(Self::Memory),
      _ => {
        if let Some(path) = url.strip_prefix("sqlite://") {
          Ok(Self::File(PathBuf::from(path)))
        } else if url.contains("://") {
          Err(Error::InvalidUrl(url.to_owned()))
        } else {
          Ok(Self::File(PathBuf::from(url)))
        }
      }
    }
  }
}

// ─── Access ──────────────────────────────────────────────────────────────────

/// Credentials for the two access levels.
///
/// Keys are checked on every call, not at open, so a store with no elevated
/// key opens fine and fails only when an elevated call is made.
#[derive(Clone, Default)]
pub struct AccessKeys {
  pub restricted: String,
  pub elevated:   Option<String>,
}

impl AccessKeys {
  fn has(&self, privilege: Privilege) -> bool {
    match privilege {
      Privilege::Restricted => !self.restricted.is_empty(),
      Privilege::Elevated => self.elevated.as_deref().is_some_and(|k| !k.is_empty()),
    }
  }
}

impl std::fmt::Debug for AccessKeys {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AccessKeys")
      .field("restricted", &!self.restricted.is_empty())
      .field("elevated", &self.has(Privilege::Elevated))
      .finish()
  }
}

/// Per-row policy applied to [`Privilege::Restricted`] calls.
///
/// Restricted callers never see rows. They may insert only when
/// `public_insert` is set. Elevated calls bypass the policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowPolicy {
  pub public_insert: bool,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An RSVP store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:   tokio_rusqlite::Connection,
  keys:   Arc<AccessKeys>,
  policy: RowPolicy,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>, keys: AccessKeys) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn, keys).await
  }

  /// Open a store that lives only as long as the connection.
  pub async fn open_in_memory(keys: AccessKeys) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn, keys).await
  }

  /// Open the store a URL points at. See [`StoreLocation::parse`].
  pub async fn connect(url: &str, keys: AccessKeys) -> Result<Self> {
    match StoreLocation::parse(url)? {
      StoreLocation::Memory => Self::open_in_memory(keys).await,
      StoreLocation::File(path) => Self::open(path, keys).await,
    }
  }

  pub fn with_policy(mut self, policy: RowPolicy) -> Self {
    self.policy = policy;
    self
  }

  async fn init(conn: tokio_rusqlite::Connection, keys: AccessKeys) -> Result<Self> {
    let store = Self { conn, keys: Arc::new(keys), policy: RowPolicy::default() };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  fn authorize(&self, privilege: Privilege) -> Result<()> {
    if self.keys.has(privilege) {
      Ok(())
    } else {
      Err(Error::MissingKey(privilege))
    }
  }
}

// ─── RsvpStore impl ──────────────────────────────────────────────────────────

impl RsvpStore for SqliteStore {
  type Error = Error;

  async fn insert_one(&self, privilege: Privilege, input: NewRsvp) -> Result<Rsvp> {
    self.authorize(privilege)?;
    if privilege == Privilege::Restricted && !self.policy.public_insert {
      return Err(Error::PolicyDenied("insert"));
    }

    // Truncate to the stored precision so the returned record matches what a
    // later read decodes.
    let rsvp = Rsvp {
      id:         Uuid::new_v4(),
      name:       input.name,
      response:   input.response,
      guests:     input.guests,
      message:    input.message,
      created_at: Utc::now().trunc_subsecs(6),
    };

    let id_str       = encode_uuid(rsvp.id);
    let name         = rsvp.name.clone();
    let response_str = rsvp.response.as_str();
    let guests       = i64::from(rsvp.guests);
    let message      = rsvp.message.clone();
    let at_str       = encode_dt(rsvp.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO rsvps (id, name, response, guests, message, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, name, response_str, guests, message, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(id = %rsvp.id, ?privilege, "inserted rsvp");
    Ok(rsvp)
  }

  async fn select_all(&self, privilege: Privilege, order: SortOrder) -> Result<Vec<Rsvp>> {
    self.authorize(privilege)?;
    if privilege == Privilege::Restricted {
      // No select policy exists for restricted callers; every row is hidden.
      return Ok(Vec::new());
    }

    // Ties on created_at fall back to insertion order.
    let direction = match order {
      SortOrder::NewestFirst => "DESC",
      SortOrder::OldestFirst => "ASC",
    };
    let sql = format!(
      "SELECT {} FROM rsvps ORDER BY created_at {direction}, rowid {direction}",
      RawRsvp::COLUMNS
    );

    let raws: Vec<RawRsvp> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawRsvp::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRsvp::into_rsvp).collect()
  }
}
