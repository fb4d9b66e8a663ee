//! The `RsvpStore` trait and the access levels it is called with.
//!
//! The trait is implemented by storage backends (e.g. `rsvp-store-sqlite`).
//! Handlers depend on this abstraction, not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::rsvp::{NewRsvp, Rsvp};

/// Which credential a call is made with.
///
/// `Elevated` bypasses the store's per-row policy. `Restricted` is subject
/// to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privilege {
  Restricted,
  Elevated,
}

/// Ordering on `created_at` for [`RsvpStore::select_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
  #[default]
  NewestFirst,
  OldestFirst,
}

/// Abstraction over an RSVP store backend.
///
/// Records are insert-only; there is no update or delete.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RsvpStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert one record and return it with the store-assigned `id` and
  /// `created_at`.
  fn insert_one(
    &self,
    privilege: Privilege,
    input: NewRsvp,
  ) -> impl Future<Output = Result<Rsvp, Self::Error>> + Send + '_;

  /// Return every record visible at `privilege`, ordered by `created_at`.
  fn select_all(
    &self,
    privilege: Privilege,
    order: SortOrder,
  ) -> impl Future<Output = Result<Vec<Rsvp>, Self::Error>> + Send + '_;
}
