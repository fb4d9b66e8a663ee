//! RSVP records and the guest submission that produces them.
//!
//! A record is written exactly once and never updated. The only way in is
//! [`RsvpSubmission::validate`], which is the single place the closed
//! response set and the required fields are enforced; stores persist what
//! they are given.

use std::str::FromStr as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{Error, ValidationError};

// ─── Response ────────────────────────────────────────────────────────────────

/// A guest's attendance answer. The set is closed.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RsvpResponse {
  Yes,
  No,
  Maybe,
}

impl RsvpResponse {
  /// Parse the wire tag (`"yes"`, `"no"`, `"maybe"`). Case-sensitive.
  pub fn parse(tag: &str) -> Result<Self, Error> {
    Self::from_str(tag).map_err(|_| Error::UnknownResponse(tag.to_owned()))
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Yes => "yes",
      Self::No => "no",
      Self::Maybe => "maybe",
    }
  }
}

// ─── Stored record ───────────────────────────────────────────────────────────

/// One guest's stored response. `id` and `created_at` are assigned by the
/// store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rsvp {
  pub id:         Uuid,
  pub name:       String,
  pub response:   RsvpResponse,
  pub guests:     u32,
  pub message:    Option<String>,
  pub created_at: DateTime<Utc>,
}

/// A validated record ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRsvp {
  pub name:     String,
  pub response: RsvpResponse,
  pub guests:   u32,
  pub message:  Option<String>,
}

// ─── Submission ──────────────────────────────────────────────────────────────

/// The raw write body as a guest sent it.
///
/// Every field is optional here so that a missing field surfaces as a
/// [`ValidationError`] rather than a deserialisation failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsvpSubmission {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub response: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub guests:   Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message:  Option<String>,
}

impl RsvpSubmission {
  pub fn new(name: impl Into<String>, response: RsvpResponse) -> Self {
    Self {
      name:     Some(name.into()),
      response: Some(response.as_str().to_owned()),
      guests:   None,
      message:  None,
    }
  }

  /// Check required fields and the closed response set, then normalise.
  ///
  /// `name` and `message` are trimmed; a blank message becomes `None`.
  /// An omitted or zero guest count becomes 1.
  pub fn validate(self) -> Result<NewRsvp, ValidationError> {
    let name = self
      .name
      .as_deref()
      .map(str::trim)
      .filter(|n| !n.is_empty())
      .ok_or(ValidationError::MissingRequired)?;

    let tag = self
      .response
      .as_deref()
      .filter(|r| !r.is_empty())
      .ok_or(ValidationError::MissingRequired)?;

    let response =
      RsvpResponse::parse(tag).map_err(|_| ValidationError::InvalidResponse)?;

    let guests = match self.guests {
      None | Some(0) => 1,
      Some(n) => u32::try_from(n).map_err(|_| ValidationError::InvalidGuests)?,
    };

    let message = self
      .message
      .as_deref()
      .map(str::trim)
      .filter(|m| !m.is_empty())
      .map(str::to_owned);

    Ok(NewRsvp {
      name: name.to_owned(),
      response,
      guests,
      message,
    })
  }
}
