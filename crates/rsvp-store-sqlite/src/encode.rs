//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that lexical order equals chronological order. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use rsvp_core::rsvp::{Rsvp, RsvpResponse};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw column values read directly from an `rsvps` row.
pub struct RawRsvp {
  pub id:         String,
  pub name:       String,
  pub response:   String,
  pub guests:     i64,
  pub message:    Option<String>,
  pub created_at: String,
}

impl RawRsvp {
  pub const COLUMNS: &'static str = "id, name, response, guests, message, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      response:   row.get(2)?,
      guests:     row.get(3)?,
      message:    row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_rsvp(self) -> Result<Rsvp> {
    Ok(Rsvp {
      id:         decode_uuid(&self.id)?,
      name:       self.name,
      response:   RsvpResponse::parse(&self.response)?,
      guests:     u32::try_from(self.guests).map_err(|_| Error::GuestCount(self.guests))?,
      message:    self.message,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width_and_sort_lexically() {
    let early = Utc.with_ymd_and_hms(2026, 6, 20, 15, 0, 0).unwrap();
    let late = early + chrono::Duration::milliseconds(250);
    let (a, b) = (encode_dt(early), encode_dt(late));
    assert_eq!(a, "2026-06-20T15:00:00.000000Z");
    assert_eq!(a.len(), b.len());
    assert!(a < b);
    assert_eq!(decode_dt(&b).unwrap(), late);
  }

  #[test]
  fn unknown_response_fails_to_decode() {
    let raw = RawRsvp {
      id:         encode_uuid(Uuid::new_v4()),
      name:       "Sam".into(),
      response:   "unsure".into(),
      guests:     1,
      message:    None,
      created_at: encode_dt(Utc::now()),
    };
    assert!(matches!(
      raw.into_rsvp(),
      Err(Error::Core(rsvp_core::Error::UnknownResponse(_)))
    ));
  }
}
