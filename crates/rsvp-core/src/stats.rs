//! Aggregate counts and category filtering over a record set.
//!
//! Both are derived on read and never persisted.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::rsvp::{Rsvp, RsvpResponse};

/// Per-category counts plus the number of attending guests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpStats {
  pub total_yes:    usize,
  pub total_no:     usize,
  pub total_maybe:  usize,
  /// Sum of `guests` over `yes` records only.
  pub total_guests: u64,
}

impl RsvpStats {
  /// Fold over `records` once.
  pub fn compute<'a>(records: impl IntoIterator<Item = &'a Rsvp>) -> Self {
    records.into_iter().fold(Self::default(), |mut acc, rsvp| {
      match rsvp.response {
        RsvpResponse::Yes => {
          acc.total_yes += 1;
          acc.total_guests += u64::from(rsvp.guests);
        }
        RsvpResponse::No => acc.total_no += 1,
        RsvpResponse::Maybe => acc.total_maybe += 1,
      }
      acc
    })
  }

  pub fn count(&self, response: RsvpResponse) -> usize {
    match response {
      RsvpResponse::Yes => self.total_yes,
      RsvpResponse::No => self.total_no,
      RsvpResponse::Maybe => self.total_maybe,
    }
  }

  pub fn total_responses(&self) -> usize {
    self.total_yes + self.total_no + self.total_maybe
  }
}

/// Which records a view shows.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
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
pub enum ResponseFilter {
  #[default]
  All,
  Yes,
  No,
  Maybe,
}

impl ResponseFilter {
  /// The single category this filter narrows to, or `None` for `All`.
  pub fn response(self) -> Option<RsvpResponse> {
    match self {
      Self::All => None,
      Self::Yes => Some(RsvpResponse::Yes),
      Self::No => Some(RsvpResponse::No),
      Self::Maybe => Some(RsvpResponse::Maybe),
    }
  }

  pub fn matches(self, rsvp: &Rsvp) -> bool {
    self.response().is_none_or(|r| rsvp.response == r)
  }

  /// Borrow the matching records, preserving their order.
  pub fn apply<'a>(self, records: &'a [Rsvp]) -> Vec<&'a Rsvp> {
    records.iter().filter(|r| self.matches(r)).collect()
  }
}

impl From<RsvpResponse> for ResponseFilter {
  fn from(r: RsvpResponse) -> Self {
    match r {
      RsvpResponse::Yes => Self::Yes,
      RsvpResponse::No => Self::No,
      RsvpResponse::Maybe => Self::Maybe,
    }
  }
}
