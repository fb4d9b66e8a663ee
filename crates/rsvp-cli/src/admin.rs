//! Admin view model: fetch, aggregate, filter.
//!
//! The view fetches the full record set once when activated and again on
//! every manual refresh. Statistics are recomputed from the whole set on
//! each successful fetch. Filtering only narrows what is displayed.

use std::future::Future;

use chrono::{DateTime, TimeZone, Utc};
use rsvp_core::{
  rsvp::{Rsvp, RsvpResponse},
  stats::{ResponseFilter, RsvpStats},
};

use crate::guard::{GuardedView, Navigator};

/// Where the admin view gets its records.
pub trait RsvpSource: Send + Sync {
  fn fetch_rsvps(&self) -> impl Future<Output = anyhow::Result<Vec<Rsvp>>> + Send + '_;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
  Idle,
  Loading,
  /// The last fetch failed with this message. No retry is scheduled.
  Failed(String),
  Ready,
}

/// One table row, already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsvpRow {
  pub name:     String,
  pub response: RsvpResponse,
  pub guests:   u32,
  pub message:  String,
  pub created:  String,
}

/// Shown when a guest left no message.
pub const NO_MESSAGE: &str = "-";

/// Render a creation time as e.g. `Jun 1, 2025, 03:04 PM` in `tz`.
pub fn format_created<Tz>(at: DateTime<Utc>, tz: &Tz) -> String
where
  Tz: TimeZone,
  Tz::Offset: std::fmt::Display,
{
  at.with_timezone(tz).format("%b %-d, %Y, %I:%M %p").to_string()
}

#[derive(Debug)]
pub struct AdminView {
  load:      LoadState,
  activated: bool,
  rsvps:     Vec<Rsvp>,
  stats:     RsvpStats,
  filter:    ResponseFilter,
}

impl Default for AdminView {
  fn default() -> Self { Self::new() }
}

impl AdminView {
  pub fn new() -> Self {
    Self {
      load:      LoadState::Idle,
      activated: false,
      rsvps:     Vec::new(),
      stats:     RsvpStats::default(),
      filter:    ResponseFilter::All,
    }
  }

  pub fn load_state(&self) -> &LoadState { &self.load }

  pub fn stats(&self) -> RsvpStats { self.stats }

  pub fn filter(&self) -> ResponseFilter { self.filter }

  pub fn rsvps(&self) -> &[Rsvp] { &self.rsvps }

  /// Show the loading indicator before the fetch is awaited.
  pub fn mark_loading(&mut self) { self.load = LoadState::Loading; }

  /// First fetch. Later calls are no-ops; use [`refresh`](Self::refresh).
  pub async fn activate<S: RsvpSource>(&mut self, source: &S) {
    if self.activated {
      return;
    }
    self.activated = true;
    self.refresh(source).await;
  }

  /// Fetch again and replace the record set and statistics. On failure the
  /// previous records are kept but not shown.
  pub async fn refresh<S: RsvpSource>(&mut self, source: &S) {
    self.mark_loading();
    match source.fetch_rsvps().await {
      Ok(rsvps) => {
        self.stats = RsvpStats::compute(&rsvps);
        self.rsvps = rsvps;
        self.load = LoadState::Ready;
        tracing::debug!(count = self.rsvps.len(), "rsvps loaded");
      }
      Err(e) => {
        tracing::warn!(error = %e, "rsvp fetch failed");
        self.load = LoadState::Failed(e.to_string());
      }
    }
  }

  /// Refresh only while `guard` holds a session. Returns whether a fetch was
  /// made.
  pub async fn refresh_guarded<S, N>(&mut self, guard: &GuardedView<N>, source: &S) -> bool
  where
    S: RsvpSource,
    N: Navigator,
  {
    if !guard.is_authenticated() {
      return false;
    }
    self.refresh(source).await;
    true
  }

  pub fn set_filter(&mut self, filter: ResponseFilter) { self.filter = filter; }

  /// Records in the current filter, newest first as fetched.
  pub fn visible(&self) -> Vec<&Rsvp> { self.filter.apply(&self.rsvps) }

  /// Tab badge count for `filter`.
  pub fn count_for(&self, filter: ResponseFilter) -> usize {
    match filter.response() {
      None => self.rsvps.len(),
      Some(response) => self.stats.count(response),
    }
  }

  pub fn rows<Tz>(&self, tz: &Tz) -> Vec<RsvpRow>
  where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
  {
    self
      .visible()
      .into_iter()
      .map(|r| RsvpRow {
        name:     r.name.clone(),
        response: r.response,
        guests:   r.guests,
        message:  r.message.clone().unwrap_or_else(|| NO_MESSAGE.to_owned()),
        created:  format_created(r.created_at, tz),
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  };

  use anyhow::anyhow;
  use rsvp_core::{
    listeners::{Listeners, Subscription},
    session::{AdminUser, SessionEvent},
  };
  use tokio::sync::mpsc;
  use uuid::Uuid;

  use super::*;
  use crate::guard::{GuardState, Route, SessionClient};

  fn rsvp(name: &str, response: RsvpResponse, guests: u32, minute: u32) -> Rsvp {
    Rsvp {
      id: Uuid::new_v4(),
      name: name.into(),
      response,
      guests,
      message: None,
      created_at: Utc.with_ymd_and_hms(2025, 6, 1, 15, minute, 0).unwrap(),
    }
  }

  struct StubSource {
    batches: Mutex<Vec<anyhow::Result<Vec<Rsvp>>>>,
    calls:   AtomicUsize,
  }

  impl StubSource {
    fn returning(batches: Vec<anyhow::Result<Vec<Rsvp>>>) -> Self {
      let mut batches = batches;
      batches.reverse();
      Self { batches: Mutex::new(batches), calls: AtomicUsize::new(0) }
    }

    fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
  }

  impl RsvpSource for StubSource {
    async fn fetch_rsvps(&self) -> anyhow::Result<Vec<Rsvp>> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      self
        .batches
        .lock()
        .unwrap()
        .pop()
        .unwrap_or_else(|| Ok(Vec::new()))
    }
  }

  fn sample() -> Vec<Rsvp> {
    let mut with_message = rsvp("Alex Kim", RsvpResponse::Yes, 2, 4);
    with_message.message = Some("Can't wait!".into());
    vec![
      with_message,
      rsvp("Blair", RsvpResponse::No, 3, 3),
      rsvp("Casey", RsvpResponse::Maybe, 1, 2),
      rsvp("Drew", RsvpResponse::Yes, 1, 1),
    ]
  }

  #[tokio::test]
  async fn activation_fetches_exactly_once() {
    let source = StubSource::returning(vec![Ok(sample())]);
    let mut view = AdminView::new();
    assert_eq!(view.load_state(), &LoadState::Idle);

    view.activate(&source).await;
    view.activate(&source).await;

    assert_eq!(source.calls(), 1);
    assert_eq!(view.load_state(), &LoadState::Ready);
    assert_eq!(view.rsvps().len(), 4);
  }

  #[tokio::test]
  async fn stats_fold_over_the_full_set() {
    let source = StubSource::returning(vec![Ok(sample())]);
    let mut view = AdminView::new();
    view.activate(&source).await;

    let stats = view.stats();
    assert_eq!((stats.total_yes, stats.total_no, stats.total_maybe), (2, 1, 1));
    assert_eq!(stats.total_guests, 3);
  }

  #[tokio::test]
  async fn failure_is_reported_without_retry() {
    let source = StubSource::returning(vec![Err(anyhow!("Failed to fetch RSVPs"))]);
    let mut view = AdminView::new();
    view.activate(&source).await;

    assert_eq!(view.load_state(), &LoadState::Failed("Failed to fetch RSVPs".into()));
    assert_eq!(source.calls(), 1);
  }

  #[tokio::test]
  async fn refresh_replaces_records_and_stats() {
    let source = StubSource::returning(vec![
      Ok(sample()),
      Ok(vec![rsvp("Emery", RsvpResponse::Yes, 5, 5)]),
    ]);
    let mut view = AdminView::new();
    view.activate(&source).await;
    view.refresh(&source).await;

    assert_eq!(source.calls(), 2);
    assert_eq!(view.rsvps().len(), 1);
    assert_eq!(view.stats().total_guests, 5);
    assert_eq!(view.stats().total_no, 0);
  }

  #[tokio::test]
  async fn filter_narrows_without_refetching() {
    let source = StubSource::returning(vec![Ok(sample())]);
    let mut view = AdminView::new();
    view.activate(&source).await;

    view.set_filter(ResponseFilter::Yes);
    let names: Vec<_> = view.visible().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Alex Kim", "Drew"]);

    view.set_filter(ResponseFilter::All);
    assert_eq!(view.visible().len(), 4);
    assert_eq!(view.rsvps().len(), 4);
    assert_eq!(source.calls(), 1);

    assert_eq!(view.count_for(ResponseFilter::All), 4);
    assert_eq!(view.count_for(ResponseFilter::Maybe), 1);
  }

  #[tokio::test]
  async fn rows_format_message_and_time() {
    let source = StubSource::returning(vec![Ok(sample())]);
    let mut view = AdminView::new();
    view.activate(&source).await;

    let rows = view.rows(&Utc);
    assert_eq!(rows[0].message, "Can't wait!");
    assert_eq!(rows[0].created, "Jun 1, 2025, 03:04 PM");
    assert_eq!(rows[1].message, NO_MESSAGE);
    assert_eq!(rows[1].response, RsvpResponse::No);
  }

  // ─── Guarded refresh ───────────────────────────────────────────────────────

  struct Session {
    user:      AdminUser,
    listeners: Listeners<SessionEvent>,
  }

  impl SessionClient for Session {
    async fn current_user(&self) -> anyhow::Result<Option<AdminUser>> {
      Ok(Some(self.user.clone()))
    }

    async fn sign_out(&self) -> anyhow::Result<()> { Ok(()) }

    fn subscribe(&self, listener: impl Fn(&SessionEvent) + Send + Sync + 'static) -> Subscription {
      self.listeners.subscribe(listener)
    }
  }

  #[tokio::test]
  async fn expiry_mid_session_stops_further_fetches() {
    let session = Session {
      user:      AdminUser { id: Uuid::new_v4(), email: "host@example.com".into() },
      listeners: Listeners::new(),
    };
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut guard = GuardedView::new(tx);
    guard.check(&session).await;

    let source = StubSource::returning(vec![Ok(sample()), Ok(sample())]);
    let mut view = AdminView::new();
    view.activate(&source).await;
    assert!(view.refresh_guarded(&guard, &source).await);
    assert_eq!(source.calls(), 2);

    session.listeners.emit(&SessionEvent::Expired);

    assert_eq!(guard.state(), GuardState::Unauthenticated);
    assert_eq!(rx.try_recv().ok(), Some(Route::Login));
    assert!(!view.refresh_guarded(&guard, &source).await);
    assert_eq!(source.calls(), 2);
  }
}
