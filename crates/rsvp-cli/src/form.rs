//! Guest RSVP form model.
//!
//! Holds what the guest typed. A failed submission leaves every field as it
//! was so the guest can fix it and try again; a successful one locks the form.

use std::future::Future;

use rsvp_core::rsvp::{Rsvp, RsvpSubmission};

/// Where a finished form is sent.
pub trait RsvpSink: Send + Sync {
  fn submit<'a>(
    &'a self,
    submission: &'a RsvpSubmission,
  ) -> impl Future<Output = anyhow::Result<Rsvp>> + Send + 'a;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus {
  Editing,
  Failed(String),
  Submitted(Rsvp),
}

#[derive(Debug, Clone)]
pub struct RsvpForm {
  pub name:     String,
  pub response: String,
  pub guests:   Option<i64>,
  pub message:  String,
  status:       FormStatus,
}

impl RsvpForm {
  pub fn new(name: impl Into<String>, response: impl Into<String>) -> Self {
    Self {
      name:     name.into(),
      response: response.into(),
      guests:   None,
      message:  String::new(),
      status:   FormStatus::Editing,
    }
  }

  pub fn status(&self) -> &FormStatus { &self.status }

  pub fn is_submitted(&self) -> bool { matches!(self.status, FormStatus::Submitted(_)) }

  pub fn submission(&self) -> RsvpSubmission {
    RsvpSubmission {
      name:     Some(self.name.clone()),
      response: Some(self.response.clone()),
      guests:   self.guests,
      message:  Some(self.message.clone()).filter(|m| !m.trim().is_empty()),
    }
  }

  /// Check locally, then send. Input the server would reject never leaves
  /// the form.
  pub async fn submit<S: RsvpSink>(&mut self, sink: &S) -> &FormStatus {
    if self.is_submitted() {
      return &self.status;
    }

    let submission = self.submission();
    if let Err(e) = submission.clone().validate() {
      self.status = FormStatus::Failed(e.to_string());
      return &self.status;
    }

    self.status = match sink.submit(&submission).await {
      Ok(rsvp) => {
        tracing::info!(id = %rsvp.id, "rsvp submitted");
        FormStatus::Submitted(rsvp)
      }
      Err(e) => FormStatus::Failed(e.to_string()),
    };
    &self.status
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use anyhow::bail;
  use chrono::Utc;
  use rsvp_core::rsvp::RsvpResponse;
  use uuid::Uuid;

  use super::*;

  #[derive(Default)]
  struct StubSink {
    fail:  bool,
    calls: AtomicUsize,
  }

  impl RsvpSink for StubSink {
    async fn submit(&self, submission: &RsvpSubmission) -> anyhow::Result<Rsvp> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if self.fail {
        bail!("Failed to save RSVP");
      }
      let input = submission.clone().validate()?;
      Ok(Rsvp {
        id:         Uuid::new_v4(),
        name:       input.name,
        response:   input.response,
        guests:     input.guests,
        message:    input.message,
        created_at: Utc::now(),
      })
    }
  }

  #[tokio::test]
  async fn successful_submit_locks_the_form() {
    let sink = StubSink::default();
    let mut form = RsvpForm::new("Alex Kim", "yes");
    form.guests = Some(2);

    let rsvp = match form.submit(&sink).await {
      FormStatus::Submitted(rsvp) => rsvp.clone(),
      other => panic!("expected submitted, got {other:?}"),
    };
    assert_eq!(rsvp.guests, 2);
    assert_eq!(rsvp.response, RsvpResponse::Yes);
    assert_eq!(rsvp.message, None);

    form.submit(&sink).await;
    assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn invalid_input_never_reaches_the_sink() {
    let sink = StubSink::default();
    let mut form = RsvpForm::new("Sam", "unsure");

    assert_eq!(
      form.submit(&sink).await,
      &FormStatus::Failed("Invalid response value".into())
    );
    assert_eq!(sink.calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn server_failure_keeps_fields_for_retry() {
    let sink = StubSink { fail: true, ..StubSink::default() };
    let mut form = RsvpForm::new("Casey", "maybe");
    form.message = "Will confirm soon".into();

    assert_eq!(
      form.submit(&sink).await,
      &FormStatus::Failed("Failed to save RSVP".into())
    );
    assert_eq!(form.name, "Casey");
    assert_eq!(form.message, "Will confirm soon");
    assert!(!form.is_submitted());

    let retry_sink = StubSink::default();
    form.submit(&retry_sink).await;
    assert!(form.is_submitted());
  }

  #[test]
  fn blank_message_is_omitted() {
    let mut form = RsvpForm::new("Drew", "no");
    form.message = "   ".into();
    assert_eq!(form.submission().message, None);
  }
}
