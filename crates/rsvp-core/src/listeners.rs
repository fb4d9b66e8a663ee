//! A small observer registry.
//!
//! [`Listeners::subscribe`] returns a [`Subscription`]; the callback stays
//! registered until the handle is dropped or explicitly unsubscribed.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Registry<E> {
  next_id:   u64,
  callbacks: Vec<(u64, Callback<E>)>,
}

fn lock<E>(m: &Mutex<Registry<E>>) -> MutexGuard<'_, Registry<E>> {
  m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A set of callbacks interested in events of type `E`.
///
/// Cloning is cheap and clones share the same registry.
pub struct Listeners<E> {
  inner: Arc<Mutex<Registry<E>>>,
}

impl<E> Clone for Listeners<E> {
  fn clone(&self) -> Self { Self { inner: Arc::clone(&self.inner) } }
}

impl<E> Default for Listeners<E> {
  fn default() -> Self {
    Self {
      inner: Arc::new(Mutex::new(Registry { next_id: 0, callbacks: Vec::new() })),
    }
  }
}

impl<E: 'static> Listeners<E> {
  pub fn new() -> Self { Self::default() }

  /// Register `callback`. It is invoked synchronously from [`emit`](Self::emit).
  pub fn subscribe(
    &self,
    callback: impl Fn(&E) + Send + Sync + 'static,
  ) -> Subscription {
    let id = {
      let mut registry = lock(&self.inner);
      let id = registry.next_id;
      registry.next_id += 1;
      registry.callbacks.push((id, Arc::new(callback)));
      id
    };

    let weak: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.inner);
    Subscription {
      cancel: Some(Box::new(move || {
        if let Some(inner) = weak.upgrade() {
          lock(&inner).callbacks.retain(|(cb_id, _)| *cb_id != id);
        }
      })),
    }
  }

  /// Deliver `event` to every registered callback.
  ///
  /// Callbacks run outside the registry lock, so a callback may itself
  /// subscribe or drop a subscription.
  pub fn emit(&self, event: &E) {
    let callbacks: Vec<Callback<E>> = lock(&self.inner)
      .callbacks
      .iter()
      .map(|(_, cb)| Arc::clone(cb))
      .collect();
    for cb in callbacks {
      cb(event);
    }
  }

  pub fn len(&self) -> usize { lock(&self.inner).callbacks.len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Handle returned by [`Listeners::subscribe`]. Dropping it unregisters the
/// callback.
#[must_use = "dropping a Subscription unregisters its callback"]
pub struct Subscription {
  cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
  pub fn unsubscribe(mut self) { self.cancel_now(); }

  fn cancel_now(&mut self) {
    if let Some(cancel) = self.cancel.take() {
      cancel();
    }
  }
}

impl Drop for Subscription {
  fn drop(&mut self) { self.cancel_now(); }
}

impl std::fmt::Debug for Subscription {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription")
      .field("active", &self.cancel.is_some())
      .finish()
  }
}
