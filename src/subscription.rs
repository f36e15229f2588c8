//! Composable, idempotent disposable handles.

use std::{
  cell::RefCell,
  fmt::{Debug, Formatter},
  mem,
  rc::{Rc, Weak},
};

use smallvec::SmallVec;

use crate::{
  config,
  error::{BoxError, UnsubscriptionError},
};

/// Logic run when a [`Subscription`] closes.
#[derive(Default)]
pub enum Teardown {
  #[default]
  None,
  Subscription(Subscription),
  Fn(Box<dyn FnOnce() -> Result<(), BoxError>>),
}

impl Teardown {
  /// Wrap fallible teardown logic. Its error is collected into the
  /// [`UnsubscriptionError`] of the closing subscription.
  pub fn try_from_fn(f: impl FnOnce() -> Result<(), BoxError> + 'static) -> Self {
    Teardown::Fn(Box::new(f))
  }

  fn execute(self) -> Result<(), BoxError> {
    match self {
      Teardown::None => Ok(()),
      Teardown::Subscription(s) => s.unsubscribe().map_err(|e| Box::new(e) as BoxError),
      Teardown::Fn(f) => f(),
    }
  }

  fn is_subscription(&self, sub: &Subscription) -> bool {
    matches!(self, Teardown::Subscription(s) if s.ptr_eq(sub))
  }
}

impl<F> From<F> for Teardown
where
  F: FnOnce() + 'static,
{
  fn from(f: F) -> Self {
    Teardown::Fn(Box::new(move || {
      f();
      Ok(())
    }))
  }
}

impl From<()> for Teardown {
  fn from(_: ()) -> Self { Teardown::None }
}

impl From<Subscription> for Teardown {
  fn from(s: Subscription) -> Self { Teardown::Subscription(s) }
}

impl From<&Subscription> for Teardown {
  fn from(s: &Subscription) -> Self { Teardown::Subscription(s.clone()) }
}

impl Debug for Teardown {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Teardown::None => f.write_str("Teardown::None"),
      Teardown::Subscription(s) => f.debug_tuple("Teardown::Subscription").field(s).finish(),
      Teardown::Fn(_) => f.write_str("Teardown::Fn"),
    }
  }
}

type Finalizer = Box<dyn FnOnce()>;

#[derive(Default)]
struct Inner {
  closed: bool,
  initial_teardown: Option<Teardown>,
  teardowns: SmallVec<[Teardown; 2]>,
  parents: SmallVec<[Weak<RefCell<Inner>>; 1]>,
  finalizer: Option<Finalizer>,
}

/// A resource handle that releases everything it owns exactly once.
///
/// States go one way, open to closed. Teardowns run in the order they were
/// added, after the optional initial teardown. A teardown added to a closed
/// subscription runs immediately. A child subscription remembers its parents
/// weakly and detaches itself from them when it closes, so finished children
/// do not accumulate and no reference cycle is formed.
#[derive(Clone, Default)]
pub struct Subscription(Rc<RefCell<Inner>>);

impl Subscription {
  /// An open subscription whose first teardown is `initial`.
  pub fn new(initial: impl Into<Teardown>) -> Self {
    let sub = Subscription::default();
    sub.0.borrow_mut().initial_teardown = Some(initial.into());
    sub
  }

  /// An already closed subscription.
  pub fn empty() -> Self {
    let sub = Subscription::default();
    sub.0.borrow_mut().closed = true;
    sub
  }

  /// Build a subscription that runs `initial` first and `finalizer` after
  /// every other teardown.
  pub(crate) fn with_hooks(initial: Teardown, finalizer: Option<Finalizer>) -> Self {
    let sub = Subscription::default();
    {
      let mut inner = sub.0.borrow_mut();
      inner.initial_teardown = Some(initial);
      inner.finalizer = finalizer;
    }
    sub
  }

  #[inline]
  pub fn is_closed(&self) -> bool { self.0.borrow().closed }

  #[inline]
  pub fn ptr_eq(&self, other: &Subscription) -> bool { Rc::ptr_eq(&self.0, &other.0) }

  /// Number of teardowns currently owned.
  pub fn teardown_size(&self) -> usize { self.0.borrow().teardowns.len() }

  /// Attach `teardown` to this subscription.
  ///
  /// Adding a subscription to itself, adding an already closed child, adding
  /// a child twice or adding one of this subscription's own parents are all
  /// no-ops.
  pub fn add(&self, teardown: impl Into<Teardown>) {
    let teardown = teardown.into();
    match &teardown {
      Teardown::None => return,
      Teardown::Subscription(child) => {
        if child.ptr_eq(self) || child.is_closed() || child.has_parent(self) {
          return;
        }
        if self.has_parent(child) {
          tracing::warn!("refusing to add a parent subscription as its own child");
          return;
        }
      }
      Teardown::Fn(_) => {}
    }

    if self.is_closed() {
      if let Err(err) = teardown.execute() {
        config::report_unhandled_error(err);
      }
      return;
    }

    if let Teardown::Subscription(child) = &teardown {
      child.0.borrow_mut().parents.push(Rc::downgrade(&self.0));
    }
    self.0.borrow_mut().teardowns.push(teardown);
  }

  /// Detach `child` without running it.
  pub fn remove(&self, child: &Subscription) {
    let removed = {
      let mut inner = self.0.borrow_mut();
      inner
        .teardowns
        .iter()
        .position(|t| t.is_subscription(child))
        .map(|pos| inner.teardowns.remove(pos))
    };
    if removed.is_some() {
      let me = Rc::as_ptr(&self.0);
      child.0.borrow_mut().parents.retain(|p| p.as_ptr() != me);
    }
    // `removed` is dropped here, after every borrow has been released.
  }

  /// Close this subscription and run every owned teardown once.
  ///
  /// Calling it again is a no-op. Failing teardowns do not stop their
  /// siblings; their errors are aggregated into the returned
  /// [`UnsubscriptionError`].
  pub fn unsubscribe(&self) -> Result<(), UnsubscriptionError> {
    let (initial, teardowns, parents, finalizer) = {
      let mut inner = self.0.borrow_mut();
      if inner.closed {
        return Ok(());
      }
      inner.closed = true;
      (
        inner.initial_teardown.take(),
        mem::take(&mut inner.teardowns),
        mem::take(&mut inner.parents),
        inner.finalizer.take(),
      )
    };
    tracing::trace!(teardowns = teardowns.len(), "unsubscribe");

    for parent in parents {
      if let Some(parent) = parent.upgrade() {
        Subscription(parent).detach_child(self);
      }
    }

    let mut errors = Vec::new();
    for teardown in initial.into_iter().chain(teardowns) {
      if let Err(err) = teardown.execute() {
        UnsubscriptionError::collect(err, &mut errors);
      }
    }
    if let Some(finalizer) = finalizer {
      finalizer();
    }

    if errors.is_empty() { Ok(()) } else { Err(UnsubscriptionError::new(errors)) }
  }

  /// Unsubscribe, surfacing any teardown failure through
  /// [`config::report_unhandled_error`]. Used where no caller can receive the
  /// error, e.g. after a terminal notification.
  pub(crate) fn unsubscribe_or_report(&self) {
    if let Err(err) = self.unsubscribe() {
      tracing::warn!(errors = err.len(), "teardown failed without a caller to report to");
      config::report_unhandled_error(err);
    }
  }

  /// Activates "RAII" behavior for this subscription: `unsubscribe()` is
  /// called as soon as the returned guard goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately.
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard { SubscriptionGuard(self) }

  fn has_parent(&self, parent: &Subscription) -> bool {
    let target = Rc::as_ptr(&parent.0);
    self.0.borrow().parents.iter().any(|p| p.as_ptr() == target)
  }

  fn detach_child(&self, child: &Subscription) {
    let removed = {
      let mut inner = self.0.borrow_mut();
      inner
        .teardowns
        .iter()
        .position(|t| t.is_subscription(child))
        .map(|pos| inner.teardowns.remove(pos))
    };
    drop(removed);
  }
}

impl Debug for Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let inner = self.0.borrow();
    f.debug_struct("Subscription")
      .field("closed", &inner.closed)
      .field("teardown_count", &inner.teardowns.len())
      .finish()
  }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// If you want to drop it immediately, wrap it in its own scope
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard(Subscription);

impl SubscriptionGuard {
  pub fn new(subscription: Subscription) -> SubscriptionGuard { SubscriptionGuard(subscription) }

  pub fn subscription(&self) -> &Subscription { &self.0 }
}

impl Drop for SubscriptionGuard {
  #[inline]
  fn drop(&mut self) { self.0.unsubscribe_or_report() }
}
