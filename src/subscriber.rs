//! The observer decorator every subscription runs through.

use std::{
  cell::{Cell, RefCell},
  fmt::Debug,
  rc::Rc,
};

use crate::{
  config,
  error::UnsubscriptionError,
  notification::NotificationKind,
  observer::{Observer, PartialObserver},
  subscription::{Subscription, Teardown},
};

mod operator_subscriber;
pub use operator_subscriber::OperatorSubscriber;

struct SubscriberInner<T, E> {
  stopped: Cell<bool>,
  destination: RefCell<Option<Rc<dyn Observer<T, E>>>>,
  subscription: Subscription,
}

/// Implements the Observer contract on top of a [`Subscription`].
///
/// While the Observer is the public API for consuming the values of an
/// Observable, all Observers get converted to a Subscriber, which enforces
/// the notification grammar: any number of `next`, then at most one `error`
/// or `complete`. After the first terminal notification every further call is
/// ignored, and the subscriber unsubscribes itself once the notification has
/// been delivered. Unsubscribing also stops the subscriber and releases its
/// destination, so `next` is ignored after external cancellation too.
///
/// `Subscriber` is a cheap handle: clones share the same state.
pub struct Subscriber<T, E>(Rc<SubscriberInner<T, E>>);

impl<T, E> Clone for Subscriber<T, E> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T: 'static, E: 'static> Subscriber<T, E> {
  /// Wrap a terminal observer.
  pub fn new(destination: impl Observer<T, E> + 'static) -> Self {
    Self::build(Rc::new(destination), None, None)
  }

  /// Wrap `destination` and register the new subscriber as a child of
  /// `parent`, so closing `parent` closes this subscriber as well.
  pub fn with_parent(destination: impl Observer<T, E> + 'static, parent: &Subscription) -> Self {
    Self::build(Rc::new(destination), Some(parent), None)
  }

  pub(crate) fn build(
    destination: Rc<dyn Observer<T, E>>, parent: Option<&Subscription>,
    finalizer: Option<Box<dyn FnOnce()>>,
  ) -> Self {
    let inner = Rc::new_cyclic(|weak: &std::rc::Weak<SubscriberInner<T, E>>| {
      let weak = weak.clone();
      let release = Teardown::from(move || {
        if let Some(inner) = weak.upgrade() {
          inner.stopped.set(true);
          let destination = inner.destination.borrow_mut().take();
          drop(destination);
        }
      });
      SubscriberInner {
        stopped: Cell::new(false),
        destination: RefCell::new(Some(destination)),
        subscription: Subscription::with_hooks(release, finalizer),
      }
    });
    if let Some(parent) = parent {
      parent.add(inner.subscription.clone());
    }
    Subscriber(inner)
  }

  #[inline]
  fn destination(&self) -> Option<Rc<dyn Observer<T, E>>> { self.0.destination.borrow().clone() }

  pub fn next(&self, value: T) {
    if self.0.stopped.get() {
      config::report_stopped_notification(NotificationKind::Next);
      return;
    }
    if let Some(destination) = self.destination() {
      destination.next(value);
    }
  }

  pub fn error(&self, err: E) {
    if self.0.stopped.replace(true) {
      config::report_stopped_notification(NotificationKind::Error);
      return;
    }
    if let Some(destination) = self.destination() {
      destination.error(err);
    }
    self.0.subscription.unsubscribe_or_report();
  }

  pub fn complete(&self) {
    if self.0.stopped.replace(true) {
      config::report_stopped_notification(NotificationKind::Complete);
      return;
    }
    if let Some(destination) = self.destination() {
      destination.complete();
    }
    self.0.subscription.unsubscribe_or_report();
  }
}

impl<T, E> Subscriber<T, E> {
  /// `true` once `error` or `complete` has been called, or the subscriber has
  /// been unsubscribed.
  #[inline]
  pub fn is_stopped(&self) -> bool { self.0.stopped.get() }

  #[inline]
  pub fn is_closed(&self) -> bool { self.0.subscription.is_closed() }

  #[inline]
  pub fn subscription(&self) -> &Subscription { &self.0.subscription }

  /// Attach a teardown to this subscriber's subscription.
  #[inline]
  pub fn add(&self, teardown: impl Into<Teardown>) { self.0.subscription.add(teardown) }

  #[inline]
  pub fn remove(&self, child: &Subscription) { self.0.subscription.remove(child) }

  pub fn unsubscribe(&self) -> Result<(), UnsubscriptionError> { self.0.subscription.unsubscribe() }
}

impl<T: 'static, E: 'static> Observer<T, E> for Subscriber<T, E> {
  #[inline]
  fn next(&self, value: T) { Subscriber::next(self, value) }

  #[inline]
  fn error(&self, err: E) { Subscriber::error(self, err) }

  #[inline]
  fn complete(&self) { Subscriber::complete(self) }
}

impl<T, E> From<Subscriber<T, E>> for Teardown {
  fn from(s: Subscriber<T, E>) -> Self { Teardown::Subscription(s.0.subscription.clone()) }
}

impl<T, E> From<&Subscriber<T, E>> for Teardown {
  fn from(s: &Subscriber<T, E>) -> Self { Teardown::Subscription(s.0.subscription.clone()) }
}

// ==================== IntoSubscriber ====================

/// Normalizes the argument of `Observable::subscribe_with`.
pub trait IntoSubscriber<T, E> {
  fn into_subscriber(self) -> Subscriber<T, E>;
}

impl<T, E> IntoSubscriber<T, E> for Subscriber<T, E> {
  #[inline]
  fn into_subscriber(self) -> Subscriber<T, E> { self }
}

impl<T, E> IntoSubscriber<T, E> for PartialObserver<T, E>
where
  T: 'static,
  E: Debug + 'static,
{
  fn into_subscriber(self) -> Subscriber<T, E> { Subscriber::new(self) }
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use super::*;

  fn subscriber_creator() -> (Rc<Cell<i32>>, Rc<Cell<i32>>, Rc<Cell<i32>>, Subscriber<i32, ()>) {
    let next = Rc::new(Cell::new(0));
    let err = Rc::new(Cell::new(0));
    let complete = Rc::new(Cell::new(0));
    let (n, e, c) = (next.clone(), err.clone(), complete.clone());

    let subscriber = Subscriber::new(
      PartialObserver::new()
        .with_next(move |_| n.set(n.get() + 1))
        .with_error(move |_| e.set(e.get() + 1))
        .with_complete(move || c.set(c.get() + 1)),
    );
    (next, err, complete, subscriber)
  }

  #[rxcore_macro::test]
  fn next_and_complete() {
    let (next, err, complete, subscriber) = subscriber_creator();

    subscriber.next(1);
    subscriber.next(2);
    subscriber.complete();
    subscriber.next(3);
    subscriber.complete();
    subscriber.error(());

    assert_eq!(next.get(), 2);
    assert_eq!(complete.get(), 1);
    assert_eq!(err.get(), 0);
    assert!(subscriber.is_closed());
  }

  #[rxcore_macro::test]
  fn next_and_error() {
    let (next, err, complete, subscriber) = subscriber_creator();

    subscriber.next(1);
    subscriber.next(2);
    subscriber.error(());
    subscriber.next(3);
    subscriber.error(());

    assert_eq!(next.get(), 2);
    assert_eq!(err.get(), 1);
    assert_eq!(complete.get(), 0);
  }

  #[rxcore_macro::test]
  fn unsubscribe_stops_next() {
    let (next, _, complete, subscriber) = subscriber_creator();
    subscriber.next(1);
    subscriber.unsubscribe().unwrap();
    subscriber.next(2);
    subscriber.complete();

    assert!(subscriber.is_stopped());
    assert_eq!(next.get(), 1);
    assert_eq!(complete.get(), 0);
  }

  #[rxcore_macro::test]
  fn terminal_delivered_before_teardown() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let o = order.clone();
    let subscriber = Subscriber::<i32, ()>::new(
      PartialObserver::new().with_complete(move || o.borrow_mut().push("complete")),
    );
    let o = order.clone();
    subscriber.add(move || o.borrow_mut().push("teardown"));

    subscriber.complete();
    assert_eq!(*order.borrow(), vec!["complete", "teardown"]);
  }

  #[rxcore_macro::test]
  fn parent_unsubscribe_reaches_child() {
    let parent = Subscriber::<i32, ()>::new(PartialObserver::new());
    let next = Rc::new(Cell::new(0));
    let n = next.clone();
    let child = Subscriber::with_parent(
      PartialObserver::<i32, ()>::new().with_next(move |_| n.set(n.get() + 1)),
      parent.subscription(),
    );

    child.next(1);
    parent.unsubscribe().unwrap();
    child.next(2);
    assert!(child.is_closed());
    assert_eq!(next.get(), 1);
  }

  #[rxcore_macro::test]
  fn stopped_notifications_are_reported() {
    config::reset();
    let kinds = Rc::new(RefCell::new(Vec::new()));
    let k = kinds.clone();
    config::set_stopped_notification_handler(move |kind| k.borrow_mut().push(kind));

    let (_, _, _, subscriber) = subscriber_creator();
    subscriber.complete();
    subscriber.next(1);
    subscriber.error(());

    assert_eq!(*kinds.borrow(), vec![NotificationKind::Next, NotificationKind::Error]);
    config::reset();
  }
}
