//! Lazy, re-executable producers of values.

use std::{fmt::Debug, rc::Rc};

use crate::{
  observer::FnObserver,
  subscriber::{IntoSubscriber, Subscriber},
  subscription::{Subscription, Teardown},
};

mod create;
mod defer;
mod from_iter;
mod interval;
mod of;
mod timer;
mod trivial;

pub use create::create;
pub use defer::defer;
pub use from_iter::from_iter;
pub use interval::interval;
pub use of::of;
pub use timer::timer;
pub use trivial::{empty, never, throw_error};

type Producer<T, E> = dyn Fn(Subscriber<T, E>) -> Result<Teardown, E>;

/// A representation of any set of values over any amount of time.
///
/// An `Observable` only describes how to produce values: nothing happens
/// until it is subscribed, and every subscription runs the producer again
/// with its own fresh state. Cloning is cheap and shares the producer.
pub struct Observable<T, E> {
  producer: Rc<Producer<T, E>>,
}

impl<T, E> Clone for Observable<T, E> {
  #[inline]
  fn clone(&self) -> Self { Self { producer: self.producer.clone() } }
}

impl<T: 'static, E: 'static> Observable<T, E> {
  /// `producer` is called once per subscription with the subscriber to feed.
  /// Whatever it returns is torn down with the subscription. An `Err` is
  /// delivered to the subscriber's `error` instead of escaping `subscribe`.
  pub fn new<R>(producer: impl Fn(Subscriber<T, E>) -> Result<R, E> + 'static) -> Self
  where
    R: Into<Teardown>,
  {
    Self { producer: Rc::new(move |subscriber| producer(subscriber).map(Into::into)) }
  }

  /// Subscribe with a [`Subscriber`] or a
  /// [`PartialObserver`](crate::observer::PartialObserver).
  ///
  /// Returns the subscriber's subscription: closing it stops the delivery
  /// and tears down everything the producer set up.
  pub fn subscribe_with(&self, observer: impl IntoSubscriber<T, E>) -> Subscription {
    let subscriber = observer.into_subscriber();
    tracing::trace!("subscribe");
    match (self.producer)(subscriber.clone()) {
      Ok(teardown) => subscriber.add(teardown),
      Err(err) => subscriber.error(err),
    }
    subscriber.subscription().clone()
  }

  /// Subscribe with a `next` handler only. Completion is ignored and an error
  /// is reported as unhandled.
  pub fn subscribe(&self, next: impl Fn(T) + 'static) -> Subscription
  where
    E: Debug,
  {
    self.subscribe_with(Subscriber::new(FnObserver(next)))
  }

  /// Apply `op` to this observable, for left-to-right composition of
  /// operator functions.
  #[inline]
  pub fn pipe<R>(self, op: impl FnOnce(Self) -> R) -> R { op(self) }

  /// Build an operator from `logic`.
  ///
  /// Each subscription to the returned observable calls `logic` with this
  /// (source) observable and the downstream subscriber. `logic` is expected
  /// to subscribe to the source exactly once, normally with an
  /// [`OperatorSubscriber`](crate::subscriber::OperatorSubscriber) built on
  /// the downstream subscriber, which ties the upstream subscription to the
  /// downstream one.
  pub fn lift<U: 'static>(
    &self, logic: impl Fn(&Observable<T, E>, &Subscriber<U, E>) + 'static,
  ) -> Observable<U, E> {
    let source = self.clone();
    Observable::new(move |subscriber: Subscriber<U, E>| {
      logic(&source, &subscriber);
      Ok(())
    })
  }
}
