use std::rc::Rc;

use super::Subscriber;
use crate::observer::Observer;

type NextFn<T, U, E> = Box<dyn Fn(T, &Subscriber<U, E>) -> Result<(), E>>;
type ErrorFn<U, E> = Box<dyn Fn(E, &Subscriber<U, E>)>;
type CompleteFn<U, E> = Box<dyn Fn(&Subscriber<U, E>)>;

/// Builder for the subscriber an operator feeds to its source.
///
/// Every callback receives the downstream subscriber. An omitted `error` or
/// `complete` callback forwards the notification downstream unchanged. The
/// built subscriber is a child of the downstream one, so unsubscribing
/// downstream tears the upstream subscription down too.
///
/// ```
/// use rxcore::prelude::*;
///
/// fn double(source: Observable<i32, ()>) -> Observable<i32, ()> {
///   source.lift(|source, subscriber| {
///     source.subscribe_with(OperatorSubscriber::new(subscriber, |v: i32, dest| dest.next(v * 2)).build());
///   })
/// }
/// ```
pub struct OperatorSubscriber<T, U, E> {
  destination: Subscriber<U, E>,
  on_next: NextFn<T, U, E>,
  on_error: Option<ErrorFn<U, E>>,
  on_complete: Option<CompleteFn<U, E>>,
  on_finalize: Option<Box<dyn FnOnce()>>,
}

impl<T: 'static, U: 'static, E: 'static> OperatorSubscriber<T, U, E> {
  pub fn new(destination: &Subscriber<U, E>, on_next: impl Fn(T, &Subscriber<U, E>) + 'static) -> Self {
    Self::try_new(destination, move |v, dest| {
      on_next(v, dest);
      Ok(())
    })
  }

  /// Like [`new`](Self::new), but an `Err` from `on_next` is delivered to
  /// the downstream `error`, terminating the subscription.
  pub fn try_new(
    destination: &Subscriber<U, E>, on_next: impl Fn(T, &Subscriber<U, E>) -> Result<(), E> + 'static,
  ) -> Self {
    Self {
      destination: destination.clone(),
      on_next: Box::new(on_next),
      on_error: None,
      on_complete: None,
      on_finalize: None,
    }
  }

  pub fn on_error(mut self, f: impl Fn(E, &Subscriber<U, E>) + 'static) -> Self {
    self.on_error = Some(Box::new(f));
    self
  }

  pub fn on_complete(mut self, f: impl Fn(&Subscriber<U, E>) + 'static) -> Self {
    self.on_complete = Some(Box::new(f));
    self
  }

  /// Runs exactly once when the built subscriber closes, whatever closed it,
  /// after every other teardown of that subscriber.
  pub fn on_finalize(mut self, f: impl FnOnce() + 'static) -> Self {
    self.on_finalize = Some(Box::new(f));
    self
  }

  pub fn build(self) -> Subscriber<T, E> {
    let Self { destination, on_next, on_error, on_complete, on_finalize } = self;
    let parent = destination.subscription().clone();
    let observer = Forward { destination, on_next, on_error, on_complete };
    Subscriber::build(Rc::new(observer), Some(&parent), on_finalize)
  }
}

struct Forward<T, U, E> {
  destination: Subscriber<U, E>,
  on_next: NextFn<T, U, E>,
  on_error: Option<ErrorFn<U, E>>,
  on_complete: Option<CompleteFn<U, E>>,
}

impl<T: 'static, U: 'static, E: 'static> Observer<T, E> for Forward<T, U, E> {
  fn next(&self, value: T) {
    if let Err(err) = (self.on_next)(value, &self.destination) {
      self.destination.error(err);
    }
  }

  fn error(&self, err: E) {
    match &self.on_error {
      Some(on_error) => on_error(err, &self.destination),
      None => self.destination.error(err),
    }
  }

  fn complete(&self) {
    match &self.on_complete {
      Some(on_complete) => on_complete(&self.destination),
      None => self.destination.complete(),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::cell::{Cell, RefCell};

  use super::*;
  use crate::observer::PartialObserver;

  fn sink() -> (Rc<RefCell<Vec<String>>>, Subscriber<i32, String>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    let subscriber = Subscriber::new(
      PartialObserver::new()
        .with_next(move |v| l1.borrow_mut().push(format!("next {v}")))
        .with_error(move |e| l2.borrow_mut().push(format!("error {e}")))
        .with_complete(move || l3.borrow_mut().push("complete".to_owned())),
    );
    (log, subscriber)
  }

  #[rxcore_macro::test]
  fn omitted_callbacks_forward() {
    let (log, dest) = sink();
    let op = OperatorSubscriber::new(&dest, |v: i32, d| d.next(v + 1)).build();
    op.next(1);
    op.complete();
    assert_eq!(*log.borrow(), vec!["next 2", "complete"]);
    assert!(dest.is_closed());
  }

  #[rxcore_macro::test]
  fn failing_next_routes_to_error() {
    let (log, dest) = sink();
    let op = OperatorSubscriber::try_new(&dest, |v: i32, d| {
      if v > 1 {
        return Err(format!("too big: {v}"));
      }
      d.next(v);
      Ok(())
    })
    .build();
    op.next(1);
    op.next(2);
    op.next(3);
    assert_eq!(*log.borrow(), vec!["next 1", "error too big: 2"]);
    assert!(op.is_closed());
  }

  #[rxcore_macro::test]
  fn finalize_runs_once_on_every_path() {
    for path in ["complete", "error", "unsubscribe-down", "unsubscribe-up"] {
      let (_, dest) = sink();
      let finalized = Rc::new(Cell::new(0));
      let f = finalized.clone();
      let op = OperatorSubscriber::new(&dest, |v: i32, d| d.next(v))
        .on_finalize(move || f.set(f.get() + 1))
        .build();
      match path {
        "complete" => op.complete(),
        "error" => op.error("e".to_owned()),
        "unsubscribe-down" => dest.unsubscribe().unwrap(),
        _ => op.unsubscribe().unwrap(),
      }
      op.unsubscribe().unwrap();
      dest.unsubscribe().unwrap();
      assert_eq!(finalized.get(), 1, "{path}");
    }
  }

  #[rxcore_macro::test]
  fn custom_complete_can_emit_before_completing() {
    let (log, dest) = sink();
    let op = OperatorSubscriber::new(&dest, |_: i32, _| {})
      .on_complete(|d| {
        d.next(42);
        d.complete();
      })
      .build();
    op.complete();
    assert_eq!(*log.borrow(), vec!["next 42", "complete"]);
  }
}
