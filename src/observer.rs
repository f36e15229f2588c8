//! Observer trait and implementations
//!
//! The Observer trait defines the consumer of data in the reactive pattern.
//! It provides three methods: next (for values), error (for errors), and
//! complete (for stream completion).

use std::{fmt::Debug, rc::Rc};

use crate::config;

// ============================================================================
// Observer Trait
// ============================================================================

/// Observer trait: The consumer of data in reactive programming
///
/// Methods take `&self`: a consumer may synchronously re-enter the stream it
/// is observing (for example by pushing into the source from inside `next`),
/// so observers keep their state in `Cell`/`RefCell` and never hold a borrow
/// across a call to another observer.
pub trait Observer<T, E> {
  /// Receive the next value from the observable
  fn next(&self, value: T);

  /// Handle an error from the observable. No further calls follow.
  fn error(&self, err: E);

  /// Handle completion of the observable. No further calls follow.
  fn complete(&self);
}

impl<T, E, O> Observer<T, E> for Rc<O>
where
  O: Observer<T, E> + ?Sized,
{
  #[inline]
  fn next(&self, value: T) { (**self).next(value) }

  #[inline]
  fn error(&self, err: E) { (**self).error(err) }

  #[inline]
  fn complete(&self) { (**self).complete() }
}

impl<T, E, O> Observer<T, E> for Box<O>
where
  O: Observer<T, E> + ?Sized,
{
  #[inline]
  fn next(&self, value: T) { (**self).next(value) }

  #[inline]
  fn error(&self, err: E) { (**self).error(err) }

  #[inline]
  fn complete(&self) { (**self).complete() }
}

// ============================================================================
// PartialObserver - any subset of the three handlers
// ============================================================================

/// An observer assembled from optional handlers.
///
/// A missing `next` or `complete` handler ignores the event. A missing
/// `error` handler never swallows the error: it is surfaced through
/// [`config::report_unhandled_error`].
pub struct PartialObserver<T, E> {
  next: Option<Box<dyn Fn(T)>>,
  error: Option<Box<dyn Fn(E)>>,
  complete: Option<Box<dyn Fn()>>,
}

impl<T, E> Default for PartialObserver<T, E> {
  fn default() -> Self { Self { next: None, error: None, complete: None } }
}

impl<T, E> PartialObserver<T, E> {
  pub fn new() -> Self { Self::default() }

  pub fn with_next(mut self, f: impl Fn(T) + 'static) -> Self {
    self.next = Some(Box::new(f));
    self
  }

  pub fn with_error(mut self, f: impl Fn(E) + 'static) -> Self {
    self.error = Some(Box::new(f));
    self
  }

  pub fn with_complete(mut self, f: impl Fn() + 'static) -> Self {
    self.complete = Some(Box::new(f));
    self
  }
}

impl<T, E> Observer<T, E> for PartialObserver<T, E>
where
  E: Debug + 'static,
{
  fn next(&self, value: T) {
    if let Some(next) = &self.next {
      next(value)
    }
  }

  fn error(&self, err: E) {
    match &self.error {
      Some(error) => error(err),
      None => config::report_unhandled_error(err),
    }
  }

  fn complete(&self) {
    if let Some(complete) = &self.complete {
      complete()
    }
  }
}

// ============================================================================
// FnObserver - Closure adapter
// ============================================================================

/// Closure adapter: `observable.subscribe(|v| println!("{}", v))`.
///
/// The closure becomes the `next` handler, completion is ignored and errors
/// are reported as unhandled.
#[derive(Clone)]
pub struct FnObserver<F>(pub F);

impl<F, T, E> Observer<T, E> for FnObserver<F>
where
  F: Fn(T),
  E: Debug + 'static,
{
  #[inline]
  fn next(&self, v: T) { (self.0)(v) }

  #[inline]
  fn error(&self, err: E) { config::report_unhandled_error(err) }

  #[inline]
  fn complete(&self) {}
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
  use std::cell::{Cell, RefCell};

  use super::*;

  struct TestObserver {
    values: RefCell<Vec<i32>>,
  }

  impl Observer<i32, ()> for TestObserver {
    fn next(&self, value: i32) { self.values.borrow_mut().push(value); }

    fn error(&self, _: ()) {}

    fn complete(&self) {}
  }

  #[rxcore_macro::test]
  fn test_observer_trait() {
    let obs = TestObserver { values: RefCell::new(vec![]) };
    obs.next(1);
    obs.next(2);
    assert_eq!(*obs.values.borrow(), vec![1, 2]);
  }

  #[rxcore_macro::test]
  fn test_closure_as_observer() {
    let count = Cell::new(0);
    let closure_obs = FnObserver(|v: i32| count.set(count.get() + v));

    Observer::<i32, ()>::next(&closure_obs, 10);
    Observer::<i32, ()>::next(&closure_obs, 20);
    assert_eq!(count.get(), 30);
  }

  #[rxcore_macro::test]
  fn partial_observer_missing_error_is_reported() {
    config::reset();
    let reported = Rc::new(RefCell::new(String::new()));
    let r = reported.clone();
    config::set_unhandled_error_handler(move |err| *r.borrow_mut() = err.description().to_owned());

    let obs = PartialObserver::<i32, &str>::new();
    obs.next(1);
    obs.complete();
    obs.error("lost");

    assert_eq!(*reported.borrow(), "\"lost\"");
    config::reset();
  }
}
