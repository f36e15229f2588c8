use std::{cell::Cell, rc::Rc};

use crate::{
  error::ArgumentOutOfRangeError, observable::Observable, rc::MutRc, subscriber::OperatorSubscriber,
};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Emit the value at zero-based `index`, then complete. A source that
  /// completes first fails with [`ArgumentOutOfRangeError`].
  pub fn element_at(&self, index: usize) -> Observable<T, E>
  where
    T: Clone,
    E: From<ArgumentOutOfRangeError>,
  {
    self.element_at_inner(index, None)
  }

  /// Like [`element_at`](Self::element_at), but emits `default` when the
  /// source completes before reaching `index`.
  pub fn element_at_or(&self, index: usize, default: T) -> Observable<T, E>
  where
    T: Clone,
    E: From<ArgumentOutOfRangeError>,
  {
    self.element_at_inner(index, Some(default))
  }

  fn element_at_inner(&self, index: usize, default: Option<T>) -> Observable<T, E>
  where
    T: Clone,
    E: From<ArgumentOutOfRangeError>,
  {
    self.lift(move |source, subscriber| {
      let seen = Rc::new(Cell::new(0));
      let default = MutRc::own(default.clone());
      source.subscribe_with(
        OperatorSubscriber::new(subscriber, move |v, dest| {
          let i = seen.get();
          seen.set(i + 1);
          if i == index {
            dest.next(v);
            dest.complete();
          }
        })
        .on_complete(move |dest| match default.take() {
          Some(v) => {
            dest.next(v);
            dest.complete();
          }
          None => dest.error(ArgumentOutOfRangeError.into()),
        })
        .build(),
      );
    })
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::{error::RxError, prelude::*};

  fn run(source: Observable<i32, RxError>) -> Vec<String> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    source.subscribe_with(
      PartialObserver::new()
        .with_next(move |v: i32| l1.borrow_mut().push(v.to_string()))
        .with_error(move |e: RxError| l2.borrow_mut().push(format!("error {e}")))
        .with_complete(move || l3.borrow_mut().push("complete".to_owned())),
    );
    log.take()
  }

  #[rxcore_macro::test]
  fn picks_the_indexed_value() {
    assert_eq!(run(observable::from_iter(10..20).element_at(3)), vec!["13", "complete"]);
  }

  #[rxcore_macro::test]
  fn short_source_fails() {
    assert_eq!(run(observable::from_iter(0..3).element_at(3)), vec!["error argument out of range"]);
  }

  #[rxcore_macro::test]
  fn short_source_uses_default() {
    assert_eq!(run(observable::from_iter(0..3).element_at_or(5, -1)), vec!["-1", "complete"]);
  }
}
