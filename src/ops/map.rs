use crate::{observable::Observable, subscriber::OperatorSubscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Creates a new stream which calls a closure on each element and uses its
  /// return as the value.
  pub fn map<U: 'static>(&self, f: impl Fn(T) -> U + 'static) -> Observable<U, E> {
    let f = std::rc::Rc::new(f);
    self.lift(move |source, subscriber| {
      let f = f.clone();
      source.subscribe_with(OperatorSubscriber::new(subscriber, move |v, dest| dest.next(f(v))).build());
    })
  }

  /// Like [`map`](Self::map), but an `Err` returned by `f` terminates the
  /// stream with that error.
  pub fn try_map<U: 'static>(&self, f: impl Fn(T) -> Result<U, E> + 'static) -> Observable<U, E> {
    let f = std::rc::Rc::new(f);
    self.lift(move |source, subscriber| {
      let f = f.clone();
      source.subscribe_with(OperatorSubscriber::try_new(subscriber, move |v, dest| {
        dest.next(f(v)?);
        Ok(())
      })
      .build());
    })
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[rxcore_macro::test]
  fn primitive_type() {
    let i = Rc::new(RefCell::new(0));
    let c_i = i.clone();
    observable::from_iter::<_, ()>(100..101)
      .map(|v| v * 2)
      .subscribe(move |v| *c_i.borrow_mut() = v);
    assert_eq!(*i.borrow(), 200);
  }

  #[rxcore_macro::test]
  fn map_types_mixed() {
    let i = Rc::new(RefCell::new(0));
    let c_i = i.clone();
    observable::from_iter::<_, ()>(vec!['a', 'b', 'c'])
      .map(|_| 1)
      .subscribe(move |v| *c_i.borrow_mut() += v);
    assert_eq!(*i.borrow(), 3);
  }

  #[rxcore_macro::test]
  fn try_map_error_terminates() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let (l1, l2) = (log.clone(), log.clone());
    observable::from_iter(1..10)
      .try_map(|v| if v < 3 { Ok(v) } else { Err(format!("{v} rejected")) })
      .subscribe_with(
        PartialObserver::new()
          .with_next(move |v: i32| l1.borrow_mut().push(v.to_string()))
          .with_error(move |e| l2.borrow_mut().push(e)),
      );
    assert_eq!(*log.borrow(), vec!["1", "2", "3 rejected"]);
  }
}
