use std::{cell::Cell, rc::Rc};

use crate::{observable::Observable, subscriber::OperatorSubscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Emits only the first `count` values, then completes and unsubscribes
  /// from the source.
  pub fn take(&self, count: usize) -> Observable<T, E> {
    self.lift(move |source, subscriber| {
      if count == 0 {
        subscriber.complete();
        return;
      }
      let seen = Rc::new(Cell::new(0));
      source.subscribe_with(
        OperatorSubscriber::new(subscriber, move |v, dest| {
          let n = seen.get() + 1;
          if n > count {
            return;
          }
          seen.set(n);
          dest.next(v);
          if n == count {
            dest.complete();
          }
        })
        .build(),
      );
    })
  }
}
