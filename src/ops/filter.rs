use std::rc::Rc;

use crate::{observable::Observable, subscriber::OperatorSubscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Emit only the values for which `predicate` returns `true`.
  pub fn filter(&self, predicate: impl Fn(&T) -> bool + 'static) -> Observable<T, E> {
    let predicate = Rc::new(predicate);
    self.lift(move |source, subscriber| {
      let predicate = predicate.clone();
      source.subscribe_with(
        OperatorSubscriber::new(subscriber, move |v, dest| {
          if predicate(&v) {
            dest.next(v)
          }
        })
        .build(),
      );
    })
  }
}
