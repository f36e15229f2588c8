use std::rc::Rc;

use crate::{observable::Observable, subscriber::OperatorSubscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Invoke `f` with a reference to each value before passing it on.
  pub fn tap(&self, f: impl Fn(&T) + 'static) -> Observable<T, E> {
    let f = Rc::new(f);
    self.lift(move |source, subscriber| {
      let f = f.clone();
      source.subscribe_with(
        OperatorSubscriber::new(subscriber, move |v, dest| {
          f(&v);
          dest.next(v);
        })
        .build(),
      );
    })
  }
}
