use std::rc::Rc;

use crate::{observable::Observable, subscriber::OperatorSubscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Call `f` when the subscription closes, whether by completion, error or
  /// unsubscription. `f` runs once per subscription, after the terminal
  /// notification has been delivered.
  pub fn finalize(&self, f: impl Fn() + 'static) -> Observable<T, E> {
    let f = Rc::new(f);
    self.lift(move |source, subscriber| {
      let f = f.clone();
      source.subscribe_with(
        OperatorSubscriber::new(subscriber, |v, dest| dest.next(v))
          .on_finalize(move || f())
          .build(),
      );
    })
  }
}
