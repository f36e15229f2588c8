use crate::{error::EmptyError, observable::Observable, rc::MutRc, subscriber::OperatorSubscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Emit only the last value, once the source completes. A source that
  /// completes without a value fails with [`EmptyError`].
  pub fn last(&self) -> Observable<T, E>
  where
    E: From<EmptyError>,
  {
    self.lift(|source, subscriber| {
      let last = MutRc::own(None);
      let on_complete = last.clone();
      source.subscribe_with(
        OperatorSubscriber::new(subscriber, move |v, _| *last.rc_deref_mut() = Some(v))
          .on_complete(move |dest| match on_complete.take() {
            Some(v) => {
              dest.next(v);
              dest.complete();
            }
            None => dest.error(EmptyError.into()),
          })
          .build(),
      );
    })
  }
}
