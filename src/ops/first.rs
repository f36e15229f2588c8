use crate::{error::EmptyError, observable::Observable, subscriber::OperatorSubscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Emit only the first value, then complete. A source that completes
  /// without a value fails with [`EmptyError`].
  pub fn first(&self) -> Observable<T, E>
  where
    E: From<EmptyError>,
  {
    self.lift(|source, subscriber| {
      source.subscribe_with(
        OperatorSubscriber::new(subscriber, |v, dest| {
          dest.next(v);
          dest.complete();
        })
        .on_complete(|dest| dest.error(EmptyError.into()))
        .build(),
      );
    })
  }
}
