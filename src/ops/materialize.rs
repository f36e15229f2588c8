use crate::{notification::Notification, observable::Observable, subscriber::OperatorSubscriber};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Turn every event into a [`Notification`] value. The terminal event is
  /// emitted as a value followed by completion, so the output never errors.
  pub fn materialize(&self) -> Observable<Notification<T, E>, E> {
    self.lift(|source, subscriber| {
      source.subscribe_with(
        OperatorSubscriber::new(subscriber, |v, dest| dest.next(Notification::Next(v)))
          .on_error(|err, dest| {
            dest.next(Notification::Error(err));
            dest.complete();
          })
          .on_complete(|dest| {
            dest.next(Notification::Complete);
            dest.complete();
          })
          .build(),
      );
    })
  }
}
