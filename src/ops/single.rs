use crate::{
  error::{EmptyError, SequenceError},
  observable::Observable,
  rc::MutRc,
  subscriber::OperatorSubscriber,
};

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Emit the source's only value once it completes.
  ///
  /// A second value fails the stream with [`SequenceError`] right away and
  /// unsubscribes from the source; completing without a value fails with
  /// [`EmptyError`].
  pub fn single(&self) -> Observable<T, E>
  where
    E: From<EmptyError> + From<SequenceError>,
  {
    self.lift(|source, subscriber| {
      let seen = MutRc::own(None);
      let on_complete = seen.clone();
      source.subscribe_with(
        OperatorSubscriber::new(subscriber, move |v, dest| {
          let duplicate = {
            let mut slot = seen.rc_deref_mut();
            if slot.is_some() {
              true
            } else {
              *slot = Some(v);
              false
            }
          };
          if duplicate {
            seen.take();
            dest.error(SequenceError::new("more than one element in sequence").into());
          }
        })
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
