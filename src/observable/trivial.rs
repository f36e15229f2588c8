use crate::observable::Observable;

/// Creates an observable that emits no items, just terminates with an error.
pub fn throw_error<T, E>(err: E) -> Observable<T, E>
where
  T: 'static,
  E: Clone + 'static,
{
  Observable::new(move |subscriber| {
    subscriber.error(err.clone());
    Ok(())
  })
}

/// Creates an observable that produces no values and completes immediately.
pub fn empty<T: 'static, E: 'static>() -> Observable<T, E> {
  Observable::new(|subscriber| {
    subscriber.complete();
    Ok(())
  })
}

/// Creates an observable that never emits anything, not even a terminal
/// notification.
pub fn never<T: 'static, E: 'static>() -> Observable<T, E> { Observable::new(|_| Ok(())) }
