use crate::{observable::Observable, subscriber::Subscriber, subscription::Teardown};

/// Creates an observable from a subscribe function.
///
/// `subscribe` runs once per subscription; whatever it returns is torn down
/// when that subscription closes. Use [`Observable::new`] when the producer
/// can fail synchronously.
///
/// ```
/// use rxcore::prelude::*;
///
/// let source = observable::create(|subscriber: Subscriber<i32, ()>| {
///   subscriber.next(1);
///   subscriber.next(2);
///   subscriber.complete();
/// });
/// source.subscribe(|v| println!("{v}"));
/// ```
pub fn create<T, E, R>(subscribe: impl Fn(Subscriber<T, E>) -> R + 'static) -> Observable<T, E>
where
  T: 'static,
  E: 'static,
  R: Into<Teardown>,
{
  Observable::new(move |subscriber| Ok(subscribe(subscriber)))
}
