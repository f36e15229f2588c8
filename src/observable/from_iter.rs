use crate::observable::Observable;

/// Creates an observable that produces values from an iterator.
///
/// Completes when all elements have been emitted. Never emits an error. The
/// iterator is cloned for every subscription, and iteration stops as soon as
/// the subscriber is closed.
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::from_iter::<_, ()>(0..10).subscribe(|v| println!("{v},"));
/// ```
pub fn from_iter<I, E>(iter: I) -> Observable<I::Item, E>
where
  I: IntoIterator + Clone + 'static,
  I::Item: 'static,
  E: 'static,
{
  Observable::new(move |subscriber| {
    let mut iter = iter.clone().into_iter();
    while !subscriber.is_closed() {
      match iter.next() {
        Some(v) => subscriber.next(v),
        None => subscriber.complete(),
      }
    }
    Ok(())
  })
}
