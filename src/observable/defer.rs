use crate::observable::Observable;

/// Creates an observable that, on each subscription, asks `factory` for the
/// observable to subscribe to.
///
/// ```rust
/// use rxcore::prelude::*;
///
/// observable::defer(|| {
///   println!("Hi!");
///   observable::of::<_, ()>("Hello!")
/// })
/// .subscribe(move |v| println!("{v}"));
/// // Prints: Hi!\nHello!\n
/// ```
pub fn defer<T, E>(factory: impl Fn() -> Observable<T, E> + 'static) -> Observable<T, E>
where
  T: 'static,
  E: 'static,
{
  Observable::new(move |subscriber| {
    factory().subscribe_with(subscriber);
    Ok(())
  })
}
