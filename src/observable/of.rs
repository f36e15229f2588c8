use crate::observable::Observable;

/// Creates an observable producing the given values, then completing.
///
/// ```
/// use rxcore::prelude::*;
///
/// let source: Observable<i32, ()> = rxcore::of_sequence!(1, 2, 3);
/// source.subscribe(|v| println!("{v}"));
/// ```
#[macro_export]
macro_rules! of_sequence {
  ( $( $item:expr ),* ) => {
    $crate::observable::create(|s: $crate::subscriber::Subscriber<_, _>| {
      $(
        s.next($item);
      )*
      s.complete();
    })
  };
}

/// Creates an observable producing a single value.
///
/// Completes immediately after emitting the value given. Never emits an
/// error.
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::of::<_, ()>(123).subscribe(|v| println!("{v}"));
/// ```
pub fn of<T, E>(value: T) -> Observable<T, E>
where
  T: Clone + 'static,
  E: 'static,
{
  Observable::new(move |subscriber| {
    subscriber.next(value.clone());
    subscriber.complete();
    Ok(())
  })
}
