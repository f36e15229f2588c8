use crate::observable::{self, Observable};

impl<U: 'static, E: 'static> Observable<Observable<U, E>, E> {
  /// Flatten a higher-order observable, subscribing to at most `concurrent`
  /// inner observables at a time.
  ///
  /// # Panics
  ///
  /// Panics if `concurrent` is zero.
  pub fn merge_all(&self, concurrent: usize) -> Observable<U, E> { self.merge_map(|inner| inner, concurrent) }

  /// Flatten a higher-order observable by subscribing to each inner
  /// observable only after the previous one completed.
  pub fn concat_all(&self) -> Observable<U, E> { self.merge_all(1) }
}

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Emit the values of both observables as they arrive. Completes once both
  /// have completed.
  pub fn merge_with(&self, other: Observable<T, E>) -> Observable<T, E> {
    observable::from_iter([self.clone(), other]).merge_all(usize::MAX)
  }

  /// Emit every value of this observable, then every value of `other`.
  pub fn concat_with(&self, other: Observable<T, E>) -> Observable<T, E> {
    observable::from_iter([self.clone(), other]).concat_all()
  }
}

#[cfg(test)]
mod tests {
  use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    time::Duration,
  };

  use crate::prelude::*;

  fn ms(n: u64) -> Duration { Duration::from_millis(n) }

  #[rxcore_macro::test]
  fn merge_interleaves_by_time() {
    let scheduler = VirtualTimeScheduler::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    let evens = observable::interval::<(), _>(ms(20), scheduler.clone()).map(|v| v * 2).take(3);
    let odds = observable::interval(ms(20), scheduler.clone()).map(|v| v * 2 + 1).take(3);
    evens
      .merge_with(odds)
      .subscribe(move |v| s.borrow_mut().push(v));

    scheduler.flush().unwrap();
    assert_eq!(*seen.borrow(), vec![0, 1, 2, 3, 4, 5]);
  }

  #[rxcore_macro::test]
  fn concat_waits_for_completion() {
    let scheduler = VirtualTimeScheduler::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let (s, clock) = (seen.clone(), scheduler.clone());
    observable::timer::<_, (), _>("late", ms(50), scheduler.clone())
      .concat_with(observable::of("early"))
      .subscribe(move |v| s.borrow_mut().push((v, clock.now())));

    scheduler.flush().unwrap();
    assert_eq!(*seen.borrow(), vec![("late", ms(50)), ("early", ms(50))]);
  }

  #[rxcore_macro::test]
  fn merge_all_respects_ceiling() {
    let scheduler = VirtualTimeScheduler::new();
    let subscribed = Rc::new(RefCell::new(Vec::new()));
    let inners: Vec<Observable<u64, ()>> = (0..6)
      .map(|i| {
        let (log, s) = (subscribed.clone(), scheduler.clone());
        observable::defer(move || {
          log.borrow_mut().push(s.now());
          observable::timer(i, ms(10), s.clone())
        })
      })
      .collect();
    let completed_at = Rc::new(Cell::new(None));
    let (c, clock) = (completed_at.clone(), scheduler.clone());
    observable::from_iter(inners)
      .merge_all(2)
      .subscribe_with(PartialObserver::new().with_complete(move || c.set(Some(clock.now()))));

    scheduler.flush().unwrap();
    assert_eq!(*subscribed.borrow(), vec![ms(0), ms(0), ms(10), ms(10), ms(20), ms(20)]);
    assert_eq!(completed_at.get(), Some(ms(30)));
  }

  #[rxcore_macro::test]
  fn sibling_error_tears_down_others() {
    let scheduler = VirtualTimeScheduler::new();
    let errors = Rc::new(Cell::new(0));
    let e = errors.clone();
    observable::timer::<_, &str, _>(1, ms(100), scheduler.clone())
      .merge_with(observable::timer(2, ms(10), scheduler.clone()).try_map(|_| Err("outer")))
      .subscribe_with(PartialObserver::new().with_error(move |_| e.set(e.get() + 1)));

    scheduler.advance_to(ms(10)).unwrap();
    assert_eq!(errors.get(), 1);
    assert!(scheduler.is_empty());
  }
}
