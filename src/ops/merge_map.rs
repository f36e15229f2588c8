use std::rc::Rc;

use super::merge_internals::{merge_internals, MergeStrategy};
use crate::observable::Observable;

fn assert_concurrent(concurrent: usize) {
  assert!(concurrent > 0, "concurrent must be greater than zero");
}

impl<T: 'static, E: 'static> Observable<T, E> {
  /// Project each value to an inner observable and merge their values, with
  /// at most `concurrent` inners subscribed at once. Pass `usize::MAX` for no
  /// limit.
  ///
  /// # Panics
  ///
  /// Panics if `concurrent` is zero.
  pub fn merge_map<U: 'static>(
    &self, project: impl Fn(T) -> Observable<U, E> + 'static, concurrent: usize,
  ) -> Observable<U, E> {
    assert_concurrent(concurrent);
    let project = Rc::new(project);
    self.lift(move |source, subscriber| {
      let project = project.clone();
      merge_internals(source, subscriber, MergeStrategy::new(move |v| project(v), concurrent));
    })
  }

  /// Project each value to an inner observable and subscribe to them one at a
  /// time, in order.
  pub fn concat_map<U: 'static>(&self, project: impl Fn(T) -> Observable<U, E> + 'static) -> Observable<U, E> {
    self.merge_map(project, 1)
  }

  /// Recursively project every value, source or projected, and emit them
  /// all. Each value is emitted when its projection is subscribed.
  ///
  /// # Panics
  ///
  /// Panics if `concurrent` is zero.
  pub fn expand(&self, project: impl Fn(T) -> Observable<T, E> + 'static, concurrent: usize) -> Observable<T, E>
  where
    T: Clone,
  {
    assert_concurrent(concurrent);
    let project = Rc::new(project);
    self.lift(move |source, subscriber| {
      let project = project.clone();
      let mut strategy = MergeStrategy::new(move |v| project(v), concurrent);
      strategy.echo = Some(Box::new(T::clone));
      strategy.recurse = Some(Box::new(|v| v));
      merge_internals(source, subscriber, strategy);
    })
  }
}
