//! Bounded-concurrency flattening shared by every operator that subscribes to
//! inner observables.
//!
//! Outer values are projected to inner observables. At most `concurrent`
//! inners are subscribed at a time; further outer values wait in a FIFO
//! queue and are admitted, oldest first, as active inners complete. Inner
//! values are forwarded as they arrive. The output completes once the outer
//! source has completed and no inner is active or queued. Any error, outer or
//! inner, goes straight downstream and tears everything down.

use std::{
  cell::{Cell, RefCell},
  collections::VecDeque,
  rc::{Rc, Weak},
};

use crate::{
  observable::Observable,
  subscriber::{OperatorSubscriber, Subscriber},
};

type Project<T, U, E> = Box<dyn Fn(T) -> Observable<U, E>>;

/// How one flattening operator uses the engine.
pub(crate) struct MergeStrategy<T, U, E> {
  pub project: Project<T, U, E>,
  pub concurrent: usize,
  /// Emitted downstream when an outer value is admitted.
  pub echo: Option<Box<dyn Fn(&T) -> U>>,
  /// Feeds inner values back in as outer values instead of forwarding them.
  pub recurse: Option<Box<dyn Fn(U) -> T>>,
}

impl<T, U, E> MergeStrategy<T, U, E> {
  pub fn new(project: impl Fn(T) -> Observable<U, E> + 'static, concurrent: usize) -> Self {
    debug_assert!(concurrent > 0);
    Self { project: Box::new(project), concurrent, echo: None, recurse: None }
  }
}

struct Bookkeeping<T> {
  queue: VecDeque<T>,
  active: usize,
  outer_complete: bool,
  /// Set while `inner_finished` is admitting queued values. Inners that
  /// finish synchronously during admission only give back their slot, and
  /// the running loop admits the next value, so a long run of synchronous
  /// inners is handled iteratively.
  draining: bool,
}

struct Merge<T, U, E> {
  destination: Subscriber<U, E>,
  strategy: MergeStrategy<T, U, E>,
  state: RefCell<Bookkeeping<T>>,
}

/// Run the engine for one subscription: subscribe `source` on behalf of
/// `subscriber`.
pub(crate) fn merge_internals<T, U, E>(
  source: &Observable<T, E>, subscriber: &Subscriber<U, E>, strategy: MergeStrategy<T, U, E>,
) where
  T: 'static,
  U: 'static,
  E: 'static,
{
  let merge = Rc::new(Merge {
    destination: subscriber.clone(),
    strategy,
    state: RefCell::new(Bookkeeping {
      queue: VecDeque::new(),
      active: 0,
      outer_complete: false,
      draining: false,
    }),
  });

  // Queued outer values are released with the downstream subscription.
  let weak: Weak<Merge<T, U, E>> = Rc::downgrade(&merge);
  subscriber.add(move || {
    if let Some(merge) = weak.upgrade() {
      let queue = merge.state.try_borrow_mut().map(|mut s| std::mem::take(&mut s.queue));
      drop(queue);
    }
  });

  let (on_next, on_complete) = (merge.clone(), merge);
  source.subscribe_with(
    OperatorSubscriber::new(subscriber, move |v: T, _| on_next.outer_next(v))
      .on_complete(move |_| {
        on_complete.state.borrow_mut().outer_complete = true;
        on_complete.check_complete();
      })
      .build(),
  );
}

impl<T: 'static, U: 'static, E: 'static> Merge<T, U, E> {
  fn outer_next(self: &Rc<Self>, value: T) {
    let value = {
      let mut state = self.state.borrow_mut();
      // While admission is running the queue is served first, in order.
      if state.active < self.strategy.concurrent && !state.draining {
        // Counted before subscribing: the inner may finish synchronously.
        state.active += 1;
        Some(value)
      } else {
        state.queue.push_back(value);
        None
      }
    };
    if let Some(value) = value {
      self.subscribe_inner(value);
    }
  }

  /// `active` must already account for this inner.
  fn subscribe_inner(self: &Rc<Self>, value: T) {
    if let Some(echo) = &self.strategy.echo {
      self.destination.next(echo(&value));
    }
    tracing::debug!("merge admits inner");

    let inner_complete = Rc::new(Cell::new(false));
    let completed = inner_complete.clone();
    let (on_next, on_finalize) = (self.clone(), self.clone());
    let inner = OperatorSubscriber::new(&self.destination, move |v: U, dest| match &on_next.strategy.recurse {
      Some(recurse) => on_next.outer_next(recurse(v)),
      None => dest.next(v),
    })
    .on_complete(move |_| completed.set(true))
    .on_finalize(move || {
      // Only a completed inner frees its slot; an error or an unsubscribe
      // tears the whole operator down anyway.
      if inner_complete.get() {
        on_finalize.inner_finished();
      }
    })
    .build();

    (self.strategy.project)(value).subscribe_with(inner);
  }

  fn inner_finished(self: &Rc<Self>) {
    {
      let mut state = self.state.borrow_mut();
      state.active -= 1;
      if state.draining {
        return;
      }
      state.draining = true;
    }
    loop {
      let next = {
        let mut state = self.state.borrow_mut();
        if state.active < self.strategy.concurrent {
          let next = state.queue.pop_front();
          if next.is_some() {
            state.active += 1;
          }
          next
        } else {
          None
        }
      };
      match next {
        Some(value) => self.subscribe_inner(value),
        None => break,
      }
    }
    self.state.borrow_mut().draining = false;
    self.check_complete();
  }

  fn check_complete(&self) {
    let done = {
      let state = self.state.borrow();
      state.outer_complete && state.queue.is_empty() && state.active == 0
    };
    if done && !self.destination.is_stopped() {
      self.destination.complete();
    }
  }
}
