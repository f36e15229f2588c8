//! Time-windowed buffering.
//!
//! Source values are collected into windows. A window is emitted and
//! discarded when its span elapses, when it reaches the maximum size, or when
//! the source completes. Without a creation interval exactly one window is
//! open at a time and closing it opens the next; with one, windows open on a
//! fixed cadence and may overlap, in which case a value is appended to every
//! open window.

use std::{cell::RefCell, rc::Rc, time::Duration};

use smallvec::SmallVec;

use crate::{
  observable::Observable,
  scheduler::{Scheduler, SchedulerExt},
  subscriber::{OperatorSubscriber, Subscriber},
  subscription::Subscription,
};

/// Options for [`Observable::buffer_time_with`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferTimeConfig {
  /// How long each window stays open.
  pub span: Duration,
  /// Open a new window at this cadence instead of right after the previous
  /// one closes.
  pub creation_interval: Option<Duration>,
  /// Close a window early once it holds this many values. `Some(0)` means
  /// no limit, the same as `None`.
  pub max_buffer_size: Option<usize>,
}

impl BufferTimeConfig {
  pub fn new(span: Duration) -> Self { Self { span, creation_interval: None, max_buffer_size: None } }

  pub fn creation_interval(mut self, interval: Duration) -> Self {
    self.creation_interval = Some(interval);
    self
  }

  /// Zero disables the limit.
  pub fn max_buffer_size(mut self, size: usize) -> Self {
    self.max_buffer_size = (size > 0).then_some(size);
    self
  }
}

impl<T: Clone + 'static, E: 'static> Observable<T, E> {
  /// Emit the values collected during each `span`, in back-to-back windows
  /// starting at subscription time. The window still open when the source
  /// completes is emitted before completing; an error discards it.
  ///
  /// ```
  /// use std::time::Duration;
  ///
  /// use rxcore::prelude::*;
  ///
  /// let scheduler = VirtualTimeScheduler::new();
  /// observable::interval::<(), _>(Duration::from_millis(3), scheduler.clone())
  ///   .take(5)
  ///   .buffer_time(Duration::from_millis(10), scheduler.clone())
  ///   .subscribe(|batch| println!("{batch:?}"));
  /// scheduler.flush().unwrap();
  /// ```
  pub fn buffer_time<S: Scheduler>(&self, span: Duration, scheduler: S) -> Observable<Vec<T>, E> {
    self.buffer_time_with(BufferTimeConfig::new(span), scheduler)
  }

  /// [`buffer_time`](Self::buffer_time) with a creation interval and a
  /// maximum window size.
  pub fn buffer_time_with<S: Scheduler>(&self, config: BufferTimeConfig, scheduler: S) -> Observable<Vec<T>, E> {
    self.lift(move |source, subscriber| {
      let windows = Rc::new(Windows {
        destination: subscriber.clone(),
        scheduler: scheduler.clone(),
        span: config.span,
        max_size: config.max_buffer_size.filter(|&max| max > 0),
        restart_on_emit: config.creation_interval.is_none(),
        state: RefCell::new(State { open: Some(Vec::new()), next_id: 0 }),
      });

      if let Some(interval) = config.creation_interval {
        let weak = Rc::downgrade(&windows);
        subscriber.add(scheduler.schedule_periodic(interval, (), move |action, _| {
          match weak.upgrade() {
            Some(windows) if !windows.destination.is_closed() => windows.open_window(),
            _ => action.unsubscribe(),
          }
        }));
      }
      windows.open_window();

      let (on_next, on_complete, on_finalize) = (windows.clone(), windows.clone(), windows);
      source.subscribe_with(
        OperatorSubscriber::new(subscriber, move |v: T, _| on_next.push(v))
          .on_complete(move |dest| {
            on_complete.flush();
            dest.complete();
          })
          .on_finalize(move || on_finalize.release())
          .build(),
      );
    })
  }
}

struct Window<T> {
  id: u64,
  values: Vec<T>,
  timer: Subscription,
}

struct State<T> {
  /// `None` once the subscription has been released.
  open: Option<Vec<Window<T>>>,
  next_id: u64,
}

struct Windows<T, E, S> {
  destination: Subscriber<Vec<T>, E>,
  scheduler: S,
  span: Duration,
  max_size: Option<usize>,
  restart_on_emit: bool,
  state: RefCell<State<T>>,
}

impl<T: Clone + 'static, E: 'static, S: Scheduler> Windows<T, E, S> {
  fn open_window(self: &Rc<Self>) {
    let timer = Subscription::default();
    let id = {
      let mut state = self.state.borrow_mut();
      let State { open, next_id } = &mut *state;
      let Some(open) = open.as_mut() else { return };
      let id = *next_id;
      *next_id += 1;
      open.push(Window { id, values: Vec::new(), timer: timer.clone() });
      id
    };
    self.destination.add(&timer);
    let weak = Rc::downgrade(self);
    timer.add(self.scheduler.schedule(self.span, (), move |_, _| {
      if let Some(windows) = weak.upgrade() {
        windows.emit(id);
      }
    }));
  }

  fn push(self: &Rc<Self>, value: T) {
    // Emitting may close or open windows, so walk a snapshot of the ids.
    let ids: SmallVec<[u64; 2]> = match &self.state.borrow().open {
      Some(open) => open.iter().map(|w| w.id).collect(),
      None => return,
    };
    for id in ids {
      let full = {
        let mut state = self.state.borrow_mut();
        let Some(window) = state.open.as_mut().and_then(|open| open.iter_mut().find(|w| w.id == id)) else {
          continue;
        };
        window.values.push(value.clone());
        self.max_size.is_some_and(|max| window.values.len() >= max)
      };
      if full {
        self.emit(id);
      }
    }
  }

  /// The window leaves the open list before it is delivered, so a value the
  /// consumer feeds back in synchronously cannot land in it.
  fn emit(self: &Rc<Self>, id: u64) {
    let window = {
      let mut state = self.state.borrow_mut();
      let Some(open) = state.open.as_mut() else { return };
      let Some(pos) = open.iter().position(|w| w.id == id) else { return };
      open.remove(pos)
    };
    self.destination.remove(&window.timer);
    window.timer.unsubscribe_or_report();
    tracing::trace!(len = window.values.len(), "buffer_time emits window");
    self.destination.next(window.values);
    if self.restart_on_emit {
      self.open_window();
    }
  }

  /// Emit every open window, oldest first.
  fn flush(&self) {
    loop {
      let window = {
        let mut state = self.state.borrow_mut();
        match state.open.as_mut() {
          Some(open) if !open.is_empty() => open.remove(0),
          _ => break,
        }
      };
      window.timer.unsubscribe_or_report();
      self.destination.next(window.values);
    }
  }

  fn release(&self) {
    let open = self.state.try_borrow_mut().ok().and_then(|mut s| s.open.take());
    drop(open);
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc, time::Duration};

  use crate::prelude::*;

  fn ms(n: u64) -> Duration { Duration::from_millis(n) }

  type Handle = Rc<RefCell<Option<Subscriber<&'static str, &'static str>>>>;

  /// A source driven by hand through the returned handle.
  fn manual() -> (Handle, Observable<&'static str, &'static str>) {
    let handle: Handle = Rc::new(RefCell::new(None));
    let h = handle.clone();
    (handle, observable::create(move |s| *h.borrow_mut() = Some(s)))
  }

  fn send(handle: &Handle, v: &'static str) {
    let subscriber = handle.borrow().clone();
    if let Some(s) = subscriber {
      s.next(v);
    }
  }

  /// Emits each value at its absolute time; `None` completes.
  fn timed(
    scheduler: &VirtualTimeScheduler, events: Vec<(u64, Option<&'static str>)>,
  ) -> Observable<&'static str, &'static str> {
    let scheduler = scheduler.clone();
    Observable::new(move |subscriber| {
      for (at, event) in events.clone() {
        let s = subscriber.clone();
        subscriber.add(scheduler.schedule(ms(at), event, move |_, event| match event {
          Some(v) => s.next(v),
          None => s.complete(),
        }));
      }
      Ok(())
    })
  }

  type Log = Rc<RefCell<Vec<(String, Duration)>>>;

  fn record(scheduler: &VirtualTimeScheduler) -> (Log, PartialObserver<Vec<&'static str>, &'static str>) {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    let (c1, c2, c3) = (scheduler.clone(), scheduler.clone(), scheduler.clone());
    let observer = PartialObserver::new()
      .with_next(move |b: Vec<&'static str>| l1.borrow_mut().push((format!("{b:?}"), c1.now())))
      .with_error(move |e| l2.borrow_mut().push((format!("error {e}"), c2.now())))
      .with_complete(move || l3.borrow_mut().push(("complete".to_owned(), c3.now())));
    (log, observer)
  }

  fn entries(log: &Log) -> Vec<(String, u64)> {
    log.borrow().iter().map(|(s, t)| (s.clone(), t.as_millis() as u64)).collect()
  }

  #[rxcore_macro::test]
  fn windows_follow_subscription_time() {
    let scheduler = VirtualTimeScheduler::new();
    let (log, observer) = record(&scheduler);
    timed(&scheduler, vec![(3, Some("a")), (7, Some("b")), (11, Some("c")), (11, None)])
      .buffer_time(ms(10), scheduler.clone())
      .subscribe_with(observer);

    scheduler.flush().unwrap();
    assert_eq!(
      entries(&log),
      vec![
        (r#"["a", "b"]"#.to_owned(), 10),
        (r#"["c"]"#.to_owned(), 11),
        ("complete".to_owned(), 11)
      ]
    );
    assert!(scheduler.is_empty());
  }

  #[rxcore_macro::test]
  fn full_window_closes_early() {
    let scheduler = VirtualTimeScheduler::new();
    let (log, observer) = record(&scheduler);
    timed(&scheduler, vec![(1, Some("v1")), (3, Some("v2")), (5, Some("v3")), (7, Some("v4"))])
      .buffer_time_with(BufferTimeConfig::new(ms(10)).max_buffer_size(2), scheduler.clone())
      .subscribe_with(observer);

    scheduler.advance_to(ms(10)).unwrap();
    assert_eq!(
      entries(&log),
      vec![(r#"["v1", "v2"]"#.to_owned(), 3), (r#"["v3", "v4"]"#.to_owned(), 7)]
    );

    // The window opened at 7 runs its full span.
    scheduler.advance_to(ms(17)).unwrap();
    assert_eq!(entries(&log).last(), Some(&("[]".to_owned(), 17)));
  }

  #[rxcore_macro::test]
  fn creation_interval_overlaps_windows() {
    let scheduler = VirtualTimeScheduler::new();
    let (log, observer) = record(&scheduler);
    let subscription = timed(&scheduler, vec![(7, Some("x")), (12, Some("y"))])
      .buffer_time_with(BufferTimeConfig::new(ms(10)).creation_interval(ms(5)), scheduler.clone())
      .subscribe_with(observer);

    scheduler.advance_to(ms(15)).unwrap();
    assert_eq!(
      entries(&log),
      vec![(r#"["x"]"#.to_owned(), 10), (r#"["x", "y"]"#.to_owned(), 15)]
    );

    subscription.unsubscribe().unwrap();
    assert!(scheduler.is_empty());
  }

  #[rxcore_macro::test]
  fn value_fed_back_during_emission_is_not_buffered() {
    let scheduler = VirtualTimeScheduler::new();
    let (handle, source) = manual();
    let batches = Rc::new(RefCell::new(Vec::new()));
    let (b, h) = (batches.clone(), handle.clone());
    source.buffer_time(ms(10), scheduler.clone()).subscribe(move |batch: Vec<&str>| {
      let first = b.borrow().is_empty();
      b.borrow_mut().push(batch);
      if first {
        send(&h, "reentrant");
      }
    });

    send(&handle, "a");
    scheduler.advance_to(ms(10)).unwrap();
    send(&handle, "later");
    scheduler.advance_to(ms(20)).unwrap();
    assert_eq!(*batches.borrow(), vec![vec!["a"], vec!["later"]]);
  }

  #[rxcore_macro::test]
  fn error_discards_open_windows() {
    let scheduler = VirtualTimeScheduler::new();
    let (log, observer) = record(&scheduler);
    let (handle, source) = manual();
    source.buffer_time(ms(10), scheduler.clone()).subscribe_with(observer);

    send(&handle, "lost");
    let subscriber = handle.borrow().clone();
    if let Some(s) = subscriber {
      s.error("boom");
    }

    assert_eq!(entries(&log), vec![("error boom".to_owned(), 0)]);
    assert!(scheduler.is_empty());
  }

  #[rxcore_macro::test]
  fn unsubscribe_cancels_timers() {
    let scheduler = VirtualTimeScheduler::new();
    let (log, observer) = record(&scheduler);
    let (handle, source) = manual();
    let subscription = source.buffer_time(ms(10), scheduler.clone()).subscribe_with(observer);
    send(&handle, "a");
    assert_eq!(scheduler.pending_count(), 1);

    subscription.unsubscribe().unwrap();
    assert!(scheduler.is_empty());
    scheduler.flush().unwrap();
    assert!(log.borrow().is_empty());
  }

  #[rxcore_macro::test]
  fn overlapping_windows_close_early_when_full() {
    let scheduler = VirtualTimeScheduler::new();
    let batches = Rc::new(RefCell::new(Vec::new()));
    let b = batches.clone();
    let config = BufferTimeConfig::new(ms(5)).creation_interval(ms(2)).max_buffer_size(3);
    observable::interval::<&'static str, _>(ms(1), scheduler.clone())
      .buffer_time_with(config, scheduler.clone())
      .take(3)
      .subscribe(move |batch| b.borrow_mut().push(batch));

    scheduler.flush().unwrap();
    assert_eq!(*batches.borrow(), vec![vec![0, 1, 2], vec![1, 2, 3], vec![3, 4, 5]]);
    assert!(scheduler.is_empty());
  }

  #[rxcore_macro::test]
  fn zero_max_size_means_no_limit() {
    assert_eq!(BufferTimeConfig::new(ms(10)).max_buffer_size(0).max_buffer_size, None);

    let scheduler = VirtualTimeScheduler::new();
    let (log, observer) = record(&scheduler);
    let config = BufferTimeConfig { max_buffer_size: Some(0), ..BufferTimeConfig::new(ms(10)) };
    timed(&scheduler, vec![(1, Some("v1")), (3, Some("v2")), (12, None)])
      .buffer_time_with(config, scheduler.clone())
      .subscribe_with(observer);

    scheduler.flush().unwrap();
    assert_eq!(
      entries(&log),
      vec![
        (r#"["v1", "v2"]"#.to_owned(), 10),
        ("[]".to_owned(), 12),
        ("complete".to_owned(), 12)
      ]
    );
  }
}
