//! Virtual time for deterministic tests of time-based operators.
//!
//! Time only moves when the test says so. Jobs are kept in a priority queue
//! keyed by `(due, submission sequence)` and run synchronously by
//! [`VirtualTimeScheduler::flush`] and the `advance_*` methods. A job that
//! schedules more work due inside the current horizon has that work run in the
//! same pass.
//!
//! ```rust
//! use std::time::Duration;
//! use rxcore::prelude::*;
//!
//! let scheduler = VirtualTimeScheduler::new();
//! scheduler.schedule(Duration::from_millis(100), (), |_, _| println!("fired"));
//! scheduler.advance_by(Duration::from_millis(100)).unwrap();
//! ```

use std::{
  cell::{Cell, RefCell},
  rc::Rc,
  time::Duration,
};

use super::{queue::JobQueue, Job, Scheduler};
use crate::{config, error::SchedulerError};

struct State {
  now: Cell<Duration>,
  queue: RefCell<JobQueue>,
  flushing: Cell<bool>,
  max_frames: Option<Duration>,
  frame_limit: usize,
}

/// A scheduler driven by a manually advanced logical clock.
///
/// Clones share the same clock and queue.
#[derive(Clone)]
pub struct VirtualTimeScheduler(Rc<State>);

struct FlushGuard<'a>(&'a Cell<bool>);

impl Drop for FlushGuard<'_> {
  fn drop(&mut self) { self.0.set(false) }
}

impl Default for VirtualTimeScheduler {
  fn default() -> Self { Self::new() }
}

impl VirtualTimeScheduler {
  pub fn new() -> Self { Self::build(None) }

  /// A scheduler whose [`flush`](Self::flush) never runs work due after
  /// `max_frames`. Periodic work can then be flushed without looping forever.
  pub fn with_max_frames(max_frames: Duration) -> Self { Self::build(Some(max_frames)) }

  fn build(max_frames: Option<Duration>) -> Self {
    Self(Rc::new(State {
      now: Cell::new(Duration::ZERO),
      queue: RefCell::new(JobQueue::default()),
      flushing: Cell::new(false),
      max_frames,
      frame_limit: config::max_virtual_frames_per_instant(),
    }))
  }

  /// Run every queued job in due order, including jobs queued while
  /// flushing, up to the `max_frames` horizon if one was set.
  pub fn flush(&self) -> Result<(), SchedulerError> { self.run_until(self.0.max_frames) }

  /// Move the clock forward by `delta`, running everything due on the way.
  pub fn advance_by(&self, delta: Duration) -> Result<(), SchedulerError> {
    self.advance_to(self.0.now.get() + delta)
  }

  /// Move the clock to `time`, running everything due on the way. The clock
  /// never goes backwards.
  pub fn advance_to(&self, time: Duration) -> Result<(), SchedulerError> {
    self.run_until(Some(time))?;
    if time > self.0.now.get() {
      self.0.now.set(time);
    }
    Ok(())
  }

  /// Number of queued jobs that have not been cancelled.
  pub fn pending_count(&self) -> usize { self.0.queue.borrow().live_len() }

  pub fn is_empty(&self) -> bool { self.pending_count() == 0 }

  fn run_until(&self, horizon: Option<Duration>) -> Result<(), SchedulerError> {
    // Work that flushes from inside a job is picked up by the outer pass.
    if self.0.flushing.replace(true) {
      return Ok(());
    }
    let _guard = FlushGuard(&self.0.flushing);
    tracing::debug!(now = ?self.0.now.get(), ?horizon, "virtual flush");

    let mut instant = self.0.now.get();
    let mut frames = 0;
    loop {
      let next_due = self.0.queue.borrow_mut().peek_due();
      let due = match next_due {
        Some(due) if horizon.map_or(true, |h| due <= h) => due,
        _ => break,
      };
      if due > instant {
        instant = due;
        frames = 0;
      }
      if frames >= self.0.frame_limit {
        tracing::warn!(at = ?instant, limit = self.0.frame_limit, "virtual flush frame limit exceeded");
        return Err(SchedulerError::FrameLimitExceeded { at: instant, limit: self.0.frame_limit });
      }

      let Some((due, job)) = self.0.queue.borrow_mut().pop() else { break };
      if due > self.0.now.get() {
        self.0.now.set(due);
      }
      frames += 1;
      job.run();
    }
    Ok(())
  }
}

impl Scheduler for VirtualTimeScheduler {
  #[inline]
  fn now(&self) -> Duration { self.0.now.get() }

  fn submit(&self, delay: Duration, job: Job) {
    let due = self.0.now.get() + delay;
    self.0.queue.borrow_mut().push(due, job);
  }
}
