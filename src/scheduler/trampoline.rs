use std::{
  cell::{Cell, RefCell},
  time::{Duration, Instant},
};

use super::{queue::JobQueue, Job, Scheduler};

thread_local! {
  static ORIGIN: Instant = Instant::now();
  static QUEUE: RefCell<JobQueue> = RefCell::new(JobQueue::default());
  static DRAINING: Cell<bool> = const { Cell::new(false) };
}

/// Runs work on the current thread.
///
/// A job submitted while no other trampoline job is running is executed
/// before `submit` returns. Jobs submitted from inside a running job are
/// queued and executed after it, in due order, so recursive scheduling turns
/// into a loop. Delayed jobs block the thread until they are due.
#[derive(Clone, Copy, Default, Debug)]
pub struct TrampolineScheduler;

struct DrainGuard;

impl Drop for DrainGuard {
  fn drop(&mut self) { DRAINING.with(|d| d.set(false)) }
}

impl Scheduler for TrampolineScheduler {
  fn now(&self) -> Duration { ORIGIN.with(|origin| origin.elapsed()) }

  fn submit(&self, delay: Duration, job: Job) {
    let due = self.now() + delay;
    QUEUE.with(|q| q.borrow_mut().push(due, job));
    if DRAINING.with(|d| d.replace(true)) {
      return;
    }
    let _guard = DrainGuard;
    while let Some((due, job)) = QUEUE.with(|q| q.borrow_mut().pop()) {
      let now = self.now();
      if due > now {
        std::thread::sleep(due - now);
      }
      job.run();
    }
  }
}

#[cfg(test)]
mod tests {
  use std::rc::Rc;

  use super::*;
  use crate::scheduler::SchedulerExt;

  #[rxcore_macro::test]
  fn runs_synchronously() {
    let hit = Rc::new(Cell::new(false));
    let h = hit.clone();
    let handle = TrampolineScheduler.schedule(Duration::ZERO, (), move |_, _| h.set(true));
    assert!(hit.get());
    assert!(handle.is_closed());
  }

  #[rxcore_macro::test]
  fn nested_work_is_queued_not_recursed() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let l = log.clone();
    TrampolineScheduler.schedule(Duration::ZERO, (), move |_, _| {
      l.borrow_mut().push("outer start");
      let l2 = l.clone();
      TrampolineScheduler.schedule(Duration::ZERO, (), move |_, _| l2.borrow_mut().push("inner"));
      l.borrow_mut().push("outer end");
    });
    assert_eq!(*log.borrow(), vec!["outer start", "outer end", "inner"]);
  }

  #[rxcore_macro::test]
  fn recursion_depth_stays_flat() {
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    TrampolineScheduler.schedule(Duration::ZERO, 0u32, move |action, n| {
      c.set(n);
      if n < 100_000 {
        action.schedule(n + 1, Duration::ZERO);
      }
    });
    assert_eq!(count.get(), 100_000);
  }

  #[rxcore_macro::test]
  fn delayed_work_blocks_until_due() {
    let start = Instant::now();
    TrampolineScheduler.schedule(Duration::from_millis(5), (), |_, _| {});
    assert!(start.elapsed() >= Duration::from_millis(5));
  }
}
