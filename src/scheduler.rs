//! Schedulers decide *when* work runs.
//!
//! A [`Scheduler`] only has to provide a clock and a way to run a [`Job`]
//! after a delay. Everything else, including self-rescheduling actions, is
//! built on top of that in [`SchedulerExt`]. Rescheduling never recurses: an
//! action that asks to run again is pushed back into the scheduler's queue
//! after its work function has returned, so periodic work runs forever without
//! growing the stack.
//!
//! Provided schedulers:
//!
//! - [`TrampolineScheduler`]: runs work on the current thread as soon as it is
//!   due, queueing work submitted while another job is running.
//! - [`VirtualTimeScheduler`]: a manually advanced clock for deterministic
//!   tests of time-based operators.
//! - `LocalScheduler` (feature `tokio-scheduler`): wall-clock timers on a
//!   current-thread tokio runtime.

use std::{cell::RefCell, rc::Rc, time::Duration};

use crate::subscription::{Subscription, Teardown};

mod queue;
mod trampoline;
mod virtual_time;

#[cfg(feature = "tokio-scheduler")]
mod local;

#[cfg(feature = "tokio-scheduler")]
pub use local::LocalScheduler;
pub use trampoline::TrampolineScheduler;
pub use virtual_time::VirtualTimeScheduler;

/// A unit of work handed to a [`Scheduler`], bound to the subscription that
/// cancels it.
pub struct Job {
  handle: Subscription,
  task: Box<dyn FnOnce()>,
}

impl Job {
  pub fn new(handle: Subscription, task: impl FnOnce() + 'static) -> Self {
    Self { handle, task: Box::new(task) }
  }

  /// A cancelled job is skipped and may be discarded by the scheduler at any
  /// time.
  #[inline]
  pub fn is_cancelled(&self) -> bool { self.handle.is_closed() }

  pub fn run(self) {
    if !self.is_cancelled() {
      (self.task)()
    }
  }
}

/// Clock plus delayed execution.
///
/// Two jobs submitted with the same due time run in submission order.
pub trait Scheduler: Clone + 'static {
  /// Time elapsed since the scheduler's origin.
  fn now(&self) -> Duration;

  /// Run `job` once `delay` has elapsed.
  fn submit(&self, delay: Duration, job: Job);
}

/// The execution context handed to scheduled work.
pub struct SchedulerAction<S> {
  subscription: Subscription,
  now: Duration,
  pending: Option<(S, Duration)>,
}

impl<S> SchedulerAction<S> {
  /// Run this action again after `delay` with `state`.
  ///
  /// The resubmission happens once the current work call returns, and is
  /// dropped if the action has been cancelled in the meantime. Calling it more
  /// than once in one run keeps the last request.
  pub fn schedule(&mut self, state: S, delay: Duration) { self.pending = Some((state, delay)); }

  /// The scheduler clock at the moment this run started.
  #[inline]
  pub fn now(&self) -> Duration { self.now }

  #[inline]
  pub fn subscription(&self) -> &Subscription { &self.subscription }

  #[inline]
  pub fn is_closed(&self) -> bool { self.subscription.is_closed() }

  /// Cancel this action, including any resubmission requested by the current
  /// run.
  pub fn unsubscribe(&self) { self.subscription.unsubscribe_or_report() }
}

type Work<S> = Box<dyn FnMut(&mut SchedulerAction<S>, S)>;

struct ActionCore<Sch, S> {
  scheduler: Sch,
  subscription: Subscription,
  work: RefCell<Option<Work<S>>>,
  state: RefCell<Option<S>>,
}

pub trait SchedulerExt: Scheduler {
  /// Schedule `work` to run with `state` after `delay`.
  ///
  /// The returned subscription identifies the action across all of its
  /// resubmissions: unsubscribing it before the work fires prevents the run,
  /// unsubscribing it from inside the work prevents any resubmission. The
  /// subscription closes on its own once the action finishes without asking
  /// to run again.
  fn schedule<S: 'static>(
    &self, delay: Duration, state: S, work: impl FnMut(&mut SchedulerAction<S>, S) + 'static,
  ) -> Subscription {
    let core = Rc::new_cyclic(|weak: &std::rc::Weak<ActionCore<Self, S>>| {
      let weak = weak.clone();
      let cancel = Teardown::from(move || {
        if let Some(core) = weak.upgrade() {
          // Cancelled jobs may sit in a queue until their due time; they must
          // not keep the work or its state alive until then.
          let work = core.work.try_borrow_mut().ok().and_then(|mut w| w.take());
          let state = core.state.try_borrow_mut().ok().and_then(|mut s| s.take());
          drop((work, state));
        }
      });
      ActionCore {
        scheduler: self.clone(),
        subscription: Subscription::new(cancel),
        work: RefCell::new(Some(Box::new(work) as Work<S>)),
        state: RefCell::new(None),
      }
    });
    let subscription = core.subscription.clone();
    submit_action(core, state, delay);
    subscription
  }

  /// Run `work` every `period`, starting one `period` from now, until the
  /// returned subscription is closed.
  ///
  /// The work receives the running action, so a tick can stop the cycle with
  /// `action.unsubscribe()` even when nobody holds the returned subscription
  /// yet (a synchronous scheduler runs the first tick before `schedule`
  /// returns).
  fn schedule_periodic<S: 'static>(
    &self, period: Duration, state: S, mut work: impl FnMut(&SchedulerAction<S>, &mut S) + 'static,
  ) -> Subscription {
    self.schedule(period, state, move |action, mut state| {
      work(action, &mut state);
      action.schedule(state, period);
    })
  }
}

impl<T: Scheduler> SchedulerExt for T {}

fn submit_action<Sch: Scheduler, S: 'static>(core: Rc<ActionCore<Sch, S>>, state: S, delay: Duration) {
  *core.state.borrow_mut() = Some(state);
  let handle = core.subscription.clone();
  let scheduler = core.scheduler.clone();
  scheduler.submit(delay, Job::new(handle, move || run_action(core)));
}

fn run_action<Sch: Scheduler, S: 'static>(core: Rc<ActionCore<Sch, S>>) {
  if core.subscription.is_closed() {
    return;
  }
  // The work is taken out so that it can resubmit or cancel itself.
  let Some(mut work) = core.work.borrow_mut().take() else { return };
  let Some(state) = core.state.borrow_mut().take() else { return };
  let mut action =
    SchedulerAction { subscription: core.subscription.clone(), now: core.scheduler.now(), pending: None };
  work(&mut action, state);

  if core.subscription.is_closed() {
    return;
  }
  match action.pending {
    Some((state, delay)) => {
      *core.work.borrow_mut() = Some(work);
      submit_action(core, state, delay);
    }
    None => {
      drop(work);
      core.subscription.unsubscribe_or_report();
    }
  }
}
