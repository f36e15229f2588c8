use std::{
  cell::{Cell, RefCell},
  rc::Rc,
  time::Duration,
};

use futures::{future::select, pin_mut};
use tokio::{sync::Notify, time::Instant};

use super::{queue::JobQueue, Job, Scheduler};

struct State {
  origin: Instant,
  queue: RefCell<JobQueue>,
  wake: Notify,
  driver_running: Cell<bool>,
}

/// Wall-clock scheduler for a current-thread tokio runtime.
///
/// Jobs are run by a single driver task spawned with
/// [`tokio::task::spawn_local`], so submitting work must happen inside a
/// [`tokio::task::LocalSet`]. The driver sleeps until the earliest pending
/// job and exits once the queue is empty.
#[derive(Clone)]
pub struct LocalScheduler(Rc<State>);

impl Default for LocalScheduler {
  fn default() -> Self { Self::new() }
}

impl LocalScheduler {
  pub fn new() -> Self {
    Self(Rc::new(State {
      origin: Instant::now(),
      queue: RefCell::new(JobQueue::default()),
      wake: Notify::new(),
      driver_running: Cell::new(false),
    }))
  }
}

impl Scheduler for LocalScheduler {
  fn now(&self) -> Duration { self.0.origin.elapsed() }

  fn submit(&self, delay: Duration, job: Job) {
    let due = self.now() + delay;
    self.0.queue.borrow_mut().push(due, job);
    if self.0.driver_running.replace(true) {
      self.0.wake.notify_one();
    } else {
      tokio::task::spawn_local(drive(self.clone()));
    }
  }
}

async fn drive(scheduler: LocalScheduler) {
  let state = &scheduler.0;
  loop {
    let next_due = state.queue.borrow_mut().peek_due();
    let Some(due) = next_due else { break };
    if due <= scheduler.now() {
      let job = state.queue.borrow_mut().pop();
      if let Some((_, job)) = job {
        job.run();
      }
      continue;
    }
    let sleep = tokio::time::sleep_until(state.origin + due);
    let notified = state.wake.notified();
    pin_mut!(sleep, notified);
    // An earlier submission wakes the driver so it can re-pick its deadline.
    select(sleep, notified).await;
  }
  state.driver_running.set(false);
  tracing::trace!("local scheduler driver idle");
}
