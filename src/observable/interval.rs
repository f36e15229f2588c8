use std::time::Duration;

use crate::{
  observable::Observable,
  scheduler::{Scheduler, SchedulerExt},
};

/// Creates an observable which will fire every `period`, starting one
/// `period` after subscription, emitting `0, 1, 2, ...`.
///
/// The ticks are a single self-rescheduling action, so an interval that runs
/// forever does not grow the stack. Each tick checks the subscriber first and
/// stops rescheduling once it is closed; on a synchronous scheduler the
/// returned teardown is attached only after the ticks have run, so this check
/// is what ends them.
pub fn interval<E, S>(period: Duration, scheduler: S) -> Observable<usize, E>
where
  E: 'static,
  S: Scheduler,
{
  Observable::new(move |subscriber| {
    Ok(scheduler.schedule(period, 0usize, move |action, seq| {
      if subscriber.is_closed() {
        return;
      }
      subscriber.next(seq);
      if !subscriber.is_closed() {
        action.schedule(seq + 1, period);
      }
    }))
  })
}
