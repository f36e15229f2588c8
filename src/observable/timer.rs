use std::time::Duration;

use crate::{
  observable::Observable,
  scheduler::{Scheduler, SchedulerExt},
};

/// Returns an observable which will emit a single `item` once after a given
/// `delay` using a given `scheduler`, then complete.
pub fn timer<T, E, S>(item: T, delay: Duration, scheduler: S) -> Observable<T, E>
where
  T: Clone + 'static,
  E: 'static,
  S: Scheduler,
{
  Observable::new(move |subscriber| {
    Ok(scheduler.schedule(delay, (subscriber, item.clone()), |_, (subscriber, item)| {
      subscriber.next(item);
      subscriber.complete();
    }))
  })
}
