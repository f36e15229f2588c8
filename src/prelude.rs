//! Prelude module for convenient imports

pub use crate::{
  config,
  error::{
    ArgumentOutOfRangeError, BoxError, EmptyError, RxError, SchedulerError, SequenceError,
    UnsubscriptionError,
  },
  notification::{Notification, NotificationKind},
  observable::{self, Observable},
  observer::{FnObserver, Observer, PartialObserver},
  ops::BufferTimeConfig,
  scheduler::{Job, Scheduler, SchedulerAction, SchedulerExt, TrampolineScheduler, VirtualTimeScheduler},
  subscriber::{IntoSubscriber, OperatorSubscriber, Subscriber},
  subscription::{Subscription, SubscriptionGuard, Teardown},
};
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::LocalScheduler;
