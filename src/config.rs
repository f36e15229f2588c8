//! Runtime hooks for failures that have nowhere else to go.
//!
//! The engine is single-threaded, so the configuration is thread-local: each
//! thread (and therefore each test) sees its own hooks.

use std::{any::Any, cell::RefCell, fmt, rc::Rc};

use crate::notification::NotificationKind;

/// An error that reached a subscriber without an `error` handler, or a
/// teardown failure raised where no caller could receive it.
pub struct UnhandledError {
  description: String,
  payload: Box<dyn Any>,
}

impl UnhandledError {
  /// `Debug` rendering of the original error.
  pub fn description(&self) -> &str { &self.description }

  pub fn downcast_ref<E: 'static>(&self) -> Option<&E> { self.payload.downcast_ref() }

  pub fn into_payload(self) -> Box<dyn Any> { self.payload }
}

impl fmt::Debug for UnhandledError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("UnhandledError")
      .field("description", &self.description)
      .finish()
  }
}

pub type UnhandledErrorHandler = Rc<dyn Fn(UnhandledError)>;
pub type StoppedNotificationHandler = Rc<dyn Fn(NotificationKind)>;

#[derive(Clone)]
pub struct RxConfig {
  /// Receives errors nobody handled. When unset the error is logged and the
  /// thread panics.
  pub on_unhandled_error: Option<UnhandledErrorHandler>,
  /// Called whenever a notification reaches a subscriber that has already
  /// stopped.
  pub on_stopped_notification: Option<StoppedNotificationHandler>,
  /// Upper bound on actions one virtual-time flush may run at a single
  /// instant before it gives up.
  pub max_virtual_frames_per_instant: usize,
}

impl Default for RxConfig {
  fn default() -> Self {
    Self {
      on_unhandled_error: None,
      on_stopped_notification: None,
      max_virtual_frames_per_instant: 10_000,
    }
  }
}

thread_local! {
  static CONFIG: RefCell<RxConfig> = RefCell::new(RxConfig::default());
}

/// Run `f` with mutable access to this thread's configuration.
pub fn with<R>(f: impl FnOnce(&mut RxConfig) -> R) -> R {
  CONFIG.with(|cfg| f(&mut cfg.borrow_mut()))
}

pub fn set_unhandled_error_handler(handler: impl Fn(UnhandledError) + 'static) {
  with(|cfg| cfg.on_unhandled_error = Some(Rc::new(handler)));
}

pub fn set_stopped_notification_handler(handler: impl Fn(NotificationKind) + 'static) {
  with(|cfg| cfg.on_stopped_notification = Some(Rc::new(handler)));
}

pub fn set_max_virtual_frames_per_instant(limit: usize) {
  with(|cfg| cfg.max_virtual_frames_per_instant = limit);
}

pub fn max_virtual_frames_per_instant() -> usize { with(|cfg| cfg.max_virtual_frames_per_instant) }

/// Restore the defaults on this thread.
pub fn reset() { with(|cfg| *cfg = RxConfig::default()); }

/// Surface an error to the execution context.
///
/// # Panics
///
/// Panics when no unhandled-error handler is installed.
pub fn report_unhandled_error<E: fmt::Debug + 'static>(err: E) {
  let description = format!("{err:?}");
  // The handler is cloned out so it may itself touch the configuration.
  let handler = with(|cfg| cfg.on_unhandled_error.clone());
  match handler {
    Some(handler) => handler(UnhandledError { description, payload: Box::new(err) }),
    None => {
      tracing::error!(error = %description, "unhandled error in observable");
      panic!("unhandled error in observable: {description}");
    }
  }
}

pub(crate) fn report_stopped_notification(kind: NotificationKind) {
  let handler = with(|cfg| cfg.on_stopped_notification.clone());
  match handler {
    Some(handler) => handler(kind),
    None => tracing::trace!(?kind, "notification ignored by stopped subscriber"),
  }
}
