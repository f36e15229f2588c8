//! Reified observer events.

use crate::observer::Observer;

/// One event of a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification<T, E> {
  Next(T),
  Error(E),
  Complete,
}

/// Which of the three observer methods an event targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
  Next,
  Error,
  Complete,
}

impl<T, E> Notification<T, E> {
  pub fn kind(&self) -> NotificationKind {
    match self {
      Notification::Next(_) => NotificationKind::Next,
      Notification::Error(_) => NotificationKind::Error,
      Notification::Complete => NotificationKind::Complete,
    }
  }

  /// Deliver this event to `observer`.
  pub fn observe<O>(self, observer: &O)
  where
    O: Observer<T, E> + ?Sized,
  {
    match self {
      Notification::Next(v) => observer.next(v),
      Notification::Error(e) => observer.error(e),
      Notification::Complete => observer.complete(),
    }
  }

  #[inline]
  pub fn is_terminal(&self) -> bool { !matches!(self, Notification::Next(_)) }
}
