//! Named error kinds raised by the engine and by its terminal-value operators.

use std::{error::Error, fmt::Write, time::Duration};

use thiserror::Error;

/// Type-erased error returned by fallible teardown logic.
pub type BoxError = Box<dyn Error + 'static>;

/// Aggregate of every error raised by teardowns during one `unsubscribe`.
///
/// Nested aggregates are flattened: when a child subscription fails with an
/// `UnsubscriptionError` its inner errors are merged into the parent's list
/// instead of being wrapped again.
#[derive(Debug, Error)]
#[error("{} error(s) occurred during unsubscription:{}", .errors.len(), render(.errors))]
pub struct UnsubscriptionError {
  pub errors: Vec<BoxError>,
}

fn render(errors: &[BoxError]) -> String {
  let mut out = String::new();
  for (i, err) in errors.iter().enumerate() {
    let _ = write!(out, "\n  {}) {}", i + 1, err);
  }
  out
}

impl UnsubscriptionError {
  pub fn new(errors: Vec<BoxError>) -> Self { Self { errors } }

  /// Number of teardown failures collected.
  #[inline]
  pub fn len(&self) -> usize { self.errors.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.errors.is_empty() }

  pub(crate) fn collect(err: BoxError, into: &mut Vec<BoxError>) {
    match err.downcast::<UnsubscriptionError>() {
      Ok(nested) => into.extend(nested.errors),
      Err(err) => into.push(err),
    }
  }
}

/// Raised by `first`, `last` and `single` when the source completes without
/// a value.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Default)]
#[error("no elements in sequence")]
pub struct EmptyError;

/// Raised when a sequence does not have the shape an operator requires, such
/// as a second value reaching `single`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SequenceError {
  pub message: String,
}

impl SequenceError {
  pub fn new(message: impl Into<String>) -> Self { Self { message: message.into() } }
}

/// Raised by `element_at` when the source completes before the index.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Default)]
#[error("argument out of range")]
pub struct ArgumentOutOfRangeError;

/// Library error type for pipelines that do not bring their own.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RxError {
  #[error(transparent)]
  Empty(#[from] EmptyError),
  #[error(transparent)]
  Sequence(#[from] SequenceError),
  #[error(transparent)]
  ArgumentOutOfRange(#[from] ArgumentOutOfRangeError),
  #[error("{0}")]
  Custom(String),
}

impl RxError {
  pub fn custom(message: impl Into<String>) -> Self { RxError::Custom(message.into()) }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
  /// The virtual scheduler ran more than `limit` actions at one instant in a
  /// single flush. The offending action is left queued.
  #[error("more than {limit} actions ran at virtual time {at:?} in one flush")]
  FrameLimitExceeded { at: Duration, limit: usize },
}
