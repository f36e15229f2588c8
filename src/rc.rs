//! Shared-ownership cell used for per-subscription operator state.
//!
//! The engine is single-threaded, so mutable state an operator keeps for one
//! subscription lives behind an `Rc<RefCell<_>>`. Callers must drop the guard
//! before calling into an observer: synchronous reentrancy is a legal call
//! pattern and would otherwise hit a double borrow.

use std::{
  cell::{RefCell, RefMut},
  rc::Rc,
};

pub(crate) struct MutRc<T>(Rc<RefCell<T>>);

impl<T> MutRc<T> {
  pub fn own(t: T) -> Self { Self(Rc::new(RefCell::new(t))) }

  #[inline]
  pub fn rc_deref_mut(&self) -> RefMut<'_, T> { self.0.borrow_mut() }

  /// Take the value out, leaving the default behind.
  pub fn take(&self) -> T
  where
    T: Default,
  {
    std::mem::take(&mut *self.0.borrow_mut())
  }
}

impl<T> Clone for MutRc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}
