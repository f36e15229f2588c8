//! # rxcore: a push-based reactive runtime
//!
//! Observables are lazy producers of values. Subscribing runs the producer
//! with a [`Subscriber`](subscriber::Subscriber) that enforces the observer
//! grammar: any number of `next` calls, then at most one `error` or
//! `complete`, after which nothing more is delivered and every resource tied
//! to the subscription is released exactly once.
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! observable::from_iter::<_, ()>(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe(|v| println!("Value: {}", v));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | Lazy, re-executable producer with `lift`/`pipe` composition |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Subscription`] | Idempotent handle owning teardown logic |
//! | [`Scheduler`] | Runs delayed, cancellable, self-rescheduling work |
//!
//! Everything runs on one thread. Time-based operators take a scheduler
//! explicitly: [`VirtualTimeScheduler`] for deterministic tests,
//! [`TrampolineScheduler`] for synchronous queueing and, with the
//! `tokio-scheduler` feature (default), `LocalScheduler` for real time
//! inside a tokio `LocalSet`.
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subscription`]: subscription::Subscription
//! [`Scheduler`]: scheduler::Scheduler
//! [`VirtualTimeScheduler`]: scheduler::VirtualTimeScheduler
//! [`TrampolineScheduler`]: scheduler::TrampolineScheduler

pub mod config;
pub mod error;
pub mod notification;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
mod rc;
pub mod scheduler;
pub mod subscriber;
pub mod subscription;

pub use prelude::*;
