//! Operators: each one is an inherent method on
//! [`Observable`](crate::observable::Observable) built with
//! [`lift`](crate::observable::Observable::lift).

pub mod buffer_time;
pub mod element_at;
pub mod filter;
pub mod finalize;
pub mod first;
pub mod last;
pub mod map;
pub mod materialize;
pub mod merge_all;
pub(crate) mod merge_internals;
pub mod merge_map;
pub mod single;
pub mod take;
pub mod tap;

pub use buffer_time::BufferTimeConfig;
