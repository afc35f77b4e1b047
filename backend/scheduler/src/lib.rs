//! `opsy-scheduler` — one timer, many periodic tasks.
//!
//! Intervals are expressed in ticks of a shared base period (5 s by
//! default), so "every 30 seconds" is "every 6 ticks". A task with interval
//! `n` runs whenever the tick counter is a multiple of `n`.

pub mod error;
pub mod scheduler;
pub mod task;

pub use error::{Result, SchedulerError};
pub use scheduler::{Scheduler, TickReport, DEFAULT_TICK_RATE};
pub use task::{TaskFn, TaskId, TaskOptions};
