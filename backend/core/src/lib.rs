//! `opsy-core` — types shared by the scheduler, the notification registry
//! and the monitoring views.

pub mod error;
pub mod types;

pub use error::{OpsyError, Result};
pub use types::{slugify, Level};
