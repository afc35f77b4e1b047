use thiserror::Error;

/// Errors returned by the scheduler.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// Intervals are counted in ticks and must be at least one.
    #[error("invalid interval for task '{slug}': {interval} (must be >= 1)")]
    InvalidInterval { slug: String, interval: u64 },

    #[error("task slug cannot be empty")]
    EmptySlug,

    /// The shared timer needs a Tokio runtime to spawn onto.
    #[error("no Tokio runtime available to drive the tick timer")]
    NoRuntime,
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
