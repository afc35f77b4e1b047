//! Telemetry and structured logging for the Opsy dashboard runtime.
//!
//! Console plus rolling NDJSON file output, and the structured
//! [`DashboardEvent`] stream emitted by the scheduler and the notification
//! registry.

pub mod event_logger;
pub mod logger;

pub use event_logger::{DashboardEvent, EventLogEntry, EventLogger, EVENT_TARGET};
pub use logger::{effective_level, init_logger};
