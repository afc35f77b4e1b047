//! Dashboard Event Logger
//!
//! Structured scheduler and notification events, routed through `tracing`
//! on the [`EVENT_TARGET`] target so they land in the NDJSON file layer.

use chrono::{DateTime, Utc};
use opsy_core::Level;
use serde::Serialize;
use tracing::{debug, warn};

/// `tracing` target for dashboard events.
pub const EVENT_TARGET: &str = "dashboard_events";

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    TaskRegistered {
        slug: String,
        interval: u64,
    },
    TaskRan {
        slug: String,
        tick: u64,
    },
    TaskFailed {
        slug: String,
        tick: u64,
        error_msg: String,
    },
    TaskRemoved {
        slug: String,
    },
    NotificationAdded {
        slug: String,
        level: Level,
    },
    NotificationRemoved {
        slug: String,
    },
}

impl DashboardEvent {
    fn is_failure(&self) -> bool {
        matches!(self, DashboardEvent::TaskFailed { .. })
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub timestamp: DateTime<Utc>,
    pub event: DashboardEvent,
}

impl EventLogEntry {
    pub fn new(event: DashboardEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }

    /// NDJSON line for this entry.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

pub struct EventLogger;

impl EventLogger {
    /// Emit a dashboard event. Failures are logged at `warn`, everything
    /// else at `debug` (visible with `?debug`).
    pub fn log_event(event: DashboardEvent) {
        let failed = event.is_failure();
        let entry = EventLogEntry::new(event);
        let json = entry.to_json();

        if failed {
            warn!(target: EVENT_TARGET, event = %json, "dashboard event");
        } else {
            debug!(target: EVENT_TARGET, event = %json, "dashboard event");
        }
    }
}
