//! Typed dashboard configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default base tick period.
pub const DEFAULT_TICK_RATE_MS: u64 = 5_000;

/// Default zone health check cadence, in ticks (30 s at the default rate).
pub const DEFAULT_ZONE_CHECK_INTERVAL: u64 = 6;

pub const DEFAULT_STARTUP_GRACE_MS: u64 = 1_000;

pub const DEFAULT_PULSE_MS: u64 = 1_100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base tick period in milliseconds.
    pub tick_rate_ms: u64,
    /// Verbose logging of every task run and notification change.
    pub debug: bool,
    pub notifications: NotificationsConfig,
    pub monitoring: MonitoringConfig,
    pub logging: LoggingConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
            debug: false,
            notifications: NotificationsConfig::default(),
            monitoring: MonitoringConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Emit desktop alerts for new banners.
    pub desktop: bool,
    /// Desktop alerts are suppressed this long after startup.
    pub startup_grace_ms: u64,
    /// Badge highlight duration after a new banner.
    pub pulse_ms: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            desktop: true,
            startup_grace_ms: DEFAULT_STARTUP_GRACE_MS,
            pulse_ms: DEFAULT_PULSE_MS,
        }
    }
}

impl NotificationsConfig {
    pub fn startup_grace(&self) -> Duration {
        Duration::from_millis(self.startup_grace_ms)
    }

    pub fn pulse(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Backend endpoint returning `{"zones": [...]}`. No zone check without it.
    pub zones_url: Option<String>,
    pub zone_check_interval: u64,
    /// Named dashboard filter appended to API URLs.
    pub dashboard: Option<String>,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            zones_url: None,
            zone_check_interval: DEFAULT_ZONE_CHECK_INTERVAL,
            dashboard: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: DashboardConfig = serde_yaml::from_str(
            "tick_rate_ms: 1000\nmonitoring:\n  zones_url: http://localhost:5000/api/monitoring/zones\n",
        )
        .unwrap();
        assert_eq!(config.tick_rate(), Duration::from_secs(1));
        assert_eq!(config.monitoring.zone_check_interval, DEFAULT_ZONE_CHECK_INTERVAL);
        assert_eq!(config.notifications, NotificationsConfig::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn empty_document_is_default() {
        let config: DashboardConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.tick_rate_ms, 5_000);
        assert_eq!(config.notifications.pulse(), Duration::from_millis(1_100));
    }
}
