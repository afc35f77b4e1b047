//! Config validation with field paths in every message.

use crate::schema::DashboardConfig;
use thiserror::Error;

/// Tick rates below this make every cadence suspiciously fast.
const MIN_SENSIBLE_TICK_RATE_MS: u64 = 100;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// All errors and warnings found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &DashboardConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_tick_rate(config, &mut report);
    validate_monitoring(config, &mut report);
    validate_logging(config, &mut report);
    report
}

/// Emit every warning and error of a report through `tracing`.
pub fn log_report(report: &ValidationReport) {
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
}

fn validate_tick_rate(config: &DashboardConfig, report: &mut ValidationReport) {
    if config.tick_rate_ms == 0 {
        report.error("tick_rate_ms", "Tick rate must be greater than zero");
    } else if config.tick_rate_ms < MIN_SENSIBLE_TICK_RATE_MS {
        report.warn(
            "tick_rate_ms",
            format!("Tick rate of {}ms will poll the backend very often", config.tick_rate_ms),
        );
    }
}

fn validate_monitoring(config: &DashboardConfig, report: &mut ValidationReport) {
    let monitoring = &config.monitoring;
    if monitoring.zone_check_interval == 0 {
        report.error("monitoring.zone_check_interval", "Interval must be at least 1 tick");
    }
    match &monitoring.zones_url {
        Some(raw) => match url::Url::parse(raw) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => report.error(
                "monitoring.zones_url",
                format!("Unsupported scheme '{}' in {raw}", parsed.scheme()),
            ),
            Err(e) => report.error("monitoring.zones_url", format!("Invalid URL '{raw}': {e}")),
        },
        None => report.warn("monitoring.zones_url", "No zones URL; zone health checks disabled"),
    }
}

fn validate_logging(config: &DashboardConfig, report: &mut ValidationReport) {
    const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
    if !LEVELS.contains(&config.logging.level.to_ascii_lowercase().as_str()) {
        report.warn(
            "logging.level",
            format!("Unknown level '{}', will be parsed as a filter directive", config.logging.level),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_with_a_warning() {
        let report = validate(&DashboardConfig::default());
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].path, "monitoring.zones_url");
    }

    #[test]
    fn zero_tick_rate_and_interval_are_errors() {
        let mut config = DashboardConfig::default();
        config.tick_rate_ms = 0;
        config.monitoring.zone_check_interval = 0;
        let report = validate(&config);
        assert!(!report.is_valid());
        let paths: Vec<&str> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["tick_rate_ms", "monitoring.zone_check_interval"]);
    }

    #[test]
    fn bad_zones_url() {
        let mut config = DashboardConfig::default();
        config.monitoring.zones_url = Some("ftp://zones".into());
        let report = validate(&config);
        assert!(report.errors[0].to_string().contains("monitoring.zones_url"));
        assert!(report.errors[0].message.contains("ftp"));
    }

    #[test]
    fn malformed_zones_urls_are_errors() {
        for raw in ["http://", "http://exa mple.com/zones", "https://:99999/x", "zones"] {
            let mut config = DashboardConfig::default();
            config.monitoring.zones_url = Some(raw.into());
            let report = validate(&config);
            assert!(!report.is_valid(), "{raw} should be rejected");
            assert_eq!(report.errors[0].path, "monitoring.zones_url");
        }
    }

    #[test]
    fn fast_tick_rate_warns() {
        let mut config = DashboardConfig::default();
        config.tick_rate_ms = 10;
        config.monitoring.zones_url = Some("http://localhost/zones".into());
        let report = validate(&config);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].path, "tick_rate_ms");
    }
}
