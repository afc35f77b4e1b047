//! `opsy-config` — dashboard runtime configuration.
//!
//! Provides:
//! - Typed config schema with documented defaults
//! - YAML read/write
//! - `OPSY_*` environment overrides
//! - Page query-string overrides (`tickrate`, `debug`, `dashboard`)
//! - Validation with field paths

pub mod io;
pub mod query;
pub mod schema;
pub mod validation;

pub use io::{
    apply_env_overrides, apply_env_overrides_with, config_dir, config_file_path, load_config,
    write_config,
};
pub use query::{QueryParams, QueryValue};
pub use schema::{DashboardConfig, LoggingConfig, MonitoringConfig, NotificationsConfig};
pub use validation::{log_report, validate, ConfigValidationError, ValidationReport};
