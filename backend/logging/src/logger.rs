//! Structured Logger
//!
//! Wraps `tracing` to provide console output, a JSON file layer with daily
//! rotation (NDJSON), and environment-based level control.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Resolve the level to log at. The `debug` flag (query string or config)
/// forces `debug` regardless of the configured level.
pub fn effective_level(configured: &str, debug: bool) -> &str {
    if debug {
        "debug"
    } else {
        configured
    }
}

/// Install the global subscriber: console output plus NDJSON files in
/// `log_dir` (`opsy.log.YYYY-MM-DD`).
///
/// `RUST_LOG` wins over `level` when set. Fails when `log_dir` cannot be
/// created or written. A second successful call keeps the first subscriber.
pub fn init_logger<P: AsRef<Path>>(log_dir: P, level: &str) -> Result<()> {
    let log_dir = log_dir.as_ref();
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("opsy.log")
        .build(log_dir)
        .with_context(|| format!("cannot write logs to {}", log_dir.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().json().with_writer(file_appender).with_ansi(false));

    if registry.try_init().is_err() {
        tracing::debug!("global subscriber already installed");
    }
    Ok(())
}
