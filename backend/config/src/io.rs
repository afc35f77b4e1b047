//! Config file read/write and environment overrides.

use crate::query::is_truthy;
use crate::schema::DashboardConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "dashboard.yaml";

pub const ENV_CONFIG_DIR: &str = "OPSY_CONFIG_DIR";
pub const ENV_TICKRATE: &str = "OPSY_TICKRATE";
pub const ENV_DEBUG: &str = "OPSY_DEBUG";
pub const ENV_ZONES_URL: &str = "OPSY_ZONES_URL";

/// Resolve the config directory: `OPSY_CONFIG_DIR` env > `~/.opsy/`.
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".opsy"),
        None => PathBuf::from(".opsy"),
    }
}

pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist.
pub async fn load_config(path: &Path) -> Result<DashboardConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(DashboardConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: DashboardConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Write config to disk atomically (write to temp file, rename). The
/// previous file, if any, is kept as `dashboard.yaml.bak`.
pub async fn write_config(config: &DashboardConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.with_context(|| {
            format!("Failed to create config directory: {}", parent.display())
        })?;
    }

    if path.exists() {
        let bak = path.with_extension("yaml.bak");
        if let Err(e) = fs::copy(path, &bak).await {
            warn!("Failed to create backup {}: {}", bak.display(), e);
        }
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;

    let tmp_path = path.with_extension("yaml.tmp");
    fs::write(&tmp_path, yaml.as_bytes())
        .await
        .with_context(|| format!("Failed to write temp config: {}", tmp_path.display()))?;

    fs::rename(&tmp_path, path).await.with_context(|| {
        format!("Failed to rename temp config to: {}", path.display())
    })?;

    info!(path = %path.display(), "Wrote config");
    Ok(())
}

/// Apply `OPSY_TICKRATE`, `OPSY_DEBUG` and `OPSY_ZONES_URL`.
pub fn apply_env_overrides(config: &mut DashboardConfig) {
    apply_env_overrides_with(config, |key| std::env::var(key).ok());
}

/// Same as [`apply_env_overrides`] with an explicit lookup (useful for testing).
pub fn apply_env_overrides_with<F>(config: &mut DashboardConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(ENV_TICKRATE) {
        match raw.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => config.tick_rate_ms = ms,
            _ => warn!(var = ENV_TICKRATE, value = %raw, "Ignoring invalid tick rate override"),
        }
    }
    if let Some(raw) = lookup(ENV_DEBUG) {
        config.debug = is_truthy(&raw);
    }
    if let Some(url) = lookup(ENV_ZONES_URL).filter(|u| !u.trim().is_empty()) {
        config.monitoring.zones_url = Some(url);
    }
}
