//! `opsy run`: build one dashboard session and tick until Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use opsy_config::{apply_env_overrides, load_config, log_report, validate, QueryParams};
use opsy_logging::{effective_level, init_logger};
use opsy_monitoring::{dashboard_url, register_zone_check, Dashboard, HttpZoneSource};
use opsy_notifications::{LogDesktopNotifier, LogSurface};

/// Ticks between status summaries (one minute at the default rate).
const STATUS_INTERVAL: u64 = 12;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Config file (defaults to ~/.opsy/dashboard.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base tick period in milliseconds
    #[arg(long)]
    tickrate: Option<u64>,

    /// Backend zones endpoint to health-check
    #[arg(long)]
    zones_url: Option<String>,

    /// Page-style overrides, e.g. "tickrate=1000&debug"
    #[arg(long)]
    query: Option<String>,

    /// Log every task run and notification change
    #[arg(long)]
    debug: bool,
}

pub async fn run(args: RunArgs) -> Result<()> {
    let path = crate::resolve_config_path(args.config);
    let mut config = load_config(&path).await?;
    apply_env_overrides(&mut config);

    if let Some(query) = &args.query {
        QueryParams::parse(query).apply(&mut config);
    }
    if let Some(ms) = args.tickrate {
        config.tick_rate_ms = ms;
    }
    if let Some(url) = args.zones_url {
        config.monitoring.zones_url = Some(url);
    }
    if args.debug {
        config.debug = true;
    }

    init_logger(
        &config.logging.dir,
        effective_level(&config.logging.level, config.debug),
    )
    .context("Failed to initialize logging")?;

    let report = validate(&config);
    log_report(&report);
    if !report.is_valid() {
        bail!("invalid configuration in {}", path.display());
    }

    let dashboard = Dashboard::new(
        config.clone(),
        Arc::new(LogSurface),
        Arc::new(LogDesktopNotifier),
    );

    if let Some(url) = &config.monitoring.zones_url {
        let url = dashboard_url(url, config.monitoring.dashboard.as_deref());
        info!(url = %url, every_ticks = config.monitoring.zone_check_interval, "Registering zone check");
        register_zone_check(
            &dashboard,
            Arc::new(HttpZoneSource::new(url)),
            config.monitoring.zone_check_interval,
        )?;
    }

    let notifications = dashboard.notifications().clone();
    dashboard.scheduler().register("status", STATUS_INTERVAL, move || {
        info!(
            notifications = notifications.len(),
            severity = ?notifications.aggregate(),
            "dashboard status"
        );
        Ok(())
    })?;
    dashboard.scheduler().start()?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    dashboard.shutdown();
    info!(ticks = dashboard.scheduler().tick_count(), "Dashboard stopped");
    Ok(())
}
