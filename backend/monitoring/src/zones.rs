//! Zone health check: one danger banner per unreachable backend zone.

use std::sync::Arc;

use async_trait::async_trait;
use opsy_core::{Level, OpsyError, Result};
use opsy_notifications::{NotificationRegistry, NotificationSpec};
use opsy_scheduler::{SchedulerError, TaskId, TaskOptions};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::context::Dashboard;

pub const ZONE_CHECK_SLUG: &str = "zone-check";

/// A monitoring backend zone as reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub status: String,
}

impl Zone {
    pub fn is_healthy(&self) -> bool {
        self.status == "ok"
    }

    /// Slug of this zone's outage banner.
    pub fn offline_slug(&self) -> String {
        format!("{}-offline", self.name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZonesResponse {
    pub zones: Vec<Zone>,
}

#[async_trait]
pub trait ZoneSource: Send + Sync {
    async fn fetch_zones(&self) -> Result<Vec<Zone>>;
}

/// Fetches `{"zones": [...]}` from the backend API.
#[derive(Debug, Clone)]
pub struct HttpZoneSource {
    client: reqwest::Client,
    url: String,
}

impl HttpZoneSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn fetch_error(&self, message: impl ToString) -> OpsyError {
        OpsyError::FetchError {
            url: self.url.clone(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl ZoneSource for HttpZoneSource {
    async fn fetch_zones(&self) -> Result<Vec<Zone>> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.fetch_error(e))?
            .error_for_status()
            .map_err(|e| self.fetch_error(e))?;

        let body: ZonesResponse = resp.json().await.map_err(|e| self.fetch_error(e))?;
        Ok(body.zones)
    }
}

/// Raise a banner for every unhealthy zone and clear it for healthy ones.
/// Returns the number of unhealthy zones.
pub fn apply_zone_statuses(zones: &[Zone], notifications: &NotificationRegistry) -> usize {
    let mut offline = 0;
    for zone in zones {
        if zone.is_healthy() {
            notifications.remove(&zone.offline_slug());
        } else {
            offline += 1;
            notifications.add(
                NotificationSpec::new(
                    format!("{} Poller Failure", zone.name),
                    format!("Datacenter {} is not responding!", zone.name),
                )
                .level(Level::Danger)
                .slug(zone.offline_slug()),
            );
        }
    }
    offline
}

/// Fetch zones once and update banners.
pub async fn check_zones(
    source: &dyn ZoneSource,
    notifications: &NotificationRegistry,
) -> Result<Vec<Zone>> {
    let zones = source.fetch_zones().await?;
    let offline = apply_zone_statuses(&zones, notifications);
    debug!(zones = zones.len(), offline, "zone check finished");
    Ok(zones)
}

/// Register the periodic zone check, running it once right away.
///
/// The task only spawns the fetch and returns; banners change when the
/// response arrives. A failed fetch leaves banners untouched.
pub fn register_zone_check(
    dashboard: &Dashboard,
    source: Arc<dyn ZoneSource>,
    interval: u64,
) -> std::result::Result<TaskId, SchedulerError> {
    let notifications = dashboard.notifications().clone();

    dashboard
        .scheduler()
        .register_with(ZONE_CHECK_SLUG, interval, TaskOptions::run_now(), move || {
            let runtime = Handle::try_current()
                .map_err(|_| anyhow::anyhow!("zone check needs a Tokio runtime"))?;
            let source = Arc::clone(&source);
            let notifications = notifications.clone();
            runtime.spawn(async move {
                if let Err(e) = check_zones(source.as_ref(), &notifications).await {
                    warn!(error = %e, "zone check failed");
                }
            });
            Ok(())
        })
}
