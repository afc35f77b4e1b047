//! One dashboard session: a scheduler and a notification registry, built
//! once and handed to every view that needs them.

use std::sync::Arc;

use opsy_config::DashboardConfig;
use opsy_notifications::{
    DesktopNotifier, NotificationRegistry, NotificationSurface, RegistryOptions,
};
use opsy_scheduler::Scheduler;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Dashboard {
    config: DashboardConfig,
    scheduler: Scheduler,
    notifications: NotificationRegistry,
}

impl Dashboard {
    pub fn new(
        config: DashboardConfig,
        surface: Arc<dyn NotificationSurface>,
        desktop: Arc<dyn DesktopNotifier>,
    ) -> Self {
        let scheduler = Scheduler::new(config.tick_rate());
        let notifications = NotificationRegistry::new(
            surface,
            desktop,
            RegistryOptions {
                desktop: config.notifications.desktop,
                startup_grace: config.notifications.startup_grace(),
                pulse: config.notifications.pulse(),
            },
        );

        info!(
            tick_rate_ms = scheduler.tick_rate().as_millis() as u64,
            debug = config.debug,
            "Dashboard session created"
        );

        Self {
            config,
            scheduler,
            notifications,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn notifications(&self) -> &NotificationRegistry {
        &self.notifications
    }

    /// Stop the tick timer. Registered tasks and banners are kept.
    pub fn shutdown(&self) -> bool {
        self.scheduler.stop()
    }
}
