//! Notification registry: one banner per slug, aggregate severity, startup
//! grace for desktop alerts.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use opsy_core::Level;
use opsy_logging::{DashboardEvent, EventLogger};
use tracing::debug;

use crate::desktop::DesktopNotifier;
use crate::notification::{Notification, NotificationSpec};
use crate::surface::NotificationSurface;

/// Desktop alerts are suppressed for this long after the registry is created.
pub const DEFAULT_STARTUP_GRACE: Duration = Duration::from_secs(1);

/// How long the badge stays highlighted after a new banner.
pub const DEFAULT_PULSE: Duration = Duration::from_millis(1_100);

#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// Master switch for desktop alerts.
    pub desktop: bool,
    pub startup_grace: Duration,
    pub pulse: Duration,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            desktop: true,
            startup_grace: DEFAULT_STARTUP_GRACE,
            pulse: DEFAULT_PULSE,
        }
    }
}

#[derive(Default)]
struct State {
    items: Vec<Notification>,
    aggregate: Option<Level>,
}

impl State {
    fn position(&self, slug: &str) -> Option<usize> {
        self.items.iter().position(|n| n.slug == slug)
    }

    fn recompute(&mut self) {
        self.aggregate = self.items.iter().map(|n| n.level).max();
    }
}

struct Inner {
    state: Mutex<State>,
    surface: Arc<dyn NotificationSurface>,
    desktop: Arc<dyn DesktopNotifier>,
    options: RegistryOptions,
    started_at: Instant,
}

/// Cheaply cloneable handle to one session's notification set.
#[derive(Clone)]
pub struct NotificationRegistry {
    inner: Arc<Inner>,
}

impl NotificationRegistry {
    pub fn new(
        surface: Arc<dyn NotificationSurface>,
        desktop: Arc<dyn DesktopNotifier>,
        options: RegistryOptions,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                surface,
                desktop,
                options,
                started_at: Instant::now(),
            }),
        }
    }

    /// Show a banner unless one with the same slug is already present.
    ///
    /// Returns `true` when a banner was created, `false` for the idempotent
    /// no-op.
    pub fn add(&self, spec: NotificationSpec) -> bool {
        let wants_desktop = spec.desktop;
        let notification = spec.into_notification();
        let slug = notification.slug.clone();
        let level = notification.level;

        {
            let mut state = self.state();
            if state.position(&slug).is_some() {
                debug!(slug = %slug, "notification already present");
                return false;
            }

            debug!(slug = %slug, "adding notification");
            self.inner.surface.render(&notification);
            state.items.push(notification.clone());
            state.recompute();
            self.inner
                .surface
                .update_badge(state.items.len(), state.aggregate);
            self.inner.surface.pulse(self.inner.options.pulse);
        }

        if wants_desktop && self.desktop_allowed() {
            self.inner
                .desktop
                .notify(&notification.title, &notification.content);
        }

        EventLogger::log_event(DashboardEvent::NotificationAdded { slug, level });
        true
    }

    /// Take a banner down. Returns whether one was present.
    pub fn remove(&self, slug: &str) -> bool {
        {
            let mut state = self.state();
            let Some(idx) = state.position(slug) else {
                return false;
            };

            debug!(slug = %slug, "removing notification");
            state.items.remove(idx);
            state.recompute();
            self.inner.surface.remove(slug);
            self.inner
                .surface
                .update_badge(state.items.len(), state.aggregate);
        }

        EventLogger::log_event(DashboardEvent::NotificationRemoved {
            slug: slug.to_string(),
        });
        true
    }

    /// User clicked a banner. Only dismissable banners go away.
    pub fn dismiss(&self, slug: &str) -> bool {
        let dismissable = self
            .state()
            .items
            .iter()
            .find(|n| n.slug == slug)
            .is_some_and(|n| n.dismissable);

        if !dismissable {
            debug!(slug = %slug, "dismiss ignored");
            return false;
        }
        self.remove(slug)
    }

    /// Highest level among present banners, `None` when empty.
    pub fn aggregate(&self) -> Option<Level> {
        self.state().aggregate
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.state().position(slug).is_some()
    }

    pub fn get(&self, slug: &str) -> Option<Notification> {
        let state = self.state();
        state.position(slug).map(|idx| state.items[idx].clone())
    }

    /// Present banners, oldest first.
    pub fn list(&self) -> Vec<Notification> {
        self.state().items.clone()
    }

    pub fn len(&self) -> usize {
        self.state().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().items.is_empty()
    }

    fn desktop_allowed(&self) -> bool {
        self.inner.options.desktop
            && self.inner.started_at.elapsed() >= self.inner.options.startup_grace
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for NotificationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("NotificationRegistry")
            .field("slugs", &state.items.iter().map(|n| &n.slug).collect::<Vec<_>>())
            .field("aggregate", &state.aggregate)
            .field("options", &self.inner.options)
            .finish()
    }
}
