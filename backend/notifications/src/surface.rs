//! Where banners are shown.
//!
//! The registry only needs to render a banner, take one away, refresh the
//! count/severity badge and run the attention pulse. Implementations must
//! not call back into the registry.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use opsy_core::Level;
use tracing::{debug, info};

use crate::markup::render_fragment;
use crate::notification::Notification;

pub trait NotificationSurface: Send + Sync {
    fn render(&self, notification: &Notification);

    fn remove(&self, slug: &str);

    /// `severity` is `None` once the last banner is gone.
    fn update_badge(&self, count: usize, severity: Option<Level>);

    /// One-shot attention highlight lasting `duration`.
    fn pulse(&self, duration: Duration);
}

/// Headless surface that only logs.
#[derive(Debug, Default)]
pub struct LogSurface;

impl NotificationSurface for LogSurface {
    fn render(&self, notification: &Notification) {
        info!(
            slug = %notification.slug,
            level = %notification.level,
            title = %notification.title,
            "{}",
            notification.content
        );
    }

    fn remove(&self, slug: &str) {
        info!(slug = %slug, "notification cleared");
    }

    fn update_badge(&self, count: usize, severity: Option<Level>) {
        debug!(count, severity = ?severity, "notification badge updated");
    }

    fn pulse(&self, _duration: Duration) {}
}

#[derive(Debug, Default)]
struct ContainerState {
    fragments: Vec<(String, String)>,
    count: usize,
    severity: Option<Level>,
    pulse_until: Option<Instant>,
}

/// In-memory notification container: ordered banner fragments plus badge
/// state, ready to be served as markup.
#[derive(Debug, Default)]
pub struct HtmlContainer {
    state: Mutex<ContainerState>,
}

impl HtmlContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// All banners, oldest first.
    pub fn markup(&self) -> String {
        self.state()
            .fragments
            .iter()
            .map(|(_, html)| html.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn slugs(&self) -> Vec<String> {
        self.state().fragments.iter().map(|(slug, _)| slug.clone()).collect()
    }

    pub fn badge_count(&self) -> usize {
        self.state().count
    }

    /// Class on the badge icon, e.g. `alert-danger`.
    pub fn badge_class(&self) -> Option<String> {
        self.state().severity.map(|level| level.css_class())
    }

    pub fn is_pulsing(&self) -> bool {
        self.state()
            .pulse_until
            .is_some_and(|until| Instant::now() < until)
    }

    fn state(&self) -> MutexGuard<'_, ContainerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NotificationSurface for HtmlContainer {
    fn render(&self, notification: &Notification) {
        let html = render_fragment(notification);
        self.state()
            .fragments
            .push((notification.slug.clone(), html));
    }

    fn remove(&self, slug: &str) {
        self.state().fragments.retain(|(s, _)| s != slug);
    }

    fn update_badge(&self, count: usize, severity: Option<Level>) {
        let mut state = self.state();
        state.count = count;
        state.severity = severity;
    }

    fn pulse(&self, duration: Duration) {
        self.state().pulse_until = Some(Instant::now() + duration);
    }
}
