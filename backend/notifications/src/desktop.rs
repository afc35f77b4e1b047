//! Platform-level alerts shown outside the dashboard.

use tracing::warn;

pub trait DesktopNotifier: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}

/// Emits desktop alerts as `warn` log lines.
#[derive(Debug, Default)]
pub struct LogDesktopNotifier;

impl DesktopNotifier for LogDesktopNotifier {
    fn notify(&self, title: &str, body: &str) {
        warn!(target: "desktop", title = %title, "{body}");
    }
}

#[derive(Debug, Default)]
pub struct NoopDesktopNotifier;

impl DesktopNotifier for NoopDesktopNotifier {
    fn notify(&self, _title: &str, _body: &str) {}
}
