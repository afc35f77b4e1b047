//! `opsy-notifications` — the alert banner registry.
//!
//! At most one notification exists per slug; adding an existing slug is a
//! no-op. Every change recomputes the aggregate severity (the highest level
//! present) and pushes it to the [`NotificationSurface`] badge.

pub mod desktop;
pub mod markup;
pub mod notification;
pub mod registry;
pub mod surface;

pub use desktop::{DesktopNotifier, LogDesktopNotifier, NoopDesktopNotifier};
pub use markup::render_fragment;
pub use notification::{Notification, NotificationSpec};
pub use registry::{NotificationRegistry, RegistryOptions};
pub use surface::{HtmlContainer, LogSurface, NotificationSurface};
