use chrono::{DateTime, Utc};
use opsy_core::{slugify, Level};
use serde::{Deserialize, Serialize};

/// A displayed alert banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub slug: String,
    pub title: String,
    pub content: String,
    pub level: Level,
    pub dismissable: bool,
    pub created_at: DateTime<Utc>,
}

/// Request to raise a notification.
///
/// Defaults: level `danger`, slug derived from the title, dismissable, and a
/// desktop alert when the registry allows one.
#[derive(Debug, Clone)]
pub struct NotificationSpec {
    pub title: String,
    pub content: String,
    pub level: Level,
    pub slug: Option<String>,
    pub dismissable: bool,
    pub desktop: bool,
}

impl NotificationSpec {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            level: Level::default(),
            slug: None,
            dismissable: true,
            desktop: true,
        }
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn dismissable(mut self, dismissable: bool) -> Self {
        self.dismissable = dismissable;
        self
    }

    pub fn desktop(mut self, desktop: bool) -> Self {
        self.desktop = desktop;
        self
    }

    /// The explicit slug, or one derived from the title.
    pub fn resolved_slug(&self) -> String {
        match &self.slug {
            Some(slug) => slug.clone(),
            None => slugify(&self.title),
        }
    }

    pub(crate) fn into_notification(self) -> Notification {
        Notification {
            slug: self.resolved_slug(),
            title: self.title,
            content: self.content,
            level: self.level,
            dismissable: self.dismissable,
            created_at: Utc::now(),
        }
    }
}
