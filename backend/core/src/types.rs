use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OpsyError;

/// Severity of a notification.
///
/// Variants are declared in precedence order so `Ord` gives
/// `Danger > Warning > Info > Success`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    #[default]
    Danger,
}

impl Level {
    /// All levels, lowest precedence first.
    pub const ALL: [Level; 4] = [Level::Success, Level::Info, Level::Warning, Level::Danger];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Danger => "danger",
        }
    }

    /// CSS class used by the banner container and the badge icon.
    pub fn css_class(&self) -> String {
        format!("alert-{}", self.as_str())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = OpsyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| OpsyError::UnknownLevel(wanted.to_string()))
    }
}

/// Derive a slug from a display title: lower-cased, spaces become hyphens.
///
/// Only the space character is replaced; other whitespace and punctuation
/// are kept as-is.
pub fn slugify(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}
