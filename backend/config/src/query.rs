//! Page query-string overrides (`?tickrate=1000&debug`).

use std::collections::HashMap;

use tracing::warn;

use crate::schema::DashboardConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Key given without `=`, e.g. `debug`.
    Flag,
    Value(String),
}

/// Parsed query string. Later occurrences of a key win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: HashMap<String, QueryValue>,
}

impl QueryParams {
    /// Parse `a=1&flag&b=x+y`. A leading `?` is ignored, values are
    /// percent-decoded with `+` read as a space. Pairs with more than one `=`
    /// are treated as flags on their first segment.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = HashMap::new();

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let parts: Vec<&str> = pair.split('=').collect();
            let key = decode(parts[0]);
            let value = if parts.len() == 2 {
                QueryValue::Value(decode(parts[1]))
            } else {
                QueryValue::Flag
            };
            params.insert(key, value);
        }

        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match self.params.get(key) {
            Some(QueryValue::Value(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    /// `true` for a bare flag or a truthy value (`1`, `true`, `yes`).
    pub fn flag(&self, key: &str) -> bool {
        match self.params.get(key) {
            Some(QueryValue::Flag) => true,
            Some(QueryValue::Value(v)) => is_truthy(v),
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Apply the knobs the dashboard honours: `tickrate` and `debug`.
    pub fn apply(&self, config: &mut DashboardConfig) {
        if let Some(raw) = self.get("tickrate") {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.tick_rate_ms = ms,
                _ => warn!(tickrate = %raw, "Ignoring invalid tickrate query parameter"),
            }
        }
        if self.flag("debug") {
            config.debug = true;
        }
        if let Some(dashboard) = self.get("dashboard") {
            config.monitoring.dashboard = Some(dashboard.to_string());
        }
    }
}

pub(crate) fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_values_and_flags() {
        let q = QueryParams::parse("?tickrate=1000&debug&dashboard=east+coast%21");
        assert_eq!(q.get("tickrate"), Some("1000"));
        assert!(q.flag("debug"));
        assert_eq!(q.get("debug"), None);
        assert_eq!(q.get("dashboard"), Some("east coast!"));
        assert!(!q.flag("missing"));
    }

    #[test]
    fn empty_query() {
        assert!(QueryParams::parse("").is_empty());
        assert!(QueryParams::parse("?").is_empty());
    }

    #[test]
    fn malformed_pair_becomes_flag() {
        let q = QueryParams::parse("a=b=c");
        assert!(q.flag("a"));
        assert_eq!(q.get("a"), None);
    }

    #[test]
    fn apply_overrides_tickrate_and_debug() {
        let mut config = DashboardConfig::default();
        QueryParams::parse("tickrate=250&debug=true").apply(&mut config);
        assert_eq!(config.tick_rate_ms, 250);
        assert!(config.debug);
    }

    #[test]
    fn apply_ignores_bad_tickrate() {
        let mut config = DashboardConfig::default();
        QueryParams::parse("tickrate=fast").apply(&mut config);
        assert_eq!(config.tick_rate_ms, 5_000);
        QueryParams::parse("tickrate=0").apply(&mut config);
        assert_eq!(config.tick_rate_ms, 5_000);
    }
}
