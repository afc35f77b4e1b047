/// Append the `dashboard` filter to an API URL, if one is selected.
pub fn dashboard_url(url: &str, dashboard: Option<&str>) -> String {
    match dashboard.filter(|d| !d.is_empty()) {
        Some(dash) => {
            let separator = if url.contains('?') { '&' } else { '?' };
            format!("{url}{separator}dashboard={}", urlencoding::encode(dash))
        }
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_dashboard_leaves_url_alone() {
        assert_eq!(dashboard_url("/api/zones", None), "/api/zones");
        assert_eq!(dashboard_url("/api/zones", Some("")), "/api/zones");
    }

    #[test]
    fn picks_the_right_separator() {
        assert_eq!(dashboard_url("/api/events", Some("ops")), "/api/events?dashboard=ops");
        assert_eq!(
            dashboard_url("/api/events?truncate=100", Some("ops")),
            "/api/events?truncate=100&dashboard=ops"
        );
    }

    #[test]
    fn encodes_the_name() {
        assert_eq!(dashboard_url("/z", Some("east coast")), "/z?dashboard=east%20coast");
    }
}
