//! Banner markup for the notification container.

use crate::notification::Notification;

/// DOM id of a banner.
fn fragment_id(slug: &str) -> String {
    format!("notification-{slug}")
}

/// Render one banner as an appendable markup fragment.
pub fn render_fragment(notification: &Notification) -> String {
    format!(
        "<div id=\"{id}\" class=\"notification-item alert {class}\"><h4 class=\"item-title\">{title}</h4><p class=\"item-info\">{content}</p></div>",
        id = escape_html(&fragment_id(&notification.slug)),
        class = notification.level.css_class(),
        title = escape_html(&notification.title),
        content = escape_html(&notification.content),
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationSpec;
    use opsy_core::Level;

    #[test]
    fn fragment_carries_id_level_and_text() {
        let n = NotificationSpec::new("us-east Poller Failure", "Datacenter us-east is not responding!")
            .slug("us-east-offline")
            .level(Level::Warning)
            .into_notification();
        let html = render_fragment(&n);
        assert!(html.starts_with("<div id=\"notification-us-east-offline\""));
        assert!(html.contains("class=\"notification-item alert alert-warning\""));
        assert!(html.contains("<h4 class=\"item-title\">us-east Poller Failure</h4>"));
        assert!(html.contains("<p class=\"item-info\">Datacenter us-east is not responding!</p>"));
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(escape_html("<b>\"x\" & 'y'</b>"), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;");
    }
}
