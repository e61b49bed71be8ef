//! Popup content

use crate::config::Config;

/// Render the popup HTML: place name, address, tagline and a directions link
/// that opens in a new browsing context.
pub fn render(config: &Config) -> String {
    format!(
        concat!(
            r#"<div class="p-2 max-w-xs">"#,
            r#"<h3 class="font-semibold text-stone-800">{title}</h3>"#,
            r#"<p class="text-sm text-stone-600 mt-1">{address}</p>"#,
            r#"<p class="text-sm text-stone-600">{tagline}</p>"#,
            r#"<div class="mt-2">"#,
            r#"<a href="{url}" target="_blank" rel="noopener noreferrer" "#,
            r#"class="text-yellow-600 hover:text-yellow-700 text-sm font-medium">Get Directions →</a>"#,
            r#"</div></div>"#
        ),
        title = escape(&config.location.title),
        address = escape(&config.location.address),
        tagline = escape(&config.location.tagline),
        url = escape(&config.directions_url()),
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

    #[test]
    fn test_default_content() {
        let html = render(&Config::default());

        assert!(html.contains(">Artisan Bakery</h3>"));
        assert!(html.contains(">123 Bakery Street</p>"));
        assert!(html.contains(">Fresh bread daily</p>"));
        assert!(html.contains(r#"href="https://maps.google.com?q=48.8566,2.3522""#));
        assert!(html.contains(r#"target="_blank""#));
        assert!(html.contains("Get Directions"));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut config = Config::default();
        config.location.title = "Bread & <Butter>".to_string();

        let html = render(&config);
        assert!(html.contains("Bread &amp; &lt;Butter&gt;"));
        assert!(!html.contains("<Butter>"));
    }
}
