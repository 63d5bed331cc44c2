use regex::Regex;
use serde_json::Value;

/// Pre-compiled patterns shared by the validators.
pub(crate) struct Patterns {
    feed_url: Regex,
    open_tag: Regex,
}

impl Default for Patterns {
    fn default() -> Self {
        Self {
            // Scheme optional, host is a dotted domain or an IPv4 address,
            // then optional port, path, query and fragment. A shape check
            // only; nothing is resolved or requested.
            feed_url: Regex::new(
                r"(?i)^(https?://)?(([a-z\d]([a-z\d-]*[a-z\d])*\.)+[a-z]{2,}|(\d{1,3}\.){3}\d{1,3})(:\d+)?(/[-a-z\d%_.~+]*)*(\?[;&a-z\d%_.~+=-]*)?(#[-a-z\d_]*)?$",
            )
            .unwrap(),
            open_tag: Regex::new(r"<([A-Za-z][A-Za-z0-9]*)\b[^>]*>").unwrap(),
        }
    }
}

impl Patterns {
    /// Whether the string looks like an absolute or scheme-relative URL.
    pub(crate) fn is_feed_url_valid(&self, url: &str) -> bool {
        !url.is_empty() && self.feed_url.is_match(url)
    }

    /// Whether the fragment contains at least one matched open/close tag
    /// pair. A heuristic, not a parser: nesting is not checked, and a
    /// fragment of only self-closing tags does not count.
    pub(crate) fn is_html_valid(&self, html: &str) -> bool {
        self.open_tag.captures_iter(html).any(|cap| {
            let open = cap.get(0).unwrap();
            let close = format!("</{}>", &cap[1]);
            html[open.end()..].contains(&close)
        })
    }
}

/// Whether the options bag is a JSON object with at least one key.
pub(crate) fn is_feed_params_valid(options: &Value) -> bool {
    options.as_object().is_some_and(|map| !map.is_empty())
}
