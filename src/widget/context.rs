use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The JSON body the proxy relays back.
///
/// Every field is optional on the wire; parsing is explicit rather than
/// duck-typed, so an unexpected shape fails at the deserialization
/// boundary instead of deep in the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeedPayload {
    pub publisher: Option<String>,
    #[serde(rename = "publisherurl")]
    pub publisher_url: Option<String>,
    #[serde(rename = "lastBuildDate")]
    pub last_build_date: Option<String>,
    /// The job listings themselves. Kept as raw JSON since the proxy does
    /// not guarantee a shape beyond "something the template can loop over".
    #[serde(rename = "job")]
    pub jobs: Option<Value>,
    /// Set by the proxy when the upstream fetch failed on its side.
    #[serde(default)]
    pub error: bool,
}

impl FeedPayload {
    /// True when nothing usable came back: no fields at all, or the
    /// proxy's own error flag is raised.
    pub fn is_unusable(&self) -> bool {
        self.error
            || (self.publisher.is_none()
                && self.publisher_url.is_none()
                && self.last_build_date.is_none()
                && self.jobs.is_none())
    }
}

/// The context handed to the template engine.
///
/// Fields absent from the payload are omitted outright rather than
/// defaulted, so the templates can distinguish "not provided" from
/// "provided but empty".
#[derive(Debug, Clone, Serialize)]
pub struct RenderContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_build_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<Value>,
    pub remote: bool,
}

impl RenderContext {
    /// Pure mapping from payload to template context. `remote` is carried
    /// from the widget options, not from the feed.
    pub fn from_payload(payload: &FeedPayload, remote: bool) -> Self {
        Self {
            publisher: payload.publisher.clone(),
            publisher_url: payload.publisher_url.clone(),
            last_build_date: payload.last_build_date.clone(),
            jobs: payload.jobs.clone(),
            remote,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_names_map_onto_context_names() {
        let payload: FeedPayload = serde_json::from_value(json!({
            "publisher": "P",
            "publisherurl": "https://p.example.com",
            "lastBuildDate": "Mon, 01 Jan 2024 00:00:00 GMT",
            "job": [{"id": 1}],
        }))
        .unwrap();

        let context = RenderContext::from_payload(&payload, true);
        assert_eq!(context.publisher.as_deref(), Some("P"));
        assert_eq!(context.publisher_url.as_deref(), Some("https://p.example.com"));
        assert_eq!(context.jobs, Some(json!([{"id": 1}])));
        assert!(context.remote);
    }

    #[test]
    fn absent_fields_are_omitted_not_defaulted() {
        let payload: FeedPayload =
            serde_json::from_value(json!({"publisher": "P", "job": [{"id": 1}]})).unwrap();
        let context = RenderContext::from_payload(&payload, false);

        let serialized = serde_json::to_value(&context).unwrap();
        let map = serialized.as_object().unwrap();
        assert_eq!(map.get("publisher"), Some(&json!("P")));
        assert_eq!(map.get("jobs"), Some(&json!([{"id": 1}])));
        assert!(!map.contains_key("publisher_url"));
        assert!(!map.contains_key("last_build_date"));
        assert_eq!(map.get("remote"), Some(&json!(false)));
    }

    #[test]
    fn error_flag_or_empty_body_is_unusable() {
        let flagged: FeedPayload = serde_json::from_value(json!({
            "publisher": "P",
            "error": true,
        }))
        .unwrap();
        assert!(flagged.is_unusable());

        let empty: FeedPayload = serde_json::from_value(json!({})).unwrap();
        assert!(empty.is_unusable());

        let usable: FeedPayload = serde_json::from_value(json!({"job": []})).unwrap();
        assert!(!usable.is_unusable());
    }
}
