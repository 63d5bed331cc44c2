use reqwest::Client;
use serde_json::{json, Value};
use tera::Tera;
use tracing::{error, info, warn};
use url::Url;

use crate::error::FeedError;
use crate::render;
use crate::target::FeedTarget;

pub use context::{FeedPayload, RenderContext};

pub mod context;
mod validate;

/// The relay endpoint used when the caller does not supply their own.
pub const DEFAULT_PROXY_URL: &str = "https://test.com/projects/xmlproxy/xmlproxy.php";

/// Optional behaviors of the widget.
///
/// Historically these were forked implementations; they are flags on a
/// single widget now. Everything defaults to on.
#[derive(Debug, Clone)]
pub struct Behavior {
    /// Run the rendered output through the tag-pair heuristic before
    /// accepting it.
    pub validate_html: bool,
    /// Re-check that the target is attached at placement time.
    pub validate_target: bool,
    /// Record a `FeedStatus` for each pipeline run.
    pub track_status: bool,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            validate_html: true,
            validate_target: true,
            track_status: true,
        }
    }
}

/// Where the feed comes from and how the widget should behave.
///
/// Immutable once the widget is constructed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// The upstream feed location, requested through the proxy.
    pub feed_url: String,
    /// The relay that performs the actual upstream request.
    pub proxy_url: String,
    /// Free-form options bag. Must be a non-empty object; `remote` is the
    /// only key the widget itself reads, the rest is passed through for
    /// template authors.
    pub options: Value,
    pub behavior: Behavior,
}

impl FeedConfig {
    pub fn new(feed_url: impl Into<String>) -> Self {
        Self {
            feed_url: feed_url.into(),
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            options: json!({ "remote": false }),
            behavior: Behavior::default(),
        }
    }
}

/// How far the most recent pipeline run got.
///
/// Flags only move forward within a run; a new run overwrites the whole
/// record.
#[derive(Debug, Clone, Default)]
pub struct FeedStatus {
    pub started: bool,
    pub json_fetched: bool,
    pub json: Option<FeedPayload>,
    pub html_rendered: bool,
    pub html: Option<String>,
    pub placed: bool,
    /// Display string of the failure that ended the run, if any.
    pub error: Option<String>,
}

/// Fetches a remote job feed, renders it, and places the result into a
/// [`FeedTarget`].
///
/// Construction is synchronous and performs no I/O; call
/// [`build_all`](Self::build_all) to run the pipeline. Failures never
/// escape the pipeline: they are logged, recorded on
/// [`status`](Self::status), and collapse the affected stage to `None`.
pub struct FeedWidget<T: FeedTarget> {
    config: FeedConfig,
    target: T,
    /// `<proxy>?url=<encoded feed url>`, computed once iff the feed URL
    /// passed the shape check.
    proxied_url: Option<Url>,
    client: Client,
    tera: Tera,
    patterns: validate::Patterns,
    status: FeedStatus,
}

impl<T: FeedTarget> FeedWidget<T> {
    pub fn new(config: FeedConfig, target: T) -> Self {
        let patterns = validate::Patterns::default();
        let proxied_url = patterns
            .is_feed_url_valid(&config.feed_url)
            .then(|| Url::parse_with_params(&config.proxy_url, &[("url", &config.feed_url)]).ok())
            .flatten();

        Self {
            config,
            target,
            proxied_url,
            client: Client::new(),
            tera: render::environment(),
            patterns,
            status: FeedStatus::default(),
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// The status of the most recent run. Empty until `build_all` has
    /// been called, or permanently when status tracking is disabled.
    pub fn status(&self) -> &FeedStatus {
        &self.status
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    /// Whether the configured feed URL passes the syntactic shape check.
    pub fn is_feed_url_valid(&self) -> bool {
        self.patterns.is_feed_url_valid(&self.config.feed_url)
    }

    /// Whether the options bag is a non-empty object.
    pub fn is_feed_params_valid(&self) -> bool {
        validate::is_feed_params_valid(&self.config.options)
    }

    /// Whether the fragment contains at least one matched tag pair.
    pub fn is_html_valid(&self, html: &str) -> bool {
        self.patterns.is_html_valid(html)
    }

    fn remote(&self) -> bool {
        self.config
            .options
            .get("remote")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Pure mapping from a fetched payload to the template context.
    pub fn build_render_context(&self, payload: &FeedPayload) -> RenderContext {
        RenderContext::from_payload(payload, self.remote())
    }

    async fn fetch_classified(&self) -> Result<FeedPayload, FeedError> {
        let Some(url) = &self.proxied_url else {
            return Err(FeedError::InvalidFeedUrl(self.config.feed_url.clone()));
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(FeedError::Connection)?;
        let status = response.status();
        let body = response.text().await.map_err(FeedError::Connection)?;

        // Parsed before the status check so that a non-JSON error page is
        // reported as a syntax problem, matching the log taxonomy.
        let payload: FeedPayload = serde_json::from_str(&body).map_err(FeedError::Parse)?;
        if !status.is_success() {
            return Err(FeedError::BadStatus(status));
        }
        if payload.is_unusable() {
            return Err(FeedError::EmptyPayload);
        }
        Ok(payload)
    }

    fn log_fetch_failure(err: &FeedError) {
        match err {
            FeedError::Parse(_) => warn!("There was a syntax error in the feed response. {err}"),
            FeedError::Connection(_) => {
                warn!("There was an issue connecting to the necessary server. {err}")
            }
            _ => warn!("The response was not ok. {err}"),
        }
    }

    /// Fetches and parses the feed through the proxy.
    ///
    /// Every failure collapses to `None`: connection trouble, a non-JSON
    /// body, a non-success status, or a payload that is empty or carries
    /// the proxy's error flag. With `report` the failure is logged with
    /// its classification; without it this is fully quiet.
    pub async fn fetch_feed_json(&self, report: bool) -> Option<FeedPayload> {
        match self.fetch_classified().await {
            Ok(payload) => Some(payload),
            Err(err) => {
                if report {
                    Self::log_fetch_failure(&err);
                }
                None
            }
        }
    }

    fn render_classified(&self, context: &RenderContext) -> Result<String, FeedError> {
        let tera_context = tera::Context::from_serialize(context).map_err(FeedError::Render)?;
        let html = self
            .tera
            .render(render::FEED_TEMPLATE, &tera_context)
            .map_err(FeedError::Render)?;
        if self.config.behavior.validate_html && !self.patterns.is_html_valid(&html) {
            return Err(FeedError::InvalidHtml);
        }
        Ok(html)
    }

    /// Renders a context into the feed fragment.
    ///
    /// Returns `None` if the template engine errors or, when
    /// `behavior.validate_html` is on, if the output fails the tag-pair
    /// heuristic. Logged iff `report`.
    pub fn render_html(&self, context: &RenderContext, report: bool) -> Option<String> {
        match self.render_classified(context) {
            Ok(html) => Some(html),
            Err(err) => {
                if report {
                    warn!("There was an error rendering the feed. {err}");
                }
                None
            }
        }
    }

    fn record_failure(&mut self, err: &FeedError) {
        if self.config.behavior.track_status {
            self.status.error = Some(err.to_string());
        }
    }

    /// Runs the whole pipeline: fetch, context, render, place.
    ///
    /// Nothing escapes to the caller. A configuration problem stops the
    /// run before any network call; a fetch failure stops it before any
    /// render; a render or placement failure leaves the target untouched.
    /// No stage is retried. Outcomes are observable through
    /// [`status`](Self::status) and the log stream.
    pub async fn build_all(&mut self) {
        if self.config.behavior.track_status {
            self.status = FeedStatus {
                started: true,
                ..FeedStatus::default()
            };
        }

        if self.proxied_url.is_none() {
            let err = FeedError::InvalidFeedUrl(self.config.feed_url.clone());
            error!("{err}");
            self.record_failure(&err);
            return;
        }
        if !self.is_feed_params_valid() {
            let err = FeedError::InvalidOptions;
            error!("{err}");
            self.record_failure(&err);
            return;
        }

        let payload = match self.fetch_classified().await {
            Ok(payload) => payload,
            Err(err) => {
                Self::log_fetch_failure(&err);
                self.record_failure(&err);
                return;
            }
        };
        if self.config.behavior.track_status {
            self.status.json_fetched = true;
            self.status.json = Some(payload.clone());
        }

        let context = self.build_render_context(&payload);
        let html = match self.render_classified(&context) {
            Ok(html) => html,
            Err(err) => {
                error!("{err}");
                self.record_failure(&err);
                return;
            }
        };
        if self.config.behavior.track_status {
            self.status.html_rendered = true;
            self.status.html = Some(html.clone());
        }

        if self.config.behavior.validate_target && !self.target.is_attached() {
            let err = FeedError::InvalidTarget;
            error!("{err}");
            self.record_failure(&err);
            return;
        }
        match self.target.place(&html) {
            Ok(()) => {
                if self.config.behavior.track_status {
                    self.status.placed = true;
                }
                info!("The feed was built and placed.");
            }
            Err(err) => {
                error!("{err}");
                self.record_failure(&err);
            }
        }
    }
}
