use reqwest::StatusCode;

/// Everything that can cut a feed build short.
///
/// The public pipeline methods collapse these to `None` rather than
/// propagating them; the classified kind survives in the status record
/// and in the log output.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("the feed url failed the shape check: {0:?}")]
    InvalidFeedUrl(String),
    #[error("the feed options must be a non-empty object")]
    InvalidOptions,
    #[error("there was an issue connecting to the proxy server: {0}")]
    Connection(#[source] reqwest::Error),
    #[error("a valid response was not returned from the proxy: {0}")]
    BadStatus(StatusCode),
    #[error("the response body was not valid json: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("no usable json was returned, the feed was empty or flagged an error")]
    EmptyPayload,
    #[error("there was an error rendering the feed: {0}")]
    Render(#[source] tera::Error),
    #[error("invalid html has been used to build the feed")]
    InvalidHtml,
    #[error("a valid target has not been provided")]
    InvalidTarget,
    #[error("the target could not be written: {0}")]
    Placement(String),
}
