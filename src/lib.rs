//! An embeddable job feed widget.
//!
//! Fetches a remote job feed as JSON through a relay proxy, renders it to
//! an HTML fragment with embedded templates, and places the fragment into
//! a [`FeedTarget`]. Each run tracks a [`FeedStatus`]; failures at any
//! stage are classified, logged, and swallowed rather than propagated.

pub use error::FeedError;
pub use target::{FeedTarget, FileTarget, InMemoryTarget};
pub use widget::{
    Behavior, FeedConfig, FeedPayload, FeedStatus, FeedWidget, RenderContext, DEFAULT_PROXY_URL,
};

pub mod error;
mod render;
pub mod target;
pub mod widget;
