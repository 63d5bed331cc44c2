use anyhow::Context;
use serde::Deserialize;
use tokio::task::JoinSet;
use tracing::{error, info};
use validator::Validate;

use feed_widget::{FeedConfig, FeedWidget, FileTarget, DEFAULT_PROXY_URL};

#[derive(Deserialize, Validate)]
struct Config {
    /// The relay endpoint that performs the upstream requests.
    #[validate(url)]
    proxy_url: Option<String>,
    #[validate]
    feeds: Vec<FeedEntry>,
}

#[derive(Deserialize, Validate)]
struct FeedEntry {
    /// The upstream job feed to fetch.
    #[validate(length(min = 1))]
    feed_url: String,
    /// Where the rendered fragment is written.
    #[validate(length(min = 1))]
    target_file: String,
    /// Marks the feed as remote-friendly in the rendered output.
    #[serde(default)]
    remote: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = std::fs::read_to_string("config.toml").context("Could not read config.toml")?;
    let config: Config = toml::from_str(&config)?;
    config.validate().context("config.toml failed validation")?;
    let proxy_url = config
        .proxy_url
        .unwrap_or_else(|| DEFAULT_PROXY_URL.to_string());

    let mut build_tasks = JoinSet::new();
    for entry in config.feeds {
        let mut feed_config = FeedConfig::new(entry.feed_url.as_str());
        feed_config.proxy_url = proxy_url.clone();
        feed_config.options = serde_json::json!({ "remote": entry.remote });

        build_tasks.spawn(async move {
            let mut widget = FeedWidget::new(feed_config, FileTarget::new(&entry.target_file));
            widget.build_all().await;
            if widget.status().placed {
                info!(
                    "{} written from {}",
                    widget.target().path().display(),
                    entry.feed_url
                );
            } else {
                error!(
                    "{} was not built: {}",
                    entry.feed_url,
                    widget
                        .status()
                        .error
                        .as_deref()
                        .unwrap_or("no error was recorded")
                );
            }
            widget.status().placed
        });
    }

    let mut all_placed = true;
    while let Some(result) = build_tasks.join_next().await {
        all_placed &= result?;
    }

    if !all_placed {
        anyhow::bail!("Some feeds could not be built");
    }
    println!("Feeds built successfully!");
    Ok(())
}
