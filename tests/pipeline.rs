use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use feed_widget::{FeedConfig, FeedTarget, FeedWidget, InMemoryTarget};

/// Serves the same canned HTTP response to every connection, standing in
/// for the relay proxy.
async fn stub_proxy(response: String) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let response = response.clone();
            tokio::spawn(async move {
                // A single read is enough for these small GET requests.
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf).await;
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });
    addr
}

fn http_response(status: &str, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

fn widget_for(proxy: SocketAddr) -> FeedWidget<InMemoryTarget> {
    let mut config = FeedConfig::new("https://example.com/jobs/feed");
    config.proxy_url = format!("http://{proxy}/proxy");
    FeedWidget::new(config, InMemoryTarget::new())
}

#[tokio::test]
async fn http_500_collapses_to_none_in_both_report_modes() {
    let proxy = stub_proxy(http_response(
        "500 Internal Server Error",
        "text/html",
        "<html>boom</html>",
    ))
    .await;
    let widget = widget_for(proxy);

    assert!(widget.fetch_feed_json(true).await.is_none());
    assert!(widget.fetch_feed_json(false).await.is_none());
}

#[tokio::test]
async fn non_success_status_with_json_body_is_classified_as_bad_response() {
    // The body parses fine, so this must fail on the status alone.
    let proxy = stub_proxy(http_response(
        "503 Service Unavailable",
        "application/json",
        r#"{"publisher":"Acme","job":[{"title":"Engineer"}]}"#,
    ))
    .await;
    let mut widget = widget_for(proxy);

    assert!(widget.fetch_feed_json(true).await.is_none());

    widget.build_all().await;
    let status = widget.status();
    assert!(!status.json_fetched);
    assert!(!status.placed);
    assert!(status
        .error
        .as_deref()
        .unwrap()
        .contains("valid response was not returned"));
}

#[tokio::test]
async fn unreachable_proxy_collapses_to_none() {
    // Bind and immediately drop to get a port with no listener behind it.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let widget = widget_for(addr);

    assert!(widget.fetch_feed_json(false).await.is_none());
}

#[tokio::test]
async fn feed_is_fetched_rendered_and_placed() {
    let proxy = stub_proxy(http_response(
        "200 OK",
        "application/json",
        r#"{"publisher":"Acme","job":[{"title":"Engineer"}]}"#,
    ))
    .await;
    let mut widget = widget_for(proxy);

    widget.build_all().await;

    let status = widget.status();
    assert!(status.started);
    assert!(status.json_fetched);
    assert!(status.html_rendered);
    assert!(status.placed);
    assert!(status.error.is_none());

    let html = widget.target().html().unwrap();
    assert!(html.contains("<li class=\"jobs-feed-job\">"));
    assert!(html.contains("Engineer"));
    assert!(html.contains("Acme"));
}

#[tokio::test]
async fn error_flagged_payload_halts_before_render() {
    let proxy = stub_proxy(http_response(
        "200 OK",
        "application/json",
        r#"{"error": true}"#,
    ))
    .await;
    let mut widget = widget_for(proxy);

    // Pre-existing content must survive a halted run untouched.
    widget.target_mut().place("<p>previous content</p>").unwrap();
    widget.build_all().await;

    let status = widget.status();
    assert!(status.started);
    assert!(!status.json_fetched);
    assert!(!status.html_rendered);
    assert!(!status.placed);
    assert!(status.error.as_deref().unwrap().contains("no usable json"));
    assert_eq!(widget.target().html(), Some("<p>previous content</p>"));
}

#[tokio::test]
async fn detached_target_fails_placement_only() {
    let proxy = stub_proxy(http_response(
        "200 OK",
        "application/json",
        r#"{"publisher":"Acme","job":[{"title":"Engineer"}]}"#,
    ))
    .await;
    let mut widget = widget_for(proxy);

    widget.target_mut().detach();
    widget.build_all().await;

    let status = widget.status();
    assert!(status.json_fetched);
    assert!(status.html_rendered);
    assert!(!status.placed);
    assert!(status.error.as_deref().unwrap().contains("valid target"));
    assert!(widget.target().html().is_none());
}

#[tokio::test]
async fn non_json_success_body_collapses_to_none() {
    let proxy = stub_proxy(http_response("200 OK", "text/html", "<html>login</html>")).await;
    let widget = widget_for(proxy);

    assert!(widget.fetch_feed_json(true).await.is_none());
}
