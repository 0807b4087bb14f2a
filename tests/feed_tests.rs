// Feed integration: real WebSocket server in-process

mod common;

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::Message;
use trade_cost_simulator::{FeedStatus, LatencyTracker, MarketDataFeed};

const GOOD_FRAME: &str =
    r#"{"bids": [[100.0, 1.0], [99.0, 2.0]], "asks": [[101.0, 1.0], [102.0, 2.0]]}"#;
const BAD_FRAME: &str = "{definitely not json";

async fn serve_frames(listener: TcpListener, frames: Vec<&'static str>) {
    let (stream, _) = listener.accept().await.expect("accept");
    let mut ws = tokio_tungstenite::accept_async(stream).await.expect("handshake");
    for frame in frames {
        ws.send(Message::Text(frame.to_string())).await.expect("send frame");
    }
    let _ = ws.send(Message::Close(None)).await;
    // Listener drops here, so reconnect attempts are refused
}

fn test_feed_config(port: u16) -> trade_cost_simulator::FeedConfig {
    let mut feed = common::create_test_config().feed;
    feed.ws_url = format!("ws://127.0.0.1:{}", port);
    feed.symbol = "BTC-TEST".to_string();
    feed.reconnect_base_ms = 50;
    feed.reconnect_max_ms = 100;
    feed
}

#[tokio::test]
async fn test_malformed_frame_does_not_break_the_stream() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let server = tokio::spawn(serve_frames(
        listener,
        vec![GOOD_FRAME, BAD_FRAME, GOOD_FRAME],
    ));

    let latency = LatencyTracker::new(64);
    let (feed, mut snapshots) = MarketDataFeed::spawn(test_feed_config(port), latency.clone());

    let first = timeout(Duration::from_secs(5), snapshots.recv())
        .await
        .expect("first snapshot in time")
        .expect("stream open");
    let second = timeout(Duration::from_secs(5), snapshots.recv())
        .await
        .expect("second snapshot in time")
        .expect("stream open");

    // Exactly the two valid frames were published
    assert!((first.spread - 1.0).abs() < 1e-9);
    assert_eq!(second.bids.len(), 2);
    assert!(second.timestamp >= first.timestamp);
    assert!(
        timeout(Duration::from_millis(300), snapshots.recv())
            .await
            .is_err(),
        "no third snapshot should arrive"
    );

    // Each published snapshot contributed a data-processing sample
    assert_eq!(latency.snapshot().data_processing_samples, 2);

    server.await.expect("server task");
    timeout(Duration::from_secs(5), feed.shutdown())
        .await
        .expect("shutdown in time");
}

#[tokio::test]
async fn test_status_reaches_open_then_closed_after_shutdown() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = tokio_tungstenite::accept_async(stream).await.expect("handshake");
        ws.send(Message::Text(GOOD_FRAME.to_string())).await.expect("send");
        // Hold the connection open until the client goes away
        while ws.next().await.is_some() {}
    });

    let (feed, mut snapshots) = MarketDataFeed::spawn(test_feed_config(port), LatencyTracker::new(8));
    let mut status = feed.status_watch();

    timeout(Duration::from_secs(5), snapshots.recv())
        .await
        .expect("snapshot in time")
        .expect("stream open");

    // By the time a snapshot arrived the feed had marked itself open
    while *status.borrow() != FeedStatus::Open {
        timeout(Duration::from_secs(1), status.changed())
            .await
            .expect("status change in time")
            .expect("status channel open");
    }

    timeout(Duration::from_secs(5), feed.shutdown())
        .await
        .expect("shutdown in time");
    assert_eq!(*status.borrow(), FeedStatus::Closed);
}

#[tokio::test]
async fn test_feed_reconnects_after_server_drop() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let port = addr.port();

    // First connection: one frame, then drop. Second connection: one more.
    tokio::spawn(async move {
        for _ in 0..2 {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut ws = tokio_tungstenite::accept_async(stream).await.expect("handshake");
            ws.send(Message::Text(GOOD_FRAME.to_string())).await.expect("send");
            let _ = ws.send(Message::Close(None)).await;
        }
    });

    let (feed, mut snapshots) = MarketDataFeed::spawn(test_feed_config(port), LatencyTracker::new(8));

    timeout(Duration::from_secs(5), snapshots.recv())
        .await
        .expect("first connection snapshot")
        .expect("stream open");
    // A second snapshot can only come from a successful reconnect
    timeout(Duration::from_secs(5), snapshots.recv())
        .await
        .expect("post-reconnect snapshot")
        .expect("stream open");

    timeout(Duration::from_secs(5), feed.shutdown())
        .await
        .expect("shutdown in time");
}
