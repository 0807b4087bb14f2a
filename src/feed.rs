// Market data ingestion: WebSocket subscription -> normalized book snapshots
//
// Every inbound frame is a full replacement book. The feed parses it,
// runs depth normalization, stamps local receipt time and publishes the
// snapshot on a bounded channel. Malformed frames are dropped without
// touching the connection; a dropped connection is re-entered through an
// exponential backoff with jitter.

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{debug, info, warn};

use crate::config::FeedConfig;
use crate::depth;
use crate::error::{SimulatorError, SimulatorResult};
use crate::latency::{LatencyKind, LatencyTracker};
use crate::types::{OrderbookSnapshot, PriceLevel};

/// Connection state visible to observers (the UI's connected indicator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Connecting,
    Open,
    Closed,
}

/// Wire format of one feed frame: price/size pairs, bids best-first
/// descending, asks best-first ascending.
#[derive(Debug, Deserialize)]
struct FeedMessage {
    bids: Vec<(f64, f64)>,
    asks: Vec<(f64, f64)>,
}

/// Parse one feed frame and build a normalized snapshot stamped with
/// local receipt time.
pub fn process_message(text: &str) -> SimulatorResult<OrderbookSnapshot> {
    let message: FeedMessage =
        serde_json::from_str(text).map_err(|e| SimulatorError::Parse(e.to_string()))?;

    let bids: Vec<PriceLevel> = message
        .bids
        .iter()
        .map(|&(price, size)| PriceLevel::new(price, size))
        .collect();
    let asks: Vec<PriceLevel> = message
        .asks
        .iter()
        .map(|&(price, size)| PriceLevel::new(price, size))
        .collect();

    depth::build_snapshot(&bids, &asks, Utc::now().timestamp_millis())
}

/// Reconnect delay for the given attempt (1-based): exponential growth
/// from the base, capped at the max, with full jitter down to the base.
fn backoff_delay(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let exp = base_ms
        .saturating_mul(1u64 << attempt.saturating_sub(1).min(16))
        .min(max_ms);
    let jittered = if exp > base_ms {
        rand::thread_rng().gen_range(base_ms..=exp)
    } else {
        base_ms
    };
    Duration::from_millis(jittered)
}

enum LoopExit {
    /// Voluntary teardown or all consumers gone; do not reconnect.
    Shutdown,
    /// Transport error or server close; reconnect after backoff.
    Disconnected,
}

/// Owns the subscription task. `shutdown` consumes the handle, so
/// teardown runs exactly once from any state; dropping the handle
/// closes the subscription too (the shutdown channel goes away).
pub struct FeedHandle {
    shutdown_tx: watch::Sender<bool>,
    status_rx: watch::Receiver<FeedStatus>,
    task: tokio::task::JoinHandle<()>,
}

impl FeedHandle {
    pub fn status(&self) -> FeedStatus {
        *self.status_rx.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.status() == FeedStatus::Open
    }

    /// Watch the connection indicator directly.
    pub fn status_watch(&self) -> watch::Receiver<FeedStatus> {
        self.status_rx.clone()
    }

    /// Close the subscription from any state and wait for the task to
    /// finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }
}

pub struct MarketDataFeed {
    config: FeedConfig,
    latency: LatencyTracker,
    snapshot_tx: mpsc::Sender<OrderbookSnapshot>,
    status_tx: watch::Sender<FeedStatus>,
}

impl MarketDataFeed {
    /// Start the subscription task. Returns the control handle and the
    /// snapshot stream.
    pub fn spawn(
        config: FeedConfig,
        latency: LatencyTracker,
    ) -> (FeedHandle, mpsc::Receiver<OrderbookSnapshot>) {
        let (snapshot_tx, snapshot_rx) = mpsc::channel(config.channel_capacity);
        let (status_tx, status_rx) = watch::channel(FeedStatus::Connecting);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let feed = MarketDataFeed {
            config,
            latency,
            snapshot_tx,
            status_tx,
        };
        let task = tokio::spawn(feed.run(shutdown_rx));

        (
            FeedHandle {
                shutdown_tx,
                status_rx,
                task,
            },
            snapshot_rx,
        )
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let endpoint = self.config.endpoint();
        let mut attempt: u32 = 0;

        loop {
            if *shutdown.borrow() {
                break;
            }

            let _ = self.status_tx.send(FeedStatus::Connecting);
            match connect_async(&endpoint).await {
                Ok((ws_stream, _)) => {
                    attempt = 0;
                    info!(endpoint = %endpoint, "connected to market data feed");
                    let _ = self.status_tx.send(FeedStatus::Open);

                    if let LoopExit::Shutdown = self.consume(ws_stream, &mut shutdown).await {
                        break;
                    }
                }
                Err(e) => {
                    warn!(endpoint = %endpoint, error = %e, "feed connect failed");
                }
            }

            let _ = self.status_tx.send(FeedStatus::Closed);
            attempt += 1;
            let delay = backoff_delay(
                attempt,
                self.config.reconnect_base_ms,
                self.config.reconnect_max_ms,
            );
            warn!(attempt, delay_ms = delay.as_millis() as u64, "feed disconnected, reconnecting");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => break,
            }
        }

        let _ = self.status_tx.send(FeedStatus::Closed);
        info!("market data feed stopped");
    }

    async fn consume(
        &self,
        ws_stream: tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
        shutdown: &mut watch::Receiver<bool>,
    ) -> LoopExit {
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    let _ = ws_sender.send(Message::Close(None)).await;
                    return LoopExit::Shutdown;
                }
                message = ws_receiver.next() => match message {
                    Some(Ok(Message::Text(text))) => {
                        let processing_start = Instant::now();
                        match process_message(&text) {
                            Ok(snapshot) => {
                                self.latency.record(
                                    LatencyKind::DataProcessing,
                                    processing_start.elapsed().as_secs_f64() * 1000.0,
                                );
                                // Bounded channel: a slow consumer makes us
                                // wait here, in delivery order, rather than
                                // drop or reorder messages.
                                if self.snapshot_tx.send(snapshot).await.is_err() {
                                    debug!("snapshot receiver dropped, stopping feed");
                                    let _ = ws_sender.send(Message::Close(None)).await;
                                    return LoopExit::Shutdown;
                                }
                            }
                            Err(e) => {
                                // Bad frame, keep the subscription open
                                warn!(category = e.category(), error = %e, "dropping feed message");
                            }
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = ws_sender.send(Message::Pong(payload)).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        warn!("feed connection closed by server");
                        return LoopExit::Disconnected;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "feed transport error");
                        return LoopExit::Disconnected;
                    }
                    None => return LoopExit::Disconnected,
                }
            }
        }
    }
}
