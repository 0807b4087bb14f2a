// Core data model shared by the feed, depth normalizer and simulator
//
// Wire-facing structs serialize with the cost-model service's camelCase
// field names, so a `SimulationRequest` can be posted as-is.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw price level as received from the feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub size: f64,
}

impl PriceLevel {
    pub fn new(price: f64, size: f64) -> Self {
        Self { price, size }
    }
}

/// Book level enriched with cumulative depth and percentage-of-max.
///
/// The cost-model service calls these fields `total` and `percentage`,
/// so that is what goes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderbookLevel {
    pub price: f64,
    pub size: f64,
    #[serde(rename = "total")]
    pub cumulative_size: f64,
    #[serde(rename = "percentage")]
    pub percentage_of_max: f64,
}

/// Immutable view of the book at one feed message.
///
/// Every feed message produces a brand-new snapshot; nothing mutates a
/// shared book in place. `timestamp` is local receipt time in epoch
/// milliseconds, not the exchange's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderbookSnapshot {
    pub bids: Vec<OrderbookLevel>,
    pub asks: Vec<OrderbookLevel>,
    pub spread: f64,
    #[serde(rename = "spreadPercentage")]
    pub spread_percentage: f64,
    pub timestamp: i64,
}

impl OrderbookSnapshot {
    pub fn best_bid(&self) -> Option<&OrderbookLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&OrderbookLevel> {
        self.asks.first()
    }

    pub fn mid_price(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid.price + ask.price) / 2.0),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeTier {
    Basic,
    Standard,
    Vip,
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeTier::Basic => write!(f, "basic"),
            FeeTier::Standard => write!(f, "standard"),
            FeeTier::Vip => write!(f, "vip"),
        }
    }
}

impl FromStr for FeeTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(FeeTier::Basic),
            "standard" => Ok(FeeTier::Standard),
            "vip" => Ok(FeeTier::Vip),
            other => Err(format!("unknown fee tier: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStrategy {
    Market,
    Limit,
    Twap,
    Vwap,
}

impl fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStrategy::Market => write!(f, "market"),
            ExecutionStrategy::Limit => write!(f, "limit"),
            ExecutionStrategy::Twap => write!(f, "twap"),
            ExecutionStrategy::Vwap => write!(f, "vwap"),
        }
    }
}

impl FromStr for ExecutionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "market" => Ok(ExecutionStrategy::Market),
            "limit" => Ok(ExecutionStrategy::Limit),
            "twap" => Ok(ExecutionStrategy::Twap),
            "vwap" => Ok(ExecutionStrategy::Vwap),
            other => Err(format!("unknown execution strategy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

/// Parameters for the hypothetical trade being costed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeParameters {
    pub symbol: String,
    #[serde(rename = "orderSize")]
    pub order_size: f64,
    #[serde(rename = "feeTier")]
    pub fee_tier: FeeTier,
    #[serde(rename = "executionStrategy")]
    pub execution_strategy: ExecutionStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
}

/// One request to the cost-model service. Built fresh per call, never
/// reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub orderbook: OrderbookSnapshot,
    pub parameters: TradeParameters,
    #[serde(rename = "clientTimestamp")]
    pub client_timestamp: i64,
}

/// Server-side timing reported by the cost-model service, both in ms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyMetrics {
    #[serde(rename = "serverProcessingTime")]
    pub server_processing_time: f64,
    #[serde(rename = "totalServerTime")]
    pub total_server_time: f64,
}

/// Cost estimate returned by the cost-model service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub slippage: f64,
    #[serde(rename = "marketImpact")]
    pub market_impact: f64,
    pub fees: f64,
    #[serde(rename = "netTransactionCost")]
    pub net_transaction_cost: f64,
    #[serde(rename = "processingLatency")]
    pub processing_latency: f64,
    #[serde(rename = "makerTakerProbability")]
    pub maker_taker_probability: f64,
    #[serde(rename = "latencyMetrics")]
    pub latency_metrics: LatencyMetrics,
}
