// Trade Cost Simulator Library
//
// Real-time order book ingestion and simulation orchestration: consumes a
// streaming L2 feed, derives cumulative depth, dispatches cost-estimate
// requests to a remote cost-model service and aggregates latency across
// the processing, network and UI-commit stages.

pub mod config;
pub mod depth;
pub mod error;
pub mod feed;
pub mod latency;
pub mod simulator;
pub mod types;

// Re-export the core data model
pub use types::{
    ExecutionStrategy, FeeTier, LatencyMetrics, OrderbookLevel, OrderbookSnapshot, PriceLevel,
    SimulationRequest, SimulationResult, TradeParameters, Urgency,
};

// Re-export error types
pub use error::{SimulatorError, SimulatorResult};

// Re-export the feed
pub use feed::{FeedHandle, FeedStatus, MarketDataFeed};

// Re-export the orchestrator
pub use simulator::{CostModelApi, HttpCostModelClient, InFlightState, SimulationOrchestrator};

// Re-export latency aggregation
pub use latency::{LatencyKind, LatencySnapshot, LatencyTracker};

// Re-export configuration
pub use config::{
    ConfigError, FeedConfig, LatencyConfig, LoggingConfig, SimulationConfig, SimulatorConfig,
};
