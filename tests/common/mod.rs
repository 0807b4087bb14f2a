// Common test utilities and helpers

use trade_cost_simulator::{
    ExecutionStrategy, FeeTier, OrderbookSnapshot, PriceLevel, SimulatorConfig, TradeParameters,
};

/// Create a test configuration with sensible defaults
pub fn create_test_config() -> SimulatorConfig {
    let mut config = SimulatorConfig::default();
    config.feed.ws_url = "wss://ws.example.com/l2-orderbook/okx".to_string();
    config.feed.symbol = "BTC-USDT-SWAP".to_string();
    config.feed.channel_capacity = 8;
    config.simulation.base_url = "http://127.0.0.1:8000".to_string();
    config.simulation.request_timeout_ms = 1_000;
    config.latency.sample_capacity = 64;
    config.logging.enable_snapshot_logging = false;
    config
}

/// Trade parameters used across the integration tests
pub fn create_test_parameters() -> TradeParameters {
    TradeParameters {
        symbol: "BTC-USDT-SWAP".to_string(),
        order_size: 100.0,
        fee_tier: FeeTier::Standard,
        execution_strategy: ExecutionStrategy::Market,
        volatility: Some(0.02),
        urgency: None,
    }
}

/// Small two-level book used as a worked example across tests
pub fn worked_example_sides() -> (Vec<PriceLevel>, Vec<PriceLevel>) {
    (
        vec![PriceLevel::new(100.0, 1.0), PriceLevel::new(99.0, 2.0)],
        vec![PriceLevel::new(101.0, 1.0), PriceLevel::new(102.0, 2.0)],
    )
}

/// A normalized snapshot built from the worked example
pub fn worked_example_snapshot() -> OrderbookSnapshot {
    let (bids, asks) = worked_example_sides();
    trade_cost_simulator::depth::build_snapshot(&bids, &asks, 1_700_000_000_000)
        .expect("worked example must build")
}

/// JSON body the cost-model service returns for a successful call
pub fn simulation_response_body() -> &'static str {
    r#"{
        "slippage": 0.12,
        "marketImpact": 0.034,
        "fees": 0.1,
        "netTransactionCost": 0.254,
        "processingLatency": 1.8,
        "makerTakerProbability": 0.57,
        "latencyMetrics": {
            "serverProcessingTime": 1.8,
            "totalServerTime": 12.4
        }
    }"#
}
