// Configuration management for the trade cost simulator

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub ws_url: String,
    pub symbol: String,
    pub channel_capacity: usize,   // Bounded snapshot channel (backpressure)
    pub reconnect_base_ms: u64,    // First backoff delay after a disconnect
    pub reconnect_max_ms: u64,     // Backoff ceiling
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            ws_url: "wss://ws.gomarket-cpp.goquant.io/ws/l2-orderbook/okx".to_string(),
            symbol: "BTC-USDT-SWAP".to_string(),
            channel_capacity: 64,
            reconnect_base_ms: 500,
            reconnect_max_ms: 30_000,
        }
    }
}

impl FeedConfig {
    /// Full subscription endpoint; the symbol is addressed in the URL
    /// path, so no subscribe message is sent after connecting.
    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.ws_url.trim_end_matches('/'), self.symbol)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,   // Bounds a hung cost-model call
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyConfig {
    pub sample_capacity: usize,    // Ring buffer size per latency kind
    pub report_interval_secs: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            sample_capacity: 1024,
            report_interval_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub enable_snapshot_logging: bool,
    pub enable_latency_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_snapshot_logging: false,
            enable_latency_logging: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulatorConfig {
    pub feed: FeedConfig,
    pub simulation: SimulationConfig,
    pub latency: LatencyConfig,
    pub logging: LoggingConfig,
}

impl SimulatorConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(e.to_string()))?;

        let config: SimulatorConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, content)
            .map_err(|e| ConfigError::FileWrite(e.to_string()))?;

        Ok(())
    }

    /// Load configuration from file, or create default if file doesn't exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            let config = Self::default();
            config.to_file(&path)?;
            tracing::info!("Created default config file: {}", path.as_ref().display());
            Ok(config)
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.ws_url.is_empty() {
            return Err(ConfigError::Validation("feed.ws_url must not be empty".to_string()));
        }

        if self.feed.symbol.is_empty() {
            return Err(ConfigError::Validation("feed.symbol must not be empty".to_string()));
        }

        if self.feed.channel_capacity == 0 {
            return Err(ConfigError::Validation("feed.channel_capacity must be greater than 0".to_string()));
        }

        if self.feed.reconnect_base_ms == 0 {
            return Err(ConfigError::Validation("feed.reconnect_base_ms must be greater than 0".to_string()));
        }

        if self.feed.reconnect_max_ms < self.feed.reconnect_base_ms {
            return Err(ConfigError::Validation("feed.reconnect_max_ms must be >= feed.reconnect_base_ms".to_string()));
        }

        if self.simulation.base_url.is_empty() {
            return Err(ConfigError::Validation("simulation.base_url must not be empty".to_string()));
        }

        if self.simulation.request_timeout_ms == 0 {
            return Err(ConfigError::Validation("simulation.request_timeout_ms must be greater than 0".to_string()));
        }

        if self.latency.sample_capacity == 0 {
            return Err(ConfigError::Validation("latency.sample_capacity must be greater than 0".to_string()));
        }

        if self.latency.report_interval_secs == 0 {
            return Err(ConfigError::Validation("latency.report_interval_secs must be greater than 0".to_string()));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(String),

    #[error("Failed to write config file: {0}")]
    FileWrite(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
