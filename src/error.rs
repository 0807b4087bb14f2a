// Unified error handling for the trade cost simulator

use crate::config::ConfigError;

/// Main error type for the simulator core.
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    /// WebSocket connect or transport fault on the market data feed.
    /// Recovered by the reconnect loop, never surfaced past the
    /// connection-status indicator.
    #[error("Feed error: {0}")]
    Feed(String),

    /// Malformed feed message. Logged and dropped; the subscription
    /// stays open.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Empty or invalid book side. Spread and percentage math would be
    /// undefined, so snapshot construction fails closed.
    #[error("Degenerate book: {bids} bid levels, {asks} ask levels")]
    DegenerateBook { bids: usize, asks: usize },

    /// Simulation call failure: non-success status, network fault or
    /// timeout. Surfaced to the caller, not retried.
    #[error("Transport error{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Transport { status: Option<u16>, message: String },

    /// The cost-model response body did not deserialize.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A newer simulation call took over the in-flight slot while this
    /// one was awaiting its response; its outcome was discarded.
    #[error("Simulation superseded by a newer request")]
    Superseded,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SimulatorError {
    /// Error category for log fields.
    pub fn category(&self) -> &'static str {
        match self {
            SimulatorError::Feed(_) => "feed",
            SimulatorError::Parse(_) => "parse",
            SimulatorError::DegenerateBook { .. } => "book",
            SimulatorError::Transport { .. } => "transport",
            SimulatorError::MalformedResponse(_) => "transport",
            SimulatorError::Superseded => "superseded",
            SimulatorError::Config(_) => "config",
        }
    }
}

pub type SimulatorResult<T> = Result<T, SimulatorError>;
