// Simulation orchestration: book state + trade parameters -> cost estimate
//
// The transport is an injected trait so the orchestrator runs against a
// stub in tests. The real client POSTs to the cost-model service over
// HTTP with a bounded request timeout; there is no retry and no queueing.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{SimulatorError, SimulatorResult};
use crate::latency::{LatencyKind, LatencyTracker};
use crate::types::{OrderbookSnapshot, SimulationRequest, SimulationResult, TradeParameters};

/// Transport seam to the external cost-model service: submit one
/// request, get a result or a failure.
#[async_trait]
pub trait CostModelApi: Send + Sync {
    async fn simulate(&self, request: &SimulationRequest) -> SimulatorResult<SimulationResult>;
}

/// HTTP client for the cost-model service.
#[derive(Debug, Clone)]
pub struct HttpCostModelClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCostModelClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> SimulatorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| SimulatorError::Transport {
                status: None,
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn simulate_url(&self) -> String {
        format!("{}/simulate", self.base_url)
    }
}

#[async_trait]
impl CostModelApi for HttpCostModelClient {
    async fn simulate(&self, request: &SimulationRequest) -> SimulatorResult<SimulationResult> {
        let response = self
            .client
            .post(self.simulate_url())
            .json(request)
            .send()
            .await
            .map_err(|e| SimulatorError::Transport {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SimulatorError::Transport {
                status: Some(status.as_u16()),
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    body
                },
            });
        }

        response
            .json::<SimulationResult>()
            .await
            .map_err(|e| SimulatorError::MalformedResponse(e.to_string()))
    }
}

/// Single-slot in-flight token. A new call overwrites the slot; a call
/// that comes back to find someone else's id there was superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InFlightState {
    Idle,
    InFlight(Uuid),
    Completed,
}

/// Dispatches simulation requests and feeds the latency tracker.
pub struct SimulationOrchestrator<C: CostModelApi> {
    client: C,
    latency: LatencyTracker,
    in_flight: Arc<Mutex<InFlightState>>,
}

impl<C: CostModelApi> SimulationOrchestrator<C> {
    pub fn new(client: C, latency: LatencyTracker) -> Self {
        Self {
            client,
            latency,
            in_flight: Arc::new(Mutex::new(InFlightState::Idle)),
        }
    }

    pub fn in_flight(&self) -> InFlightState {
        *self.in_flight.lock().unwrap()
    }

    /// Run one simulation against the current book.
    ///
    /// The request build is recorded as a data-processing sample. The
    /// dispatch-to-response wall time is recorded as an end-to-end
    /// sample only when the call succeeds; failed or superseded calls
    /// leave the sample log and the caller's stored result untouched.
    pub async fn run_simulation(
        &self,
        snapshot: &OrderbookSnapshot,
        parameters: &TradeParameters,
    ) -> SimulatorResult<SimulationResult> {
        let build_start = Instant::now();
        let request = SimulationRequest {
            orderbook: snapshot.clone(),
            parameters: parameters.clone(),
            client_timestamp: Utc::now().timestamp_millis(),
        };
        self.latency.record(
            LatencyKind::DataProcessing,
            duration_ms(build_start.elapsed()),
        );

        let request_id = Uuid::new_v4();
        {
            let mut slot = self.in_flight.lock().unwrap();
            if let InFlightState::InFlight(stale) = *slot {
                warn!(stale_id = %stale, "superseding in-flight simulation request");
            }
            *slot = InFlightState::InFlight(request_id);
        }
        debug!(request_id = %request_id, symbol = %parameters.symbol, "dispatching simulation request");

        let dispatch_start = Instant::now();
        let outcome = self.client.simulate(&request).await;

        let mut slot = self.in_flight.lock().unwrap();
        if *slot != InFlightState::InFlight(request_id) {
            // A newer call owns the slot now; this outcome is stale.
            drop(slot);
            return Err(SimulatorError::Superseded);
        }

        match outcome {
            Ok(result) => {
                *slot = InFlightState::Completed;
                drop(slot);
                self.latency.record(
                    LatencyKind::EndToEnd,
                    duration_ms(dispatch_start.elapsed()),
                );
                Ok(result)
            }
            Err(e) => {
                *slot = InFlightState::Idle;
                drop(slot);
                Err(e)
            }
        }
    }
}

fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
