// Trade Cost Simulator - headless runner
// Streams the order book, runs periodic cost simulations and reports
// latency averages.

use clap::{Parser, Subcommand};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use trade_cost_simulator::{
    ExecutionStrategy, FeeTier, HttpCostModelClient, LatencyKind, LatencyTracker, MarketDataFeed,
    OrderbookSnapshot, SimulationOrchestrator, SimulationResult, SimulatorConfig, TradeParameters,
};

#[derive(Parser)]
#[command(name = "simulator")]
#[command(version = "0.1.0")]
#[command(about = "Real-time trade cost simulator", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Stream the book and run simulations
    Run {
        /// Hypothetical order size
        #[arg(long, default_value = "100.0")]
        order_size: f64,

        /// Fee tier: basic, standard or vip
        #[arg(long, default_value = "standard")]
        fee_tier: FeeTier,

        /// Execution strategy: market, limit, twap or vwap
        #[arg(long, default_value = "market")]
        strategy: ExecutionStrategy,

        /// Run a simulation every N snapshots
        #[arg(long, default_value = "10")]
        simulate_every: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging first (before config load so we can see config errors)
    let log_level = if cli.verbose { "debug" } else { "info" };
    std::env::set_var("RUST_LOG", log_level);
    tracing_subscriber::fmt::init();

    match cli.command {
        Commands::Init { force } => {
            if std::path::Path::new(&cli.config).exists() && !force {
                warn!("Config file {} already exists (use --force to overwrite)", cli.config);
                return Ok(());
            }
            let config = SimulatorConfig::default();
            config.to_file(&cli.config)?;
            info!("📁 Wrote default config to {}", cli.config);
            Ok(())
        }
        Commands::Run {
            order_size,
            fee_tier,
            strategy,
            simulate_every,
        } => {
            if order_size <= 0.0 {
                return Err("order size must be positive".into());
            }
            let config = SimulatorConfig::load_or_create(&cli.config)?;
            run(config, order_size, fee_tier, strategy, simulate_every.max(1)).await
        }
    }
}

async fn run(
    config: SimulatorConfig,
    order_size: f64,
    fee_tier: FeeTier,
    strategy: ExecutionStrategy,
    simulate_every: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("🚀 Starting trade cost simulator");
    info!(
        "📡 Feed: {} / cost model: {}",
        config.feed.endpoint(),
        config.simulation.base_url
    );

    let latency = LatencyTracker::new(config.latency.sample_capacity);
    let client = HttpCostModelClient::new(
        &config.simulation.base_url,
        Duration::from_millis(config.simulation.request_timeout_ms),
    )?;
    let orchestrator = SimulationOrchestrator::new(client, latency.clone());

    let parameters = TradeParameters {
        symbol: config.feed.symbol.clone(),
        order_size,
        fee_tier,
        execution_strategy: strategy,
        volatility: None,
        urgency: None,
    };

    let (feed, mut snapshots) = MarketDataFeed::spawn(config.feed.clone(), latency.clone());

    let mut latest_snapshot: Option<OrderbookSnapshot> = None;
    let mut latest_result: Option<SimulationResult> = None;
    let mut snapshot_count: u64 = 0;
    let mut last_report = Instant::now();
    let report_interval = Duration::from_secs(config.latency.report_interval_secs);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
            snapshot = snapshots.recv() => {
                let Some(snapshot) = snapshot else {
                    warn!("Snapshot stream ended");
                    break;
                };

                // The "UI" here is our latest-snapshot bookkeeping; its
                // commit duration is the UI-update stage sample.
                let commit_start = Instant::now();
                if config.logging.enable_snapshot_logging {
                    info!(
                        "Book update: {} bids / {} asks, spread {:.4} ({:.4}%)",
                        snapshot.bids.len(),
                        snapshot.asks.len(),
                        snapshot.spread,
                        snapshot.spread_percentage
                    );
                }
                latest_snapshot = Some(snapshot);
                snapshot_count += 1;
                latency.record(
                    LatencyKind::UiUpdate,
                    commit_start.elapsed().as_secs_f64() * 1000.0,
                );

                if snapshot_count % simulate_every == 0 {
                    if let Some(snapshot) = &latest_snapshot {
                        match orchestrator.run_simulation(snapshot, &parameters).await {
                            Ok(result) => {
                                info!(
                                    "Cost estimate: slippage {:.4}% impact {:.4}% fees {:.4} net {:.4} (maker/taker {:.2}, server {:.2}ms)",
                                    result.slippage,
                                    result.market_impact,
                                    result.fees,
                                    result.net_transaction_cost,
                                    result.maker_taker_probability,
                                    result.latency_metrics.server_processing_time
                                );
                                latest_result = Some(result);
                            }
                            Err(e) => {
                                // Keep the previous result on failure
                                error!(category = e.category(), "Simulation failed: {}", e);
                            }
                        }
                    }
                }

                if config.logging.enable_latency_logging && last_report.elapsed() >= report_interval {
                    let report = latency.snapshot();
                    info!(
                        "Latency averages: processing {:.3}ms ({} samples), ui {:.3}ms ({}), end-to-end {:.2}ms ({}); connected: {}",
                        report.avg_data_processing_ms,
                        report.data_processing_samples,
                        report.avg_ui_update_ms,
                        report.ui_update_samples,
                        report.avg_end_to_end_ms,
                        report.end_to_end_samples,
                        feed.is_connected()
                    );
                    last_report = Instant::now();
                }
            }
        }
    }

    feed.shutdown().await;
    if let Some(result) = latest_result {
        info!(
            "Last estimate before shutdown: net transaction cost {:.4}",
            result.net_transaction_cost
        );
    }
    Ok(())
}
