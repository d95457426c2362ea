//! Stake runner (v1)
//!
//! Delegates a randomized amount of native coin from every configured account
//! to a randomly chosen validator, pacing accounts apart in time.
//!
//! # Architecture Overview
//!
//! ```text
//!   config.toml ─▶ config ─▶ lifecycle::startup ─▶ accounts + GatewayRegistry
//!                                                        │
//!                                                        ▼
//!                                              staking::StakeOrchestrator
//!                                                        │ one task per account
//!                                                        ▼
//!                    staking::StakePipeline: prepare → sign → broadcast → confirm
//!                                                        │
//!                                                        ▼
//!                                              blockchain::ChainGateway (RPC)
//!
//!   SIGINT/SIGTERM ─▶ lifecycle::signals ─▶ CancellationToken ─▶ every await point
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use stake_runner::config::load_config;
use stake_runner::lifecycle::signals::spawn_signal_handler;
use stake_runner::lifecycle::{drain, startup, Shutdown};
use stake_runner::observability::{logging, metrics};
use stake_runner::staking::{PipelineSettings, StakeOrchestrator, StakePipeline};

#[derive(Parser)]
#[command(name = "stake-runner")]
#[command(about = "Delegate native coin to validators from many accounts", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Private key file; overrides `private_keys_file` from the config.
    #[arg(short, long)]
    keys: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    logging::init_logging(&config.observability)?;

    tracing::info!(config = %cli.config.display(), "stake-runner v0.1.0 starting");

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let shutdown = Shutdown::new();
    let cancel = shutdown.token();
    spawn_signal_handler(shutdown.clone());

    let startup::Startup {
        params,
        accounts,
        registry,
        gateway,
    } = startup::prepare(&config, cli.keys.as_deref(), &cancel).await?;

    let pipeline = StakePipeline::new(gateway, PipelineSettings::from(&config));
    let mut orchestrator = StakeOrchestrator::new(pipeline, params);

    let launched = orchestrator.start(accounts, &cancel).await;
    tracing::info!(launched, "All accounts launched, waiting for outcomes");

    let grace = Duration::from_secs(config.shutdown.grace_period_secs);
    if drain(orchestrator.wait_all(), &cancel, grace).await.is_none() {
        tracing::warn!(grace_secs = grace.as_secs(), "Grace period elapsed");
        orchestrator.abandon().await;
    }

    let summary = orchestrator.stats().summary();
    tracing::info!(
        launched = summary.launched,
        succeeded = summary.succeeded,
        failed = summary.failed(),
        abandoned = summary.abandoned,
        "Run summary: {summary}"
    );

    registry.close();
    tracing::info!("Shutdown complete");
    Ok(())
}
