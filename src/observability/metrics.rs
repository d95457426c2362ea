//! Run metrics.
//!
//! # Metrics
//! - `stake_fee_deferrals_total` (counter): fee checks over the ceiling
//! - `stake_broadcast_attempts_total` (counter): submissions by `result`
//!   (`accepted`, `transient`, `rejected`)
//! - `stake_outcomes_total` (counter): terminal outcomes by `status`
//! - `stake_accounts_launched_total` (counter): accounts dispatched

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

use crate::staking::types::OutcomeStatus;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(listen: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(listen).install()?;
    tracing::info!(address = %listen, "Metrics endpoint listening");
    Ok(())
}

pub fn record_fee_deferral() {
    metrics::counter!("stake_fee_deferrals_total").increment(1);
}

pub fn record_broadcast_attempt(result: &'static str) {
    metrics::counter!("stake_broadcast_attempts_total", "result" => result).increment(1);
}

pub fn record_launch() {
    metrics::counter!("stake_accounts_launched_total").increment(1);
}

pub fn record_outcome(status: OutcomeStatus) {
    metrics::counter!("stake_outcomes_total", "status" => status.as_str()).increment(1);
}
