//! Fee quoting behind an affordability ceiling.
//!
//! # Algorithm
//! ```text
//! every poll_interval until max_wait elapses:
//!     max_fee = base_fee(head) + suggested_tip
//!     if max_fee > ceiling → warn, keep polling
//!     else                 → estimate gas, return quote
//! deadline reached → GasTimeout
//! ```
//!
//! The first check happens immediately; only an unaffordable head waits for
//! the next tick. RPC failures are returned as-is rather than retried here.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::blockchain::client::ChainGateway;
use crate::blockchain::types::{BlockchainError, BlockchainResult, CallSpec, FeeQuote};
use crate::config::FeeConfig;
use crate::observability::metrics;
use crate::resilience::timeouts::deadline_from;

/// Ceiling and timing for the fee gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeePolicy {
    /// Highest acceptable `max_fee_per_gas`, in wei.
    pub ceiling_wei: u128,
    pub poll_interval: Duration,
    pub max_wait: Duration,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            ceiling_wei: 3_000_000_000,
            poll_interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(300),
        }
    }
}

impl From<&FeeConfig> for FeePolicy {
    fn from(config: &FeeConfig) -> Self {
        Self {
            ceiling_wei: config.ceiling_wei(),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            max_wait: Duration::from_secs(config.max_wait_secs),
        }
    }
}

/// Produces affordable fee quotes from the current chain head.
pub struct FeeGate {
    gateway: Arc<dyn ChainGateway>,
    policy: FeePolicy,
}

impl FeeGate {
    pub fn new(gateway: Arc<dyn ChainGateway>, policy: FeePolicy) -> Self {
        Self { gateway, policy }
    }

    /// Wait for fees under the ceiling and quote `call` at those fees.
    pub async fn quote(&self, call: &CallSpec, cancel: &CancellationToken) -> BlockchainResult<FeeQuote> {
        let deadline = deadline_from(Instant::now(), self.policy.max_wait);
        let mut ticker = interval(self.policy.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(BlockchainError::Cancelled),
                _ = sleep_until(deadline) => {
                    tracing::warn!(
                        account = %call.from,
                        ceiling_wei = self.policy.ceiling_wei,
                        "Gave up waiting for affordable fees"
                    );
                    return Err(BlockchainError::GasTimeout {
                        ceiling_wei: self.policy.ceiling_wei,
                        waited_secs: self.policy.max_wait.as_secs(),
                    });
                }
                _ = ticker.tick() => {}
            }

            let base_fee = self.gateway.current_base_fee(cancel).await?;
            let priority_fee = self.gateway.suggested_priority_fee(cancel).await?;
            let max_fee_per_gas = base_fee.saturating_add(priority_fee);

            if max_fee_per_gas > self.policy.ceiling_wei {
                metrics::record_fee_deferral();
                tracing::warn!(
                    account = %call.from,
                    max_fee_per_gas,
                    ceiling_wei = self.policy.ceiling_wei,
                    "High gas fees, waiting for the next block"
                );
                continue;
            }

            let gas_limit = self.gateway.estimate_gas(call, cancel).await?;
            tracing::debug!(
                account = %call.from,
                base_fee,
                priority_fee,
                max_fee_per_gas,
                gas_limit,
                "Fee quote ready"
            );
            return Ok(FeeQuote {
                gas_limit,
                priority_fee_per_gas: priority_fee,
                max_fee_per_gas,
            });
        }
    }
}
