//! Receipt polling until finality.
//!
//! # States
//! ```text
//! Pending → Succeeded   receipt status == 1
//! Pending → Reverted    receipt with any other status
//! Pending → TimedOut    no receipt before the deadline
//! ```
//!
//! Lagging nodes answer "not found" for fresh transactions; that and any
//! other polling error keeps the transaction Pending. A timeout is reported
//! once and never re-polled.

use alloy::primitives::TxHash;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::blockchain::client::ChainGateway;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ConfirmationStatus};
use crate::config::ConfirmationConfig;
use crate::resilience::timeouts::deadline_from;

/// Error fragments meaning "the node has not seen it yet".
const NOT_YET_VISIBLE: &[&str] = &["not found", "unknown block", "free tier limits"];

fn is_not_yet_visible(err: &BlockchainError) -> bool {
    match err {
        BlockchainError::Rpc(message) => {
            let lower = message.to_ascii_lowercase();
            NOT_YET_VISIBLE.iter().any(|m| lower.contains(m))
        }
        _ => false,
    }
}

/// Polling cadence and deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for WatchPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            timeout: Duration::from_secs(60),
        }
    }
}

impl From<&ConfirmationConfig> for WatchPolicy {
    fn from(config: &ConfirmationConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Waits for transaction receipts.
pub struct ConfirmationWatcher {
    gateway: Arc<dyn ChainGateway>,
    policy: WatchPolicy,
}

impl ConfirmationWatcher {
    pub fn new(gateway: Arc<dyn ChainGateway>, policy: WatchPolicy) -> Self {
        Self { gateway, policy }
    }

    /// Poll for the receipt of `tx_hash`.
    ///
    /// The first poll happens one interval after the call. Only cancellation
    /// is returned as an error; every other ending is a [`ConfirmationStatus`].
    pub async fn watch(&self, tx_hash: TxHash, cancel: &CancellationToken) -> BlockchainResult<ConfirmationStatus> {
        let started = Instant::now();
        let deadline = deadline_from(started, self.policy.timeout);
        let first_poll = deadline_from(started, self.policy.poll_interval);
        let mut ticker = interval_at(first_poll, self.policy.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(BlockchainError::Cancelled),
                _ = sleep_until(deadline) => {
                    tracing::warn!(
                        tx_hash = %tx_hash,
                        timeout_secs = self.policy.timeout.as_secs(),
                        "Transaction not confirmed in time"
                    );
                    return Ok(ConfirmationStatus::TimedOut);
                }
                _ = ticker.tick() => {}
            }

            match self.gateway.receipt(tx_hash, cancel).await {
                Ok(Some(receipt)) if receipt.success => {
                    return Ok(ConfirmationStatus::Succeeded {
                        block_number: receipt.block_number,
                    });
                }
                Ok(Some(receipt)) => {
                    return Ok(ConfirmationStatus::Reverted {
                        block_number: receipt.block_number,
                    });
                }
                Ok(None) => {
                    tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                }
                Err(BlockchainError::Cancelled) => return Err(BlockchainError::Cancelled),
                Err(e) if is_not_yet_visible(&e) => {
                    tracing::debug!(tx_hash = %tx_hash, error = %e, "Receipt not visible yet");
                }
                Err(e) => {
                    tracing::warn!(tx_hash = %tx_hash, error = %e, "Error getting transaction receipt");
                }
            }
        }
    }
}
