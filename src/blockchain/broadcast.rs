//! Transaction broadcast with bounded retry.
//!
//! Retries resend the exact same signed bytes, so the nonce and hash never
//! change between attempts. The call returns as soon as a node accepts the
//! transaction; confirmation is a separate step.

use alloy::primitives::TxHash;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::blockchain::client::ChainGateway;
use crate::blockchain::types::{BlockchainError, BlockchainResult, SignedTransaction};
use crate::observability::metrics;
use crate::resilience::retries::{classify_submit_error, ErrorClass, RetryPolicy};
use crate::resilience::timeouts::cancellable_sleep;

/// Submits signed transactions.
pub struct Broadcaster {
    gateway: Arc<dyn ChainGateway>,
    policy: RetryPolicy,
}

impl Broadcaster {
    pub fn new(gateway: Arc<dyn ChainGateway>, policy: RetryPolicy) -> Self {
        Self { gateway, policy }
    }

    /// Submit `tx`, retrying transient failures up to the policy's budget.
    ///
    /// # Errors
    /// - [`BlockchainError::BroadcastRejected`] on the first terminal error
    /// - [`BlockchainError::BroadcastExhausted`] wrapping the last transient
    ///   error once every attempt has failed
    /// - [`BlockchainError::Cancelled`] if the run is cancelled mid-way
    pub async fn broadcast(&self, tx: &SignedTransaction, cancel: &CancellationToken) -> BlockchainResult<TxHash> {
        let max_attempts = self.policy.max_attempts;
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            let err = match self.gateway.submit(tx, cancel).await {
                Ok(hash) => {
                    metrics::record_broadcast_attempt("accepted");
                    return Ok(hash);
                }
                Err(BlockchainError::Cancelled) => return Err(BlockchainError::Cancelled),
                Err(e) => e,
            };

            if classify_submit_error(&err) == ErrorClass::Terminal {
                metrics::record_broadcast_attempt("rejected");
                tracing::error!(
                    tx_hash = %tx.hash,
                    nonce = tx.nonce,
                    attempt,
                    error = %err,
                    "Broadcast rejected"
                );
                return Err(BlockchainError::BroadcastRejected {
                    attempt,
                    reason: err.to_string(),
                });
            }

            metrics::record_broadcast_attempt("transient");
            tracing::warn!(
                tx_hash = %tx.hash,
                nonce = tx.nonce,
                attempt,
                max_attempts,
                error = %err,
                "Broadcast attempt failed"
            );
            last_error = Some(err);

            if attempt < max_attempts {
                cancellable_sleep(self.policy.backoff, cancel).await?;
            }
        }

        Err(BlockchainError::BroadcastExhausted {
            attempts: max_attempts,
            source: Box::new(
                last_error.unwrap_or_else(|| BlockchainError::Rpc("no broadcast attempts allowed".to_string())),
            ),
        })
    }
}
