//! Retry policy for transaction broadcast.
//!
//! # Responsibilities
//! - Decide whether a submission error is worth retrying
//! - Hold the attempt budget and fixed backoff between attempts
//!
//! # Design Decisions
//! - Terminal: the node judged the transaction itself (nonce, funds,
//!   encoding, duplicates). Resending identical bytes gets the same answer.
//! - Transient: everything else (network, timeouts, overloaded node)
//! - Cancellation is never retried

use std::time::Duration;

use crate::blockchain::types::BlockchainError;
use crate::config::BroadcastConfig;

/// Node error fragments that mark a submission as permanently rejected.
const TERMINAL_MARKERS: &[&str] = &[
    "nonce too low",
    "nonce too high",
    "already known",
    "known transaction",
    "insufficient funds",
    "replacement transaction underpriced",
    "intrinsic gas too low",
    "exceeds block gas limit",
    "invalid sender",
    "invalid chain id",
    "transaction type not supported",
    "rlp",
    "max fee per gas less than block base fee",
];

/// How a failed submission should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Stop immediately.
    Terminal,
    /// Try again after the backoff.
    Transient,
}

/// Classify an error returned by a submission attempt.
pub fn classify_submit_error(err: &BlockchainError) -> ErrorClass {
    match err {
        BlockchainError::Timeout(_) | BlockchainError::Connection { .. } => ErrorClass::Transient,
        BlockchainError::Rpc(message) => {
            let lower = message.to_ascii_lowercase();
            if TERMINAL_MARKERS.iter().any(|m| lower.contains(m)) {
                ErrorClass::Terminal
            } else {
                ErrorClass::Transient
            }
        }
        _ => ErrorClass::Terminal,
    }
}

/// Attempt budget and spacing for broadcast retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_secs(2),
        }
    }
}

impl From<&BroadcastConfig> for RetryPolicy {
    fn from(config: &BroadcastConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff: Duration::from_secs(config.backoff_secs),
        }
    }
}
