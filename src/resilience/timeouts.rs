//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap RPC calls with a deadline
//! - Abandon the call cleanly when the run is cancelled
//! - Compute polling deadlines without overflowing `Instant`
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other RPC errors (they are transient)

use std::fmt::Display;
use std::future::IntoFuture;
use std::time::Duration;

use tokio::time::{timeout, Instant};
use tokio_util::sync::CancellationToken;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Roughly 30 years; unreachable deadlines are clamped to this.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `start + after`, clamped to a far-future instant instead of overflowing.
pub fn deadline_from(start: Instant, after: Duration) -> Instant {
    start
        .checked_add(after)
        .unwrap_or_else(|| start + FAR_FUTURE)
}

/// Run one RPC call under `limit`, returning early if `cancel` fires.
///
/// Transport errors are flattened into [`BlockchainError::Rpc`] prefixed with
/// the operation name so that logs and error classification see the node's
/// original message.
pub async fn guarded<T, E, F>(
    operation: &'static str,
    limit: Duration,
    cancel: &CancellationToken,
    call: F,
) -> BlockchainResult<T>
where
    F: IntoFuture<Output = Result<T, E>>,
    E: Display,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(BlockchainError::Cancelled),
        result = timeout(limit, call.into_future()) => match result {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(BlockchainError::Rpc(format!("{operation}: {e}"))),
            Err(_) => Err(BlockchainError::Timeout(limit.as_secs())),
        },
    }
}

/// Sleep for `duration` unless `cancel` fires first.
pub async fn cancellable_sleep(duration: Duration, cancel: &CancellationToken) -> BlockchainResult<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(BlockchainError::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}
