//! Shutdown coordination for a staking run.

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Coordinator for graceful shutdown.
///
/// Wraps the run-wide cancellation token that every long-running task and
/// every suspension point observes.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// The token tasks should observe.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Trigger the shutdown signal. Idempotent.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Run `fut` to completion, but give up once `grace` has elapsed after
/// `token` is cancelled.
///
/// Returns `None` when the grace period ran out first.
pub async fn drain<F>(fut: F, token: &CancellationToken, grace: Duration) -> Option<F::Output>
where
    F: Future,
{
    tokio::pin!(fut);

    tokio::select! {
        output = &mut fut => return Some(output),
        _ = token.cancelled() => {}
    }

    tracing::info!(grace_secs = grace.as_secs(), "Shutdown requested, waiting for in-flight tasks");
    tokio::time::timeout(grace, fut).await.ok()
}
