//! Staggered dispatch of staking tasks across accounts.
//!
//! # Algorithm
//! ```text
//! for each account, in file order:
//!     cancelled?            → stop launching
//!     sample amount/validator, spawn pipeline task
//!     last account?         → done
//!     sleep sampled delay (cancellable)
//! ```
//!
//! Launched tasks run concurrently and never block the next launch. Accounts
//! have distinct senders, so their nonces never conflict.
//!
//! Two tokens are in play. The run token passed to [`StakeOrchestrator::start`]
//! only stops launching; tasks already dispatched observe the orchestrator's
//! own task token, which fires when the driver gives up on them.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::blockchain::wallet::Account;
use crate::resilience::timeouts::cancellable_sleep;
use crate::staking::pipeline::StakePipeline;
use crate::staking::report::{log_outcome, RunStats, RunSummary};
use crate::staking::sampling::{sample_delay, sample_request};
use crate::staking::types::{RunParameters, StakeRequest};

/// Drives one staking run.
pub struct StakeOrchestrator {
    pipeline: Arc<StakePipeline>,
    params: RunParameters,
    rng: StdRng,
    tasks: JoinSet<()>,
    task_cancel: CancellationToken,
    stats: Arc<RunStats>,
}

/// How long cancelled tasks get to report before being aborted.
const ABANDON_SETTLE: Duration = Duration::from_secs(1);

impl StakeOrchestrator {
    pub fn new(pipeline: StakePipeline, params: RunParameters) -> Self {
        Self::with_rng(pipeline, params, StdRng::from_entropy())
    }

    /// Use a caller-supplied generator, e.g. a seeded one in tests.
    pub fn with_rng(pipeline: StakePipeline, params: RunParameters, rng: StdRng) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            params,
            rng,
            tasks: JoinSet::new(),
            task_cancel: CancellationToken::new(),
            stats: Arc::new(RunStats::new()),
        }
    }

    pub fn stats(&self) -> Arc<RunStats> {
        Arc::clone(&self.stats)
    }

    /// Tasks launched but not yet joined.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Launch one task per account, pacing launches by the sampled delay.
    ///
    /// Returns once every account is launched or `cancel` fires, whichever
    /// comes first. Launched tasks keep running; see [`Self::wait_all`].
    pub async fn start(&mut self, accounts: Vec<Account>, cancel: &CancellationToken) -> usize {
        let total = accounts.len();
        tracing::info!(accounts = total, validators = self.params.validators.len(), "Starting staking run");

        for (index, account) in accounts.into_iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!(skipped = total - index, "Run cancelled, not launching remaining accounts");
                break;
            }

            let request = sample_request(account, &self.params, &mut self.rng);
            self.launch(request);

            if index + 1 == total {
                break;
            }

            let delay = sample_delay(&self.params.delay, &mut self.rng);
            tracing::info!(
                next_in_secs = delay.as_secs_f64(),
                remaining = total - index - 1,
                "Waiting before next account"
            );
            if cancellable_sleep(delay, cancel).await.is_err() {
                tracing::info!(
                    skipped = total - index - 1,
                    "Run cancelled, not launching remaining accounts"
                );
                break;
            }
        }

        self.stats.launched()
    }

    fn launch(&mut self, request: StakeRequest) {
        let cancel = self.task_cancel.clone();
        let pipeline = Arc::clone(&self.pipeline);
        let stats = Arc::clone(&self.stats);

        stats.record_launch();
        tracing::debug!(
            account = %request.account.address(),
            launched = stats.launched(),
            "Dispatching staking task"
        );

        self.tasks.spawn(async move {
            let outcome = pipeline.execute(request, &cancel).await;
            log_outcome(&outcome);
            stats.record(outcome.status);
        });
    }

    /// Wait for every launched task to finish.
    pub async fn wait_all(&mut self) -> RunSummary {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Staking task ended without an outcome");
                self.stats.record_abandoned(1);
            }
        }
        self.stats.summary()
    }

    /// Stop every task still running. Returns how many were cut short.
    ///
    /// Tasks are first cancelled cooperatively, which reports them as
    /// cancelled; any that do not settle promptly are aborted and counted as
    /// abandoned. Transactions already submitted stay valid on-chain.
    pub async fn abandon(&mut self) -> usize {
        let remaining = self.tasks.len();
        if remaining == 0 {
            return 0;
        }

        tracing::warn!(tasks = remaining, "Stopping in-flight staking tasks");
        self.task_cancel.cancel();
        if tokio::time::timeout(ABANDON_SETTLE, self.wait_all()).await.is_ok() {
            return remaining;
        }

        self.tasks.abort_all();
        let mut aborted = 0;
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                if !e.is_cancelled() {
                    tracing::error!(error = %e, "Staking task ended without an outcome");
                }
                aborted += 1;
            }
        }

        if aborted > 0 {
            self.stats.record_abandoned(aborted);
            tracing::warn!(tasks = aborted, "Abandoned in-flight staking tasks");
        }
        remaining
    }
}
