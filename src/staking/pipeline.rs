//! One account's stake, start to finish.
//!
//! # States
//! ```text
//! Idle → Preparing → Signing → Broadcasting → Confirming → Succeeded
//!           │           │            │             │
//!           └───────────┴────────────┴─────────────┴──────→ Failed
//! ```
//!
//! Every path ends in exactly one [`TransactionOutcome`]. Once a transaction
//! has been handed to a node it cannot be recalled: cancellation from that
//! point on only stops the local wait.

use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, TxHash};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::blockchain::types::{BlockchainError, ConfirmationStatus};
use crate::blockchain::{
    sign_transaction, Broadcaster, ChainGateway, ConfirmationWatcher, FeeGate, FeePolicy, TxBuilder, WatchPolicy,
};
use crate::config::StakerConfig;
use crate::resilience::retries::RetryPolicy;
use crate::staking::types::{OutcomeStatus, StakeRequest, TaskState, TransactionOutcome};

/// Policies for each lifecycle stage.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub fees: FeePolicy,
    pub retry: RetryPolicy,
    pub watch: WatchPolicy,
    /// Base URL; the hash is appended as `{base}/{hash}`.
    pub explorer_tx_url: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            fees: FeePolicy::default(),
            retry: RetryPolicy::default(),
            watch: WatchPolicy::default(),
            explorer_tx_url: String::new(),
        }
    }
}

impl From<&StakerConfig> for PipelineSettings {
    fn from(config: &StakerConfig) -> Self {
        Self {
            fees: FeePolicy::from(&config.fees),
            retry: RetryPolicy::from(&config.broadcast),
            watch: WatchPolicy::from(&config.confirmation),
            explorer_tx_url: config.chain.explorer_tx_url.clone(),
        }
    }
}

/// Prepare, sign, broadcast and confirm, against one gateway.
pub struct StakePipeline {
    builder: TxBuilder,
    broadcaster: Broadcaster,
    watcher: ConfirmationWatcher,
    explorer_tx_url: String,
}

impl StakePipeline {
    pub fn new(gateway: Arc<dyn ChainGateway>, settings: PipelineSettings) -> Self {
        let fee_gate = FeeGate::new(Arc::clone(&gateway), settings.fees);
        Self {
            builder: TxBuilder::new(Arc::clone(&gateway), fee_gate),
            broadcaster: Broadcaster::new(Arc::clone(&gateway), settings.retry),
            watcher: ConfirmationWatcher::new(gateway, settings.watch),
            explorer_tx_url: settings.explorer_tx_url.trim_end_matches('/').to_string(),
        }
    }

    /// Explorer link for a transaction hash.
    pub fn explorer_link(&self, hash: TxHash) -> String {
        format!("{}/{hash:#x}", self.explorer_tx_url)
    }

    /// Run one stake request to a terminal outcome.
    pub async fn execute(&self, request: StakeRequest, cancel: &CancellationToken) -> TransactionOutcome {
        let account = request.account.address();
        let mut state = TaskState::Idle;

        if cancel.is_cancelled() {
            return TransactionOutcome::cancelled(account, None);
        }

        transition(account, &mut state, TaskState::Preparing);
        tracing::info!(
            account = %account,
            amount = %format_ether(request.amount),
            validator = %request.validator,
            "Preparing stake"
        );
        let prepared = match self.builder.prepare(&request, cancel).await {
            Ok(prepared) => prepared,
            Err(e) => return fail(account, &mut state, None, e, OutcomeStatus::PreparationFailed),
        };

        transition(account, &mut state, TaskState::Signing);
        let signed = match sign_transaction(&prepared, request.account.signer()) {
            Ok(signed) => signed,
            Err(e) => return fail(account, &mut state, None, e, OutcomeStatus::PreparationFailed),
        };

        transition(account, &mut state, TaskState::Broadcasting);
        let hash = match self.broadcaster.broadcast(&signed, cancel).await {
            Ok(hash) => hash,
            Err(e) => return fail(account, &mut state, Some(signed.hash), e, OutcomeStatus::BroadcastFailed),
        };
        tracing::info!(
            account = %account,
            nonce = signed.nonce,
            tx_hash = %format!("{hash:#x}"),
            explorer = %self.explorer_link(hash),
            "Transaction sent"
        );

        transition(account, &mut state, TaskState::Confirming);
        match self.watcher.watch(hash, cancel).await {
            Ok(ConfirmationStatus::Succeeded { block_number }) => {
                transition(account, &mut state, TaskState::Succeeded);
                tracing::debug!(account = %account, block_number = ?block_number, "Receipt received");
                TransactionOutcome::succeeded(account, hash)
            }
            Ok(ConfirmationStatus::Reverted { block_number }) => {
                tracing::debug!(account = %account, block_number = ?block_number, "Receipt received");
                fail(
                    account,
                    &mut state,
                    Some(hash),
                    BlockchainError::Reverted(hash),
                    OutcomeStatus::Reverted,
                )
            }
            Ok(ConfirmationStatus::TimedOut) => fail(
                account,
                &mut state,
                Some(hash),
                BlockchainError::ConfirmationTimeout(hash),
                OutcomeStatus::ConfirmationTimedOut,
            ),
            Err(e) => {
                tracing::warn!(
                    account = %account,
                    tx_hash = %format!("{hash:#x}"),
                    "Stopped waiting for receipt; transaction remains submitted"
                );
                fail(account, &mut state, Some(hash), e, OutcomeStatus::ConfirmationTimedOut)
            }
        }
    }
}

fn transition(account: Address, state: &mut TaskState, next: TaskState) {
    tracing::debug!(account = %account, from = ?*state, to = ?next, "Task state");
    *state = next;
}

/// Move to `Failed`. Cancellation overrides `status`.
fn fail(
    account: Address,
    state: &mut TaskState,
    hash: Option<TxHash>,
    error: BlockchainError,
    status: OutcomeStatus,
) -> TransactionOutcome {
    transition(account, state, TaskState::Failed);
    let status = if matches!(error, BlockchainError::Cancelled) {
        OutcomeStatus::Cancelled
    } else {
        status
    };
    TransactionOutcome::failed(account, hash, status, error)
}
