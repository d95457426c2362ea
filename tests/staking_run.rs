//! End-to-end staking runs against a scripted gateway.

use alloy::primitives::{Address, U256};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use stake_runner::blockchain::BlockchainError;
use stake_runner::lifecycle::drain;
use stake_runner::staking::{
    AmountRange, DelayRange, OutcomeStatus, PipelineSettings, RunParameters, StakeOrchestrator, StakePipeline,
    StakeRequest, ValidatorId, ValidatorSet,
};

mod common;
use common::{account, ReceiptReply, StubGateway, SubmitReply, KEY_A, KEY_B, ONE_COIN};

fn params(delay_min: f64, delay_max: f64) -> RunParameters {
    RunParameters {
        stake: AmountRange::from_coins(0.1, 0.5).unwrap(),
        delay: DelayRange::new(delay_min, delay_max).unwrap(),
        validators: ValidatorSet::new([1, 2, 3]).unwrap(),
        contract: Address::with_last_byte(0x10),
    }
}

fn pipeline(stub: &Arc<StubGateway>) -> StakePipeline {
    let settings = PipelineSettings {
        explorer_tx_url: "https://explorer.test/tx/".to_string(),
        ..PipelineSettings::default()
    };
    StakePipeline::new(stub.clone(), settings)
}

fn request() -> StakeRequest {
    StakeRequest {
        account: account(KEY_A),
        amount: U256::from(ONE_COIN / 5),
        validator: ValidatorId(2),
        contract: Address::with_last_byte(0x10),
    }
}

#[tokio::test(start_paused = true)]
async fn test_pipeline_success() {
    let stub = StubGateway::new().with_receipts([ReceiptReply::Success]).into_arc();

    let outcome = pipeline(&stub).execute(request(), &CancellationToken::new()).await;

    assert_eq!(outcome.status, OutcomeStatus::Succeeded);
    assert_eq!(outcome.account, account(KEY_A).address());
    assert!(outcome.hash.is_some());
    assert!(outcome.error.is_none());
    assert_eq!(stub.submits(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_pipeline_insufficient_balance_sends_nothing() {
    let stub = StubGateway::new().with_balance(ONE_COIN / 10).into_arc();

    let outcome = pipeline(&stub).execute(request(), &CancellationToken::new()).await;

    assert_eq!(outcome.status, OutcomeStatus::PreparationFailed);
    assert!(outcome.hash.is_none());
    assert!(matches!(outcome.error, Some(BlockchainError::InsufficientBalance { .. })));
    assert_eq!(stub.submits(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_pipeline_reverted() {
    let stub = StubGateway::new().with_receipts([ReceiptReply::Reverted]).into_arc();

    let outcome = pipeline(&stub).execute(request(), &CancellationToken::new()).await;

    assert_eq!(outcome.status, OutcomeStatus::Reverted);
    assert!(matches!(outcome.error, Some(BlockchainError::Reverted(h)) if Some(h) == outcome.hash));
}

#[tokio::test(start_paused = true)]
async fn test_pipeline_rejected_broadcast() {
    let stub = StubGateway::new()
        .with_submits([SubmitReply::Rpc("insufficient funds for gas * price + value".into())])
        .into_arc();

    let outcome = pipeline(&stub).execute(request(), &CancellationToken::new()).await;

    assert_eq!(outcome.status, OutcomeStatus::BroadcastFailed);
    assert!(matches!(outcome.error, Some(BlockchainError::BroadcastRejected { .. })));
    assert_eq!(stub.receipts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_pipeline_confirmation_timeout() {
    let stub = StubGateway::new().into_arc();

    let outcome = pipeline(&stub).execute(request(), &CancellationToken::new()).await;

    assert_eq!(outcome.status, OutcomeStatus::ConfirmationTimedOut);
    assert!(matches!(outcome.error, Some(BlockchainError::ConfirmationTimeout(_))));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_after_submission_keeps_hash() {
    let stub = StubGateway::new().into_arc();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        trigger.cancel();
    });

    let outcome = pipeline(&stub).execute(request(), &cancel).await;

    assert_eq!(outcome.status, OutcomeStatus::Cancelled);
    assert!(outcome.hash.is_some());
    assert_eq!(stub.submits(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_before_start_does_nothing() {
    let stub = StubGateway::new().into_arc();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = pipeline(&stub).execute(request(), &cancel).await;

    assert_eq!(outcome.status, OutcomeStatus::Cancelled);
    assert!(outcome.hash.is_none());
    assert_eq!(stub.balance_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_run_staggers_accounts() {
    let stub = StubGateway::new()
        .with_receipts([ReceiptReply::Success, ReceiptReply::Success])
        .into_arc();
    let mut orchestrator = StakeOrchestrator::with_rng(pipeline(&stub), params(1.0, 2.0), StdRng::seed_from_u64(7));
    let cancel = CancellationToken::new();

    let launched = orchestrator.start(vec![account(KEY_A), account(KEY_B)], &cancel).await;
    let summary = orchestrator.wait_all().await;

    assert_eq!(launched, 2);
    assert_eq!(summary.launched, 2);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed(), 0);

    let submits = stub.submit_times();
    assert_eq!(submits.len(), 2);
    let gap = submits[1] - submits[0];
    assert!(gap >= Duration::from_secs(1) && gap < Duration::from_secs(2), "gap {gap:?}");
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_delay_stops_launching() {
    let stub = StubGateway::new()
        .with_receipts([ReceiptReply::Pending, ReceiptReply::Pending, ReceiptReply::Success])
        .into_arc();
    let mut orchestrator =
        StakeOrchestrator::with_rng(pipeline(&stub), params(10.0, 20.0), StdRng::seed_from_u64(11));
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        trigger.cancel();
    });
    let started = Instant::now();

    let launched = orchestrator.start(vec![account(KEY_A), account(KEY_B)], &cancel).await;
    assert_eq!(started.elapsed(), Duration::from_secs(5));
    assert_eq!(launched, 1);

    // The dispatched account is still confirming and must finish.
    let summary = drain(orchestrator.wait_all(), &cancel, Duration::from_secs(30))
        .await
        .unwrap();

    assert_eq!(started.elapsed(), Duration::from_secs(9));
    assert_eq!(summary.launched, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.cancelled, 0);
    assert_eq!(stub.submits(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_grace_period_expiry_cancels_in_flight_tasks() {
    let stub = StubGateway::new().into_arc();
    let mut orchestrator = StakeOrchestrator::with_rng(pipeline(&stub), params(1.0, 2.0), StdRng::seed_from_u64(5));
    let cancel = CancellationToken::new();

    orchestrator.start(vec![account(KEY_A)], &cancel).await;
    cancel.cancel();

    let finished = drain(orchestrator.wait_all(), &cancel, Duration::from_secs(5)).await;
    assert!(finished.is_none());

    let stopped = orchestrator.abandon().await;
    let summary = orchestrator.stats().summary();

    assert_eq!(stopped, 1);
    assert_eq!(summary.cancelled, 1);
    assert_eq!(summary.abandoned, 0);
    assert_eq!(orchestrator.in_flight(), 0);
    assert_eq!(stub.submits(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failures_are_isolated_per_account() {
    let stub = StubGateway::new()
        .with_submits([SubmitReply::Rpc("nonce too low".into()), SubmitReply::Accept])
        .with_receipts([ReceiptReply::Success])
        .into_arc();
    let mut orchestrator = StakeOrchestrator::with_rng(pipeline(&stub), params(1.0, 2.0), StdRng::seed_from_u64(3));

    orchestrator
        .start(vec![account(KEY_A), account(KEY_B)], &CancellationToken::new())
        .await;
    let summary = orchestrator.wait_all().await;

    assert_eq!(summary.broadcast_failed, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.finished(), 2);
}
