//! Run accounting and the per-account outcome line.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::observability::metrics;
use crate::staking::types::{OutcomeStatus, TransactionOutcome};

/// Counters shared by every staking task of a run.
#[derive(Debug, Default)]
pub struct RunStats {
    launched: AtomicUsize,
    succeeded: AtomicUsize,
    reverted: AtomicUsize,
    broadcast_failed: AtomicUsize,
    confirmation_timed_out: AtomicUsize,
    preparation_failed: AtomicUsize,
    cancelled: AtomicUsize,
    abandoned: AtomicUsize,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_launch(&self) {
        self.launched.fetch_add(1, Ordering::Relaxed);
        metrics::record_launch();
    }

    pub fn record(&self, status: OutcomeStatus) {
        let counter = match status {
            OutcomeStatus::Succeeded => &self.succeeded,
            OutcomeStatus::Reverted => &self.reverted,
            OutcomeStatus::BroadcastFailed => &self.broadcast_failed,
            OutcomeStatus::ConfirmationTimedOut => &self.confirmation_timed_out,
            OutcomeStatus::PreparationFailed => &self.preparation_failed,
            OutcomeStatus::Cancelled => &self.cancelled,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        metrics::record_outcome(status);
    }

    /// Tasks that never reported an outcome (aborted or panicked).
    pub fn record_abandoned(&self, count: usize) {
        self.abandoned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::Relaxed)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            launched: self.launched(),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            reverted: self.reverted.load(Ordering::Relaxed),
            broadcast_failed: self.broadcast_failed.load(Ordering::Relaxed),
            confirmation_timed_out: self.confirmation_timed_out.load(Ordering::Relaxed),
            preparation_failed: self.preparation_failed.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`RunStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub launched: usize,
    pub succeeded: usize,
    pub reverted: usize,
    pub broadcast_failed: usize,
    pub confirmation_timed_out: usize,
    pub preparation_failed: usize,
    pub cancelled: usize,
    pub abandoned: usize,
}

impl RunSummary {
    /// Accounts with a terminal outcome.
    pub fn finished(&self) -> usize {
        self.succeeded
            + self.reverted
            + self.broadcast_failed
            + self.confirmation_timed_out
            + self.preparation_failed
            + self.cancelled
    }

    pub fn failed(&self) -> usize {
        self.finished() - self.succeeded
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "launched={} succeeded={} reverted={} broadcast_failed={} confirmation_timed_out={} \
             preparation_failed={} cancelled={} abandoned={}",
            self.launched,
            self.succeeded,
            self.reverted,
            self.broadcast_failed,
            self.confirmation_timed_out,
            self.preparation_failed,
            self.cancelled,
            self.abandoned
        )
    }
}

/// Emit the single terminal log line for one account.
pub fn log_outcome(outcome: &TransactionOutcome) {
    let hash = outcome.hash.map(|h| format!("{h:#x}")).unwrap_or_default();
    let error = outcome.error.as_ref().map(|e| e.to_string()).unwrap_or_default();

    match outcome.status {
        OutcomeStatus::Succeeded => tracing::info!(
            account = %outcome.account,
            tx_hash = %hash,
            status = %outcome.status,
            "Stake confirmed"
        ),
        OutcomeStatus::Cancelled => tracing::warn!(
            account = %outcome.account,
            tx_hash = %hash,
            status = %outcome.status,
            "Stake cancelled"
        ),
        _ => tracing::error!(
            account = %outcome.account,
            tx_hash = %hash,
            status = %outcome.status,
            error = %error,
            "Stake failed"
        ),
    }
}
