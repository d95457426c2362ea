//! Run parameters, stake requests and outcomes.

use alloy::primitives::utils::parse_ether;
use alloy::primitives::{Address, TxHash, U256};
use std::fmt;
use std::time::Duration;

use crate::blockchain::types::BlockchainError;
use crate::blockchain::wallet::Account;
use crate::config::validation::MAX_WAIT_SECS;
use crate::config::{ConfigError, StakerConfig};

/// Integer selecting the validator that receives a delegation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValidatorId(pub u64);

impl fmt::Display for ValidatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered, duplicate-free, non-empty set of validators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorSet(Vec<ValidatorId>);

impl ValidatorSet {
    /// Build a set, keeping first occurrences in order.
    pub fn new(ids: impl IntoIterator<Item = u64>) -> Result<Self, ConfigError> {
        let mut set: Vec<ValidatorId> = Vec::new();
        for id in ids.into_iter().map(ValidatorId) {
            if !set.contains(&id) {
                set.push(id);
            }
        }
        if set.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "validators",
                reason: "validator set is empty".to_string(),
            });
        }
        Ok(Self(set))
    }

    pub fn as_slice(&self) -> &[ValidatorId] {
        &self.0
    }

    pub fn contains(&self, id: ValidatorId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for a set built through `new`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Stake amounts in wei, half-open `[min, max)`, with `min < max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountRange {
    min_wei: u128,
    max_wei: u128,
}

impl AmountRange {
    pub fn new(min_wei: u128, max_wei: u128) -> Result<Self, ConfigError> {
        if min_wei >= max_wei {
            return Err(ConfigError::InvalidValue {
                field: "stake",
                reason: format!("empty range [{min_wei}, {max_wei}) wei"),
            });
        }
        Ok(Self { min_wei, max_wei })
    }

    /// Build from fractional coin amounts (18 decimals).
    pub fn from_coins(min: f64, max: f64) -> Result<Self, ConfigError> {
        Self::new(coins_to_wei("stake.min", min)?, coins_to_wei("stake.max", max)?)
    }

    pub fn min_wei(&self) -> u128 {
        self.min_wei
    }

    pub fn max_wei(&self) -> u128 {
        self.max_wei
    }

    pub fn contains(&self, amount: U256) -> bool {
        amount >= U256::from(self.min_wei) && amount < U256::from(self.max_wei)
    }
}

/// Convert a decimal coin amount to wei without float rounding.
pub fn coins_to_wei(field: &'static str, coins: f64) -> Result<u128, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue { field, reason };

    if !coins.is_finite() || coins < 0.0 {
        return Err(invalid(format!("{coins} is not a non-negative amount")));
    }
    let wei = parse_ether(&coins.to_string()).map_err(|e| invalid(e.to_string()))?;
    u128::try_from(wei).map_err(|_| invalid(format!("{coins} is too large")))
}

/// Inter-account delay, half-open `[min, max)` seconds, with `min < max`
/// and `max` at most [`MAX_WAIT_SECS`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayRange {
    min_secs: f64,
    max_secs: f64,
}

impl DelayRange {
    pub fn new(min_secs: f64, max_secs: f64) -> Result<Self, ConfigError> {
        if !min_secs.is_finite()
            || !max_secs.is_finite()
            || min_secs < 0.0
            || min_secs >= max_secs
            || max_secs > MAX_WAIT_SECS as f64
        {
            return Err(ConfigError::InvalidValue {
                field: "delay",
                reason: format!("invalid range [{min_secs}, {max_secs}) seconds"),
            });
        }
        Ok(Self { min_secs, max_secs })
    }

    pub fn min_secs(&self) -> f64 {
        self.min_secs
    }

    pub fn max_secs(&self) -> f64 {
        self.max_secs
    }

    pub fn contains(&self, delay: Duration) -> bool {
        let secs = delay.as_secs_f64();
        secs >= self.min_secs && secs < self.max_secs
    }
}

/// Everything a run needs besides accounts. Immutable for the run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunParameters {
    pub stake: AmountRange,
    pub delay: DelayRange,
    pub validators: ValidatorSet,
    pub contract: Address,
}

impl RunParameters {
    /// Derive run parameters from a validated configuration.
    pub fn from_config(config: &StakerConfig) -> Result<Self, ConfigError> {
        let contract = config
            .chain
            .contract_address
            .parse::<Address>()
            .map_err(|e| ConfigError::InvalidValue {
                field: "chain.contract_address",
                reason: e.to_string(),
            })?;

        Ok(Self {
            stake: AmountRange::from_coins(config.stake.min, config.stake.max)?,
            delay: DelayRange::new(config.delay.min_secs, config.delay.max_secs)?,
            validators: ValidatorSet::new(config.validators.iter().copied())?,
            contract,
        })
    }
}

/// One account's stake, sampled at dispatch time.
#[derive(Debug, Clone)]
pub struct StakeRequest {
    pub account: Account,
    /// Amount in wei.
    pub amount: U256,
    pub validator: ValidatorId,
    pub contract: Address,
}

/// Per-account task progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Preparing,
    Signing,
    Broadcasting,
    Confirming,
    Succeeded,
    Failed,
}

/// Terminal status of one account's stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Succeeded,
    Reverted,
    BroadcastFailed,
    ConfirmationTimedOut,
    /// Balance, fee, signing or RPC failure before anything was sent.
    PreparationFailed,
    /// The run was cancelled before this account finished.
    Cancelled,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Succeeded => "succeeded",
            OutcomeStatus::Reverted => "reverted",
            OutcomeStatus::BroadcastFailed => "broadcast_failed",
            OutcomeStatus::ConfirmationTimedOut => "confirmation_timed_out",
            OutcomeStatus::PreparationFailed => "preparation_failed",
            OutcomeStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one account's stake.
#[derive(Debug)]
pub struct TransactionOutcome {
    pub account: Address,
    /// Known once the transaction has been signed.
    pub hash: Option<TxHash>,
    pub status: OutcomeStatus,
    pub error: Option<BlockchainError>,
}

impl TransactionOutcome {
    pub fn succeeded(account: Address, hash: TxHash) -> Self {
        Self {
            account,
            hash: Some(hash),
            status: OutcomeStatus::Succeeded,
            error: None,
        }
    }

    pub fn failed(account: Address, hash: Option<TxHash>, status: OutcomeStatus, error: BlockchainError) -> Self {
        Self {
            account,
            hash,
            status,
            error: Some(error),
        }
    }

    pub fn cancelled(account: Address, hash: Option<TxHash>) -> Self {
        Self::failed(account, hash, OutcomeStatus::Cancelled, BlockchainError::Cancelled)
    }
}
