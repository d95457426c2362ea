//! Per-account randomization of amount, validator and pacing.
//!
//! Ranges and the validator set are validated when [`RunParameters`] is
//! built, so sampling itself cannot fail.

use alloy::primitives::U256;
use rand::Rng;
use std::time::Duration;

use crate::blockchain::wallet::Account;
use crate::staking::types::{AmountRange, DelayRange, RunParameters, StakeRequest, ValidatorId, ValidatorSet};

/// Uniform amount in `[min, max)` wei.
pub fn sample_amount<R: Rng + ?Sized>(range: &AmountRange, rng: &mut R) -> U256 {
    U256::from(rng.gen_range(range.min_wei()..range.max_wei()))
}

/// Uniform choice from the validator set.
pub fn sample_validator<R: Rng + ?Sized>(set: &ValidatorSet, rng: &mut R) -> ValidatorId {
    let ids = set.as_slice();
    ids[rng.gen_range(0..ids.len())]
}

/// Uniform delay in `[min, max)` seconds.
pub fn sample_delay<R: Rng + ?Sized>(range: &DelayRange, rng: &mut R) -> Duration {
    Duration::from_secs_f64(rng.gen_range(range.min_secs()..range.max_secs()))
}

/// Sample a full stake request for `account`.
pub fn sample_request<R: Rng + ?Sized>(account: Account, params: &RunParameters, rng: &mut R) -> StakeRequest {
    StakeRequest {
        amount: sample_amount(&params.stake, rng),
        validator: sample_validator(&params.validators, rng),
        contract: params.contract,
        account,
    }
}
