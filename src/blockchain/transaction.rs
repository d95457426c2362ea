//! Delegation call encoding and transaction preparation.
//!
//! # Responsibilities
//! - Encode `delegate(validatorId)` call data
//! - Refuse to prepare a stake the sender cannot afford
//! - Fix chain id, nonce and fees into a [`PreparedTransaction`]

use alloy::primitives::{Bytes, U256};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::blockchain::client::ChainGateway;
use crate::blockchain::fees::FeeGate;
use crate::blockchain::types::{BlockchainError, BlockchainResult, CallSpec, PreparedTransaction};
use crate::staking::types::{StakeRequest, ValidatorId};

/// Selector of the staking contract's `delegate(uint64)` entry point.
pub const DELEGATE_SELECTOR: [u8; 4] = [0x84, 0x99, 0x4f, 0xec];

/// Length of an encoded delegation call: selector plus one 32-byte word.
pub const DELEGATE_CALL_LEN: usize = 4 + 32;

/// Encode a delegation call: selector followed by the validator id
/// left-padded to 32 bytes.
pub fn encode_delegate_call(validator: ValidatorId) -> Bytes {
    let mut data = Vec::with_capacity(DELEGATE_CALL_LEN);
    data.extend_from_slice(&DELEGATE_SELECTOR);
    data.extend_from_slice(&U256::from(validator.0).to_be_bytes::<32>());
    Bytes::from(data)
}

/// Decode call data produced by [`encode_delegate_call`].
///
/// Returns `None` if the selector differs, the length is wrong, or the
/// argument does not fit a validator id.
pub fn decode_delegate_call(data: &[u8]) -> Option<ValidatorId> {
    if data.len() != DELEGATE_CALL_LEN || data[..4] != DELEGATE_SELECTOR {
        return None;
    }
    let word = U256::from_be_slice(&data[4..]);
    u64::try_from(word).ok().map(ValidatorId)
}

/// Builds unsigned delegation transactions.
pub struct TxBuilder {
    gateway: Arc<dyn ChainGateway>,
    fee_gate: FeeGate,
}

impl TxBuilder {
    /// Create a new transaction builder.
    pub fn new(gateway: Arc<dyn ChainGateway>, fee_gate: FeeGate) -> Self {
        Self { gateway, fee_gate }
    }

    /// Prepare the delegation transaction for one stake request.
    ///
    /// Reads the sender's balance first and fails with
    /// [`BlockchainError::InsufficientBalance`] before any gas estimation if
    /// it cannot cover the amount. Every other RPC failure is returned
    /// unchanged.
    pub async fn prepare(
        &self,
        request: &StakeRequest,
        cancel: &CancellationToken,
    ) -> BlockchainResult<PreparedTransaction> {
        let sender = request.account.address();

        let balance = self.gateway.balance_of(sender, cancel).await?;
        if balance < request.amount {
            return Err(BlockchainError::InsufficientBalance {
                balance,
                required: request.amount,
            });
        }

        let input = encode_delegate_call(request.validator);
        let chain_id = self.gateway.chain_id(cancel).await?;
        let nonce = self.gateway.pending_nonce(sender, cancel).await?;

        let call = CallSpec {
            from: sender,
            to: request.contract,
            value: request.amount,
            input: input.clone(),
        };
        let fee = self.fee_gate.quote(&call, cancel).await?;

        Ok(PreparedTransaction {
            chain_id,
            nonce,
            fee,
            to: request.contract,
            value: request.amount,
            input,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delegate_call_round_trip() {
        let data = encode_delegate_call(ValidatorId(7));
        assert_eq!(data.len(), 36);
        assert_eq!(&data[..4], &[0x84, 0x99, 0x4f, 0xec]);
        assert!(data[4..35].iter().all(|b| *b == 0));
        assert_eq!(data[35], 7);
        assert_eq!(decode_delegate_call(&data), Some(ValidatorId(7)));
    }

    #[test]
    fn test_large_validator_id_is_big_endian() {
        let data = encode_delegate_call(ValidatorId(0x0102));
        assert_eq!(&data[34..], &[0x01, 0x02]);
        assert_eq!(decode_delegate_call(&data), Some(ValidatorId(0x0102)));
    }

    #[test]
    fn test_decode_rejects_foreign_calls() {
        let mut data = encode_delegate_call(ValidatorId(1)).to_vec();
        data[0] = 0xa9;
        assert_eq!(decode_delegate_call(&data), None);
        assert_eq!(decode_delegate_call(&data[..20]), None);
    }
}
