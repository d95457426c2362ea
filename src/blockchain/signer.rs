//! Offline transaction signing.

use alloy::consensus::{SignableTransaction, TxEnvelope};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::Bytes;
use alloy::signers::local::PrivateKeySigner;

use crate::blockchain::types::{BlockchainError, BlockchainResult, PreparedTransaction, SignedTransaction};

/// Sign a prepared transaction with `key`.
///
/// The EIP-1559 signing payload commits to the chain id, so the result is
/// only valid on that chain. No network access.
pub fn sign_transaction(
    prepared: &PreparedTransaction,
    key: &PrivateKeySigner,
) -> BlockchainResult<SignedTransaction> {
    if prepared.chain_id.0 == 0 {
        return Err(BlockchainError::Signing("chain id must be non-zero".to_string()));
    }
    if prepared.fee.gas_limit == 0 {
        return Err(BlockchainError::Signing("gas limit must be non-zero".to_string()));
    }
    if prepared.fee.priority_fee_per_gas > prepared.fee.max_fee_per_gas {
        return Err(BlockchainError::Signing(format!(
            "priority fee {} exceeds max fee {}",
            prepared.fee.priority_fee_per_gas, prepared.fee.max_fee_per_gas
        )));
    }

    let mut tx = prepared.to_eip1559();
    let signature = key
        .sign_transaction_sync(&mut tx)
        .map_err(|e| BlockchainError::Signing(e.to_string()))?;

    let signed = tx.into_signed(signature);
    let hash = *signed.hash();
    let envelope = TxEnvelope::from(signed);

    Ok(SignedTransaction {
        hash,
        nonce: prepared.nonce,
        raw: Bytes::from(envelope.encoded_2718()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::{ChainId, FeeQuote};
    use alloy::eips::eip2718::Decodable2718;
    use alloy::primitives::{Address, U256};

    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn prepared() -> PreparedTransaction {
        PreparedTransaction {
            chain_id: ChainId(10143),
            nonce: 9,
            fee: FeeQuote {
                gas_limit: 150_000,
                priority_fee_per_gas: 2_000_000_000,
                max_fee_per_gas: 2_500_000_000,
            },
            to: Address::with_last_byte(0x10),
            value: U256::from(10u64).pow(U256::from(17u64)),
            input: crate::blockchain::transaction::encode_delegate_call(
                crate::staking::types::ValidatorId(7),
            ),
        }
    }

    #[test]
    fn test_signed_envelope_round_trip() {
        let key: PrivateKeySigner = TEST_PRIVATE_KEY.parse().unwrap();
        let signed = sign_transaction(&prepared(), &key).unwrap();
        assert_eq!(signed.nonce, 9);

        let envelope = TxEnvelope::decode_2718(&mut signed.raw.as_ref()).unwrap();
        let inner = envelope.as_eip1559().expect("dynamic-fee transaction");
        assert_eq!(*inner.hash(), signed.hash);
        assert_eq!(inner.tx().chain_id, 10143);
        assert_eq!(inner.tx().nonce, 9);
        assert_eq!(inner.tx().input, prepared().input);

        let recovered = inner
            .signature()
            .recover_address_from_prehash(&inner.tx().signature_hash())
            .unwrap();
        assert_eq!(recovered, key.address());
    }

    #[test]
    fn test_signing_is_deterministic() {
        let key: PrivateKeySigner = TEST_PRIVATE_KEY.parse().unwrap();
        let first = sign_transaction(&prepared(), &key).unwrap();
        let second = sign_transaction(&prepared(), &key).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_chain_id_changes_hash() {
        let key: PrivateKeySigner = TEST_PRIVATE_KEY.parse().unwrap();
        let mut other_chain = prepared();
        other_chain.chain_id = ChainId(1);
        let a = sign_transaction(&prepared(), &key).unwrap();
        let b = sign_transaction(&other_chain, &key).unwrap();
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_malformed_fees_are_rejected() {
        let key: PrivateKeySigner = TEST_PRIVATE_KEY.parse().unwrap();
        let mut bad = prepared();
        bad.fee.priority_fee_per_gas = bad.fee.max_fee_per_gas + 1;
        assert!(matches!(
            sign_transaction(&bad, &key),
            Err(BlockchainError::Signing(_))
        ));

        let mut bad = prepared();
        bad.fee.gas_limit = 0;
        assert!(matches!(
            sign_transaction(&bad, &key),
            Err(BlockchainError::Signing(_))
        ));
    }
}
