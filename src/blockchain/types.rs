//! Chain-specific types and error definitions.

use alloy::consensus::TxEip1559;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};
use alloy::rpc::types::TransactionRequest;
use thiserror::Error;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur while moving a stake through its lifecycle.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// The RPC endpoint could not be reached at construction time.
    #[error("Failed to connect to RPC endpoint '{endpoint}': {reason}")]
    Connection { endpoint: String, reason: String },

    /// RPC request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The run was cancelled while this operation was in flight.
    #[error("Operation cancelled")]
    Cancelled,

    /// The sender cannot cover the stake amount.
    #[error("Insufficient balance: have {balance} wei, need {required} wei")]
    InsufficientBalance { balance: U256, required: U256 },

    /// Fees stayed above the ceiling for the whole wait window.
    #[error("Max fee per gas stayed above {ceiling_wei} wei for {waited_secs} seconds")]
    GasTimeout { ceiling_wei: u128, waited_secs: u64 },

    /// The transaction could not be signed.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// The node refused the transaction outright; retrying cannot help.
    #[error("Broadcast rejected on attempt {attempt}: {reason}")]
    BroadcastRejected { attempt: u32, reason: String },

    /// Every broadcast attempt failed with a transient error.
    #[error("Broadcast failed after {attempts} attempts: {source}")]
    BroadcastExhausted {
        attempts: u32,
        #[source]
        source: Box<BlockchainError>,
    },

    /// No receipt appeared before the confirmation deadline.
    #[error("Transaction {0} not confirmed before the deadline")]
    ConfirmationTimeout(TxHash),

    /// Transaction was reverted on-chain.
    #[error("Transaction {0} reverted")]
    Reverted(TxHash),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// A call to estimate: the transaction about to be sent, minus fees and nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSpec {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub input: Bytes,
}

impl CallSpec {
    /// Convert to an RPC request for `eth_estimateGas`.
    pub fn to_request(&self) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(self.from)
            .with_to(self.to)
            .with_value(self.value)
            .with_input(self.input.clone())
    }
}

/// EIP-1559 fee parameters. Derived fresh for every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    pub gas_limit: u64,
    pub priority_fee_per_gas: u128,
    pub max_fee_per_gas: u128,
}

/// A fully specified, unsigned delegation transaction.
///
/// The nonce is fixed here; every broadcast retry resends the same signed
/// bytes produced from this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTransaction {
    pub chain_id: ChainId,
    pub nonce: u64,
    pub fee: FeeQuote,
    pub to: Address,
    pub value: U256,
    pub input: Bytes,
}

impl PreparedTransaction {
    /// The dynamic-fee transaction body to sign.
    pub fn to_eip1559(&self) -> TxEip1559 {
        TxEip1559 {
            chain_id: self.chain_id.0,
            nonce: self.nonce,
            gas_limit: self.fee.gas_limit,
            max_fee_per_gas: self.fee.max_fee_per_gas,
            max_priority_fee_per_gas: self.fee.priority_fee_per_gas,
            to: TxKind::Call(self.to),
            value: self.value,
            access_list: Default::default(),
            input: self.input.clone(),
        }
    }
}

/// An EIP-2718 encoded, signed transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub hash: TxHash,
    pub nonce: u64,
    pub raw: Bytes,
}

/// The part of a mined receipt the lifecycle cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptStatus {
    pub success: bool,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// Terminal state of the confirmation watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Receipt reported success.
    Succeeded { block_number: Option<u64> },
    /// Receipt reported any non-success status.
    Reverted { block_number: Option<u64> },
    /// No receipt before the deadline. The transaction may still land later.
    TimedOut,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId::from(10143u64);
        assert_eq!(chain_id.0, 10143);
        assert_eq!(u64::from(chain_id), 10143);
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = BlockchainError::GasTimeout {
            ceiling_wei: 3_000_000_000,
            waited_secs: 300,
        };
        assert!(err.to_string().contains("3000000000"));

        let err = BlockchainError::BroadcastExhausted {
            attempts: 5,
            source: Box::new(BlockchainError::Rpc("connection reset".into())),
        };
        assert!(err.to_string().contains("5 attempts"));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_prepared_transaction_to_eip1559() {
        let prepared = PreparedTransaction {
            chain_id: ChainId(10143),
            nonce: 4,
            fee: FeeQuote {
                gas_limit: 120_000,
                priority_fee_per_gas: 2,
                max_fee_per_gas: 52,
            },
            to: Address::with_last_byte(0x10),
            value: U256::from(1_000u64),
            input: Bytes::from_static(&[1, 2, 3]),
        };

        let tx = prepared.to_eip1559();
        assert_eq!(tx.chain_id, 10143);
        assert_eq!(tx.nonce, 4);
        assert_eq!(tx.gas_limit, 120_000);
        assert_eq!(tx.max_fee_per_gas, 52);
        assert_eq!(tx.max_priority_fee_per_gas, 2);
        assert_eq!(tx.to, TxKind::Call(prepared.to));
        assert_eq!(tx.input, prepared.input);
    }
}
