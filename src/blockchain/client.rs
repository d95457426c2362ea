//! Chain RPC gateway with timeout and cancellation handling.
//!
//! # Responsibilities
//! - Connect to a JSON-RPC endpoint and prove it is reachable
//! - Query chain state (balance, base fee, tip, nonce, chain id, receipts)
//! - Submit raw signed transactions
//! - Bound every request by a timeout and the run's cancellation token

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::blockchain::types::{
    BlockchainError, BlockchainResult, CallSpec, ChainId, ReceiptStatus, SignedTransaction,
};
use crate::resilience::timeouts::guarded;

/// Capabilities the staking lifecycle needs from a chain.
///
/// Every method takes the run's cancellation token and returns
/// [`BlockchainError::Cancelled`] promptly once it fires. Implementations
/// must be safe to call from many tasks at once.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Native balance of `address` at the latest block.
    async fn balance_of(&self, address: Address, cancel: &CancellationToken) -> BlockchainResult<U256>;

    /// Base fee of the current chain head.
    async fn current_base_fee(&self, cancel: &CancellationToken) -> BlockchainResult<u128>;

    /// Node-suggested priority fee (tip).
    async fn suggested_priority_fee(&self, cancel: &CancellationToken) -> BlockchainResult<u128>;

    /// Gas units the call is expected to consume.
    async fn estimate_gas(&self, call: &CallSpec, cancel: &CancellationToken) -> BlockchainResult<u64>;

    /// Next nonce for `address`, counting pending transactions.
    async fn pending_nonce(&self, address: Address, cancel: &CancellationToken) -> BlockchainResult<u64>;

    /// Chain identifier used for replay protection.
    async fn chain_id(&self, cancel: &CancellationToken) -> BlockchainResult<ChainId>;

    /// Submit a signed transaction. Returns as soon as the node accepts it.
    async fn submit(&self, tx: &SignedTransaction, cancel: &CancellationToken) -> BlockchainResult<TxHash>;

    /// Receipt for `hash`, or `None` while it is not yet mined.
    async fn receipt(&self, hash: TxHash, cancel: &CancellationToken) -> BlockchainResult<Option<ReceiptStatus>>;
}

/// Gateway backed by an alloy HTTP provider.
#[derive(Clone)]
pub struct RpcGateway {
    /// Endpoint name from the configuration.
    name: String,
    /// Endpoint URL.
    url: String,
    provider: Arc<dyn Provider + Send + Sync>,
    /// Chain id observed while connecting.
    chain_id: ChainId,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl RpcGateway {
    /// Connect to an endpoint.
    ///
    /// # Arguments
    /// * `name` - Endpoint name used in logs
    /// * `url` - JSON-RPC URL
    /// * `connect_timeout` - Deadline for the reachability probe
    /// * `request_timeout` - Deadline for every later request
    ///
    /// # Returns
    /// A connected gateway, or [`BlockchainError::Connection`] if the endpoint
    /// does not answer within `connect_timeout`
    pub async fn connect(
        name: &str,
        url: &str,
        connect_timeout: Duration,
        request_timeout: Duration,
        cancel: &CancellationToken,
    ) -> BlockchainResult<Self> {
        let connection_error = |reason: String| BlockchainError::Connection {
            endpoint: name.to_string(),
            reason,
        };

        let parsed: url::Url = url
            .parse()
            .map_err(|e| connection_error(format!("Invalid RPC URL '{}': {}", url, e)))?;
        let provider = Arc::new(ProviderBuilder::new().connect_http(parsed)) as Arc<dyn Provider + Send + Sync>;

        let chain_id = match guarded("eth_chainId", connect_timeout, cancel, provider.get_chain_id()).await {
            Ok(id) => ChainId(id),
            Err(BlockchainError::Cancelled) => return Err(BlockchainError::Cancelled),
            Err(e) => return Err(connection_error(e.to_string())),
        };

        tracing::info!(
            endpoint = %name,
            rpc_url = %url,
            chain_id = chain_id.0,
            "Chain gateway connected"
        );

        Ok(Self {
            name: name.to_string(),
            url: url.to_string(),
            provider,
            chain_id,
            timeout_duration: request_timeout,
        })
    }

    /// Endpoint name from the configuration.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl ChainGateway for RpcGateway {
    async fn balance_of(&self, address: Address, cancel: &CancellationToken) -> BlockchainResult<U256> {
        guarded("eth_getBalance", self.timeout_duration, cancel, self.provider.get_balance(address)).await
    }

    async fn current_base_fee(&self, cancel: &CancellationToken) -> BlockchainResult<u128> {
        let block = guarded(
            "eth_getBlockByNumber",
            self.timeout_duration,
            cancel,
            self.provider.get_block_by_number(BlockNumberOrTag::Latest),
        )
        .await?
        .ok_or_else(|| BlockchainError::Rpc("eth_getBlockByNumber: latest block not available".to_string()))?;

        block
            .header
            .base_fee_per_gas
            .map(u128::from)
            .ok_or_else(|| BlockchainError::Rpc("latest block has no base fee".to_string()))
    }

    async fn suggested_priority_fee(&self, cancel: &CancellationToken) -> BlockchainResult<u128> {
        guarded(
            "eth_maxPriorityFeePerGas",
            self.timeout_duration,
            cancel,
            self.provider.get_max_priority_fee_per_gas(),
        )
        .await
    }

    async fn estimate_gas(&self, call: &CallSpec, cancel: &CancellationToken) -> BlockchainResult<u64> {
        guarded(
            "eth_estimateGas",
            self.timeout_duration,
            cancel,
            self.provider.estimate_gas(call.to_request()),
        )
        .await
    }

    async fn pending_nonce(&self, address: Address, cancel: &CancellationToken) -> BlockchainResult<u64> {
        guarded(
            "eth_getTransactionCount",
            self.timeout_duration,
            cancel,
            self.provider.get_transaction_count(address).pending(),
        )
        .await
    }

    async fn chain_id(&self, cancel: &CancellationToken) -> BlockchainResult<ChainId> {
        if cancel.is_cancelled() {
            return Err(BlockchainError::Cancelled);
        }
        Ok(self.chain_id)
    }

    async fn submit(&self, tx: &SignedTransaction, cancel: &CancellationToken) -> BlockchainResult<TxHash> {
        let pending = guarded(
            "eth_sendRawTransaction",
            self.timeout_duration,
            cancel,
            self.provider.send_raw_transaction(&tx.raw),
        )
        .await?;
        Ok(*pending.tx_hash())
    }

    async fn receipt(&self, hash: TxHash, cancel: &CancellationToken) -> BlockchainResult<Option<ReceiptStatus>> {
        let receipt = guarded(
            "eth_getTransactionReceipt",
            self.timeout_duration,
            cancel,
            self.provider.get_transaction_receipt(hash),
        )
        .await?;

        Ok(receipt.map(|r| ReceiptStatus {
            success: r.status(),
            block_number: r.block_number,
            gas_used: r.gas_used,
        }))
    }
}

impl std::fmt::Debug for RpcGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcGateway")
            .field("name", &self.name)
            .field("rpc_url", &self.url)
            .field("chain_id", &self.chain_id.0)
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}
