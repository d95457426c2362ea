//! Shared utilities for integration tests.
//!
//! `StubGateway` stands in for an RPC node: every answer is scripted and
//! every call is counted, so lifecycle behaviour can be checked without a
//! network under a paused Tokio clock.

#![allow(dead_code)]

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use stake_runner::blockchain::types::{
    BlockchainError, BlockchainResult, CallSpec, ChainId, ReceiptStatus, SignedTransaction,
};
use stake_runner::blockchain::{Account, ChainGateway};

pub const KEY_A: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const KEY_B: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

pub const ONE_COIN: u128 = 1_000_000_000_000_000_000;
pub const GWEI: u128 = 1_000_000_000;

pub fn account(key: &str) -> Account {
    Account::from_private_key(key).unwrap()
}

/// Scripted answer to `eth_sendRawTransaction`.
#[derive(Debug, Clone)]
pub enum SubmitReply {
    Accept,
    Rpc(String),
    Timeout,
}

/// Scripted answer to `eth_getTransactionReceipt`.
#[derive(Debug, Clone)]
pub enum ReceiptReply {
    Pending,
    Success,
    Reverted,
    Rpc(String),
}

#[derive(Debug)]
struct Script {
    balance: U256,
    base_fees: VecDeque<u128>,
    priority_fee: u128,
    gas: u64,
    nonce: u64,
    chain_id: u64,
    submits: VecDeque<SubmitReply>,
    receipts: VecDeque<ReceiptReply>,
    submit_times: Vec<Instant>,
    receipt_times: Vec<Instant>,
    fee_times: Vec<Instant>,
}

/// In-memory [`ChainGateway`] with scripted replies.
///
/// Scripts are consumed front to back; the last base fee repeats, exhausted
/// submit scripts accept, exhausted receipt scripts stay pending.
#[derive(Debug)]
pub struct StubGateway {
    script: Mutex<Script>,
    pub balance_calls: AtomicUsize,
    pub estimate_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub receipt_calls: AtomicUsize,
}

impl StubGateway {
    /// A funded node with cheap fees that accepts everything.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script {
                balance: U256::from(10 * ONE_COIN),
                base_fees: VecDeque::from([GWEI]),
                priority_fee: GWEI / 2,
                gas: 150_000,
                nonce: 0,
                chain_id: 10143,
                submits: VecDeque::new(),
                receipts: VecDeque::new(),
                submit_times: Vec::new(),
                receipt_times: Vec::new(),
                fee_times: Vec::new(),
            }),
            balance_calls: AtomicUsize::new(0),
            estimate_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            receipt_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_balance(self, wei: u128) -> Self {
        self.script.lock().unwrap().balance = U256::from(wei);
        self
    }

    pub fn with_base_fees(self, fees: impl IntoIterator<Item = u128>) -> Self {
        self.script.lock().unwrap().base_fees = fees.into_iter().collect();
        self
    }

    pub fn with_priority_fee(self, wei: u128) -> Self {
        self.script.lock().unwrap().priority_fee = wei;
        self
    }

    pub fn with_submits(self, replies: impl IntoIterator<Item = SubmitReply>) -> Self {
        self.script.lock().unwrap().submits = replies.into_iter().collect();
        self
    }

    pub fn with_receipts(self, replies: impl IntoIterator<Item = ReceiptReply>) -> Self {
        self.script.lock().unwrap().receipts = replies.into_iter().collect();
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn submits(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn receipts(&self) -> usize {
        self.receipt_calls.load(Ordering::SeqCst)
    }

    pub fn estimates(&self) -> usize {
        self.estimate_calls.load(Ordering::SeqCst)
    }

    pub fn submit_times(&self) -> Vec<Instant> {
        self.script.lock().unwrap().submit_times.clone()
    }

    pub fn receipt_times(&self) -> Vec<Instant> {
        self.script.lock().unwrap().receipt_times.clone()
    }

    pub fn fee_times(&self) -> Vec<Instant> {
        self.script.lock().unwrap().fee_times.clone()
    }
}

fn check(cancel: &CancellationToken) -> BlockchainResult<()> {
    if cancel.is_cancelled() {
        Err(BlockchainError::Cancelled)
    } else {
        Ok(())
    }
}

#[async_trait]
impl ChainGateway for StubGateway {
    async fn balance_of(&self, _address: Address, cancel: &CancellationToken) -> BlockchainResult<U256> {
        check(cancel)?;
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.script.lock().unwrap().balance)
    }

    async fn current_base_fee(&self, cancel: &CancellationToken) -> BlockchainResult<u128> {
        check(cancel)?;
        let mut script = self.script.lock().unwrap();
        script.fee_times.push(Instant::now());
        let fee = if script.base_fees.len() > 1 {
            script.base_fees.pop_front()
        } else {
            script.base_fees.front().copied()
        };
        Ok(fee.unwrap_or(GWEI))
    }

    async fn suggested_priority_fee(&self, cancel: &CancellationToken) -> BlockchainResult<u128> {
        check(cancel)?;
        Ok(self.script.lock().unwrap().priority_fee)
    }

    async fn estimate_gas(&self, _call: &CallSpec, cancel: &CancellationToken) -> BlockchainResult<u64> {
        check(cancel)?;
        self.estimate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.script.lock().unwrap().gas)
    }

    async fn pending_nonce(&self, _address: Address, cancel: &CancellationToken) -> BlockchainResult<u64> {
        check(cancel)?;
        Ok(self.script.lock().unwrap().nonce)
    }

    async fn chain_id(&self, cancel: &CancellationToken) -> BlockchainResult<ChainId> {
        check(cancel)?;
        Ok(ChainId(self.script.lock().unwrap().chain_id))
    }

    async fn submit(&self, tx: &SignedTransaction, cancel: &CancellationToken) -> BlockchainResult<TxHash> {
        check(cancel)?;
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        script.submit_times.push(Instant::now());
        match script.submits.pop_front().unwrap_or(SubmitReply::Accept) {
            SubmitReply::Accept => Ok(tx.hash),
            SubmitReply::Rpc(message) => Err(BlockchainError::Rpc(message)),
            SubmitReply::Timeout => Err(BlockchainError::Timeout(10)),
        }
    }

    async fn receipt(&self, _hash: TxHash, cancel: &CancellationToken) -> BlockchainResult<Option<ReceiptStatus>> {
        check(cancel)?;
        self.receipt_calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        script.receipt_times.push(Instant::now());
        match script.receipts.pop_front().unwrap_or(ReceiptReply::Pending) {
            ReceiptReply::Pending => Ok(None),
            ReceiptReply::Success => Ok(Some(ReceiptStatus {
                success: true,
                block_number: Some(100),
                gas_used: 120_000,
            })),
            ReceiptReply::Reverted => Ok(Some(ReceiptStatus {
                success: false,
                block_number: Some(100),
                gas_used: 120_000,
            })),
            ReceiptReply::Rpc(message) => Err(BlockchainError::Rpc(message)),
        }
    }
}
