//! Blockchain integration subsystem: the per-transaction lifecycle.
//!
//! # Data Flow
//! ```text
//! StakeRequest
//!     → transaction.rs (balance pre-flight, delegation call, nonce)
//!     → fees.rs        (fee quote under the ceiling)
//!     → signer.rs      (EIP-1559 signature, chain-bound)
//!     → broadcast.rs   (submit with bounded retry)
//!     → confirmation.rs (receipt polling)
//! all through client.rs (ChainGateway), obtained from registry.rs
//! ```
//!
//! # Security Constraints
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts and observe cancellation
//! - A submitted transaction is irrevocable; cancellation after broadcast
//!   only stops the local wait

pub mod broadcast;
pub mod client;
pub mod confirmation;
pub mod fees;
pub mod registry;
pub mod signer;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use broadcast::Broadcaster;
pub use client::{ChainGateway, RpcGateway};
pub use confirmation::{ConfirmationWatcher, WatchPolicy};
pub use fees::{FeeGate, FeePolicy};
pub use registry::GatewayRegistry;
pub use signer::sign_transaction;
pub use transaction::TxBuilder;
pub use types::{BlockchainError, BlockchainResult, ChainId};
pub use wallet::Account;
