//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a staking run.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default staking contract: the Monad staking precompile.
pub const DEFAULT_STAKING_CONTRACT: &str = "0x0000000000000000000000000000000000001000";

/// Root configuration for the staker.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StakerConfig {
    /// Path to the line-delimited private key file.
    pub private_keys_file: String,

    /// Validator identifiers to delegate to. One is picked per account.
    pub validators: Vec<u64>,

    /// Stake amount range in whole coins (fractions allowed).
    pub stake: StakeRangeConfig,

    /// Delay between launching successive accounts.
    pub delay: DelayRangeConfig,

    /// Target chain and staking contract.
    pub chain: ChainConfig,

    /// RPC endpoints and request deadlines.
    pub rpc: RpcConfig,

    /// Fee ceiling and the wait for affordable fees.
    pub fees: FeeConfig,

    /// Broadcast retry settings.
    pub broadcast: BroadcastConfig,

    /// Receipt polling settings.
    pub confirmation: ConfirmationConfig,

    /// Process shutdown settings.
    pub shutdown: ShutdownConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Stake amount range, `[min, max)` in coins.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StakeRangeConfig {
    pub min: f64,
    pub max: f64,
}

impl Default for StakeRangeConfig {
    fn default() -> Self {
        Self { min: 0.1, max: 0.5 }
    }
}

/// Inter-account delay range, `[min_secs, max_secs)`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DelayRangeConfig {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl Default for DelayRangeConfig {
    fn default() -> Self {
        Self {
            min_secs: 10.0,
            max_secs: 60.0,
        }
    }
}

/// Chain configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Name of the RPC endpoint (in `rpc.endpoints`) to stake through.
    pub network: String,

    /// Staking contract receiving the delegation calls.
    pub contract_address: String,

    /// Explorer prefix; the transaction hash is appended as `/<hash>`.
    pub explorer_tx_url: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            network: "monad-testnet".to_string(),
            contract_address: DEFAULT_STAKING_CONTRACT.to_string(),
            explorer_tx_url: "https://testnet.monadexplorer.com/tx".to_string(),
        }
    }
}

/// RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Named JSON-RPC endpoint URLs.
    pub endpoints: BTreeMap<String, String>,

    /// Deadline for the initial reachability probe, in seconds.
    pub connect_timeout_secs: u64,

    /// Deadline for every subsequent RPC request, in seconds.
    pub timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        let mut endpoints = BTreeMap::new();
        endpoints.insert(
            "monad-testnet".to_string(),
            "https://testnet-rpc.monad.xyz".to_string(),
        );
        Self {
            endpoints,
            connect_timeout_secs: 10,
            timeout_secs: 10,
        }
    }
}

/// Fee gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeeConfig {
    /// Maximum acceptable `baseFee + priorityFee`, in gwei.
    pub max_fee_per_gas_gwei: f64,

    /// How often to re-check the chain head while fees are too high.
    pub poll_interval_secs: u64,

    /// Give up after waiting this long for affordable fees.
    pub max_wait_secs: u64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            max_fee_per_gas_gwei: 3.0,
            poll_interval_secs: 5,
            max_wait_secs: 300,
        }
    }
}

impl FeeConfig {
    /// The ceiling converted to wei.
    pub fn ceiling_wei(&self) -> u128 {
        (self.max_fee_per_gas_gwei * 1e9).round() as u128
    }
}

/// Broadcast retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Maximum number of submission attempts (including the first).
    pub max_attempts: u32,

    /// Fixed delay between attempts, in seconds.
    pub backoff_secs: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_secs: 2,
        }
    }
}

/// Confirmation polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    pub poll_interval_secs: u64,
    pub timeout_secs: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 3,
            timeout_secs: 60,
        }
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How long in-flight accounts may keep running after cancellation.
    pub grace_period_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
