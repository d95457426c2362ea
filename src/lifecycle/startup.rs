//! Startup orchestration.
//!
//! # Order
//! 1. Derive run parameters (fails on unusable config values)
//! 2. Load accounts from the key file
//! 3. Connect every configured RPC endpoint
//! 4. Pick the gateway for the configured network
//!
//! Fail fast: any startup error is fatal and nothing is submitted.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::blockchain::types::BlockchainError;
use crate::blockchain::wallet::{load_accounts, Account, AccountError};
use crate::blockchain::{ChainGateway, GatewayRegistry};
use crate::config::{ConfigError, StakerConfig};
use crate::staking::types::RunParameters;

/// Errors that abort the process before any account is started.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to load accounts from {path}: {source}")]
    Accounts {
        path: PathBuf,
        #[source]
        source: AccountError,
    },

    #[error(transparent)]
    Gateway(#[from] BlockchainError),

    #[error("No RPC endpoint named '{0}' is configured")]
    UnknownNetwork(String),
}

/// Everything a run needs, ready to go.
pub struct Startup {
    pub params: RunParameters,
    pub accounts: Vec<Account>,
    pub registry: GatewayRegistry,
    pub gateway: Arc<dyn ChainGateway>,
}

/// Key file path: the override if given, else the configured one.
pub fn keys_path(config: &StakerConfig, keys_override: Option<&Path>) -> PathBuf {
    keys_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.private_keys_file))
}

/// Bring up everything a run depends on.
pub async fn prepare(
    config: &StakerConfig,
    keys_override: Option<&Path>,
    cancel: &CancellationToken,
) -> Result<Startup, StartupError> {
    let params = RunParameters::from_config(config)?;

    let path = keys_path(config, keys_override);
    let accounts = load_accounts(&path).map_err(|source| StartupError::Accounts {
        path: path.clone(),
        source,
    })?;
    tracing::info!(accounts = accounts.len(), path = %path.display(), "Accounts loaded");

    let registry = GatewayRegistry::connect(&config.rpc, cancel).await?;
    let network = &config.chain.network;
    let gateway = registry
        .get(network)
        .ok_or_else(|| StartupError::UnknownNetwork(network.clone()))?;
    tracing::info!(network = %network, contract = %params.contract, "Chain gateway selected");

    Ok(Startup {
        params,
        accounts,
        registry,
        gateway,
    })
}
