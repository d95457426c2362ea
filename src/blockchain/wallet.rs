//! Staking accounts and private key loading.
//!
//! # Security
//! - Keys are never logged or serialized
//! - `Debug` output shows the address only

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading accounts. Fatal at startup.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Failed to read private key file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Private key file contains no keys")]
    Empty,

    #[error("Invalid private key on line {line}: {reason}")]
    InvalidKey { line: usize, reason: String },
}

/// One wallet taking part in the run. Immutable once loaded.
#[derive(Clone)]
pub struct Account {
    address: Address,
    signer: PrivateKeySigner,
}

impl Account {
    /// Create an account from a hex-encoded private key.
    ///
    /// Accepts exactly 32 bytes of hex with an optional `0x` prefix.
    pub fn from_private_key(private_key_hex: &str) -> Result<Self, String> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        if key_hex.len() != 64 {
            return Err(format!("expected 64 hex characters, got {}", key_hex.len()));
        }
        if !key_hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("contains non-hexadecimal characters".to_string());
        }

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| format!("Invalid private key format: {}", e))?;

        Ok(Self {
            address: signer.address(),
            signer,
        })
    }

    /// The account's address, derived from its key.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The signing key.
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .finish()
    }
}

/// Parse a line-delimited list of private keys.
///
/// Blank lines are skipped and surrounding whitespace is ignored. Errors name
/// the 1-based line of the offending key.
pub fn parse_accounts(contents: &str) -> Result<Vec<Account>, AccountError> {
    let mut accounts = Vec::new();

    for (idx, line) in contents.lines().enumerate() {
        let key = line.trim();
        if key.is_empty() {
            continue;
        }
        let account = Account::from_private_key(key)
            .map_err(|reason| AccountError::InvalidKey { line: idx + 1, reason })?;
        accounts.push(account);
    }

    if accounts.is_empty() {
        return Err(AccountError::Empty);
    }
    Ok(accounts)
}

/// Load accounts from a private key file.
pub fn load_accounts(path: &Path) -> Result<Vec<Account>, AccountError> {
    let contents = fs::read_to_string(path)?;
    let accounts = parse_accounts(&contents)?;
    tracing::info!(path = %path.display(), count = accounts.len(), "Accounts loaded");
    Ok(accounts)
}
