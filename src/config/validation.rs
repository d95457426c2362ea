//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check value ranges (min < max, intervals > 0, attempts >= 1)
//! - Cap every delay, interval and timeout at [`MAX_WAIT_SECS`]
//! - Check that the selected network has an endpoint
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: StakerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;
use std::fmt;

use crate::config::schema::StakerConfig;

/// Upper bound for any configured delay, interval or timeout: one day.
pub const MAX_WAIT_SECS: u64 = 86_400;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check_secs(errors: &mut Vec<ValidationError>, field: &'static str, secs: u64) {
    if secs == 0 {
        errors.push(ValidationError::new(field, "must be greater than 0"));
    } else if secs > MAX_WAIT_SECS {
        errors.push(ValidationError::new(
            field,
            format!("must not exceed {MAX_WAIT_SECS} seconds"),
        ));
    }
}

/// Validate a parsed configuration, collecting every problem.
pub fn validate_config(config: &StakerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !config.stake.min.is_finite() || config.stake.min < 0.0 {
        errors.push(ValidationError::new("stake.min", "must be a non-negative number"));
    }
    if !config.stake.max.is_finite() || config.stake.max <= config.stake.min {
        errors.push(ValidationError::new("stake.max", "must be greater than stake.min"));
    }

    if !config.delay.min_secs.is_finite() || config.delay.min_secs < 0.0 {
        errors.push(ValidationError::new("delay.min_secs", "must be a non-negative number"));
    }
    if !config.delay.max_secs.is_finite() || config.delay.max_secs <= config.delay.min_secs {
        errors.push(ValidationError::new("delay.max_secs", "must be greater than delay.min_secs"));
    } else if config.delay.max_secs > MAX_WAIT_SECS as f64 {
        errors.push(ValidationError::new(
            "delay.max_secs",
            format!("must not exceed {MAX_WAIT_SECS} seconds"),
        ));
    }

    if config.validators.is_empty() {
        errors.push(ValidationError::new("validators", "must list at least one validator"));
    }

    if config.private_keys_file.trim().is_empty() {
        errors.push(ValidationError::new("private_keys_file", "must not be empty"));
    }

    if config.chain.contract_address.parse::<Address>().is_err() {
        errors.push(ValidationError::new(
            "chain.contract_address",
            format!("'{}' is not a valid address", config.chain.contract_address),
        ));
    }

    if config.rpc.endpoints.is_empty() {
        errors.push(ValidationError::new("rpc.endpoints", "must define at least one endpoint"));
    } else if !config.rpc.endpoints.contains_key(&config.chain.network) {
        errors.push(ValidationError::new(
            "chain.network",
            format!("no endpoint named '{}' in rpc.endpoints", config.chain.network),
        ));
    }
    for (name, url) in &config.rpc.endpoints {
        if url.parse::<url::Url>().is_err() {
            errors.push(ValidationError::new(
                "rpc.endpoints",
                format!("endpoint '{name}' has an invalid URL '{url}'"),
            ));
        }
    }
    check_secs(&mut errors, "rpc.connect_timeout_secs", config.rpc.connect_timeout_secs);
    check_secs(&mut errors, "rpc.timeout_secs", config.rpc.timeout_secs);

    if !config.fees.max_fee_per_gas_gwei.is_finite() || config.fees.max_fee_per_gas_gwei <= 0.0 {
        errors.push(ValidationError::new("fees.max_fee_per_gas_gwei", "must be greater than 0"));
    }
    check_secs(&mut errors, "fees.poll_interval_secs", config.fees.poll_interval_secs);
    // A zero wait would time out before the first fee check.
    check_secs(&mut errors, "fees.max_wait_secs", config.fees.max_wait_secs);

    if config.broadcast.max_attempts == 0 {
        errors.push(ValidationError::new("broadcast.max_attempts", "must be at least 1"));
    }

    check_secs(&mut errors, "confirmation.poll_interval_secs", config.confirmation.poll_interval_secs);
    check_secs(&mut errors, "confirmation.timeout_secs", config.confirmation.timeout_secs);

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<std::net::SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
