//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → StakerConfig (validated, immutable)
//!     → RunParameters / component settings, built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable for the duration of a run
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BroadcastConfig, ChainConfig, ConfirmationConfig, DelayRangeConfig, FeeConfig, LogFormat,
    ObservabilityConfig, RpcConfig, ShutdownConfig, StakeRangeConfig, StakerConfig,
};
