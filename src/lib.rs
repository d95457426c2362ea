//! Automated native-coin staking across many accounts.

pub mod blockchain;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod staking;

pub use config::schema::StakerConfig;
pub use lifecycle::Shutdown;
pub use staking::{StakeOrchestrator, StakePipeline};
