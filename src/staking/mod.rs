//! Staking run subsystem.
//!
//! # Data Flow
//! ```text
//! StakerConfig → types.rs (RunParameters)
//! accounts → orchestrator.rs
//!     → sampling.rs (amount, validator, delay per account)
//!     → pipeline.rs (one task per account, through blockchain/)
//!     → report.rs   (outcome log line, RunStats)
//! ```

pub mod orchestrator;
pub mod pipeline;
pub mod report;
pub mod sampling;
pub mod types;

pub use orchestrator::StakeOrchestrator;
pub use pipeline::{PipelineSettings, StakePipeline};
pub use report::{RunStats, RunSummary};
pub use types::{
    AmountRange, DelayRange, OutcomeStatus, RunParameters, StakeRequest, TaskState, TransactionOutcome, ValidatorId,
    ValidatorSet,
};
