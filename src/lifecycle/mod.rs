//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Run parameters → Accounts → Gateways
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop launching → Drain tasks (grace period) → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     Second signal  → Immediate exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then accounts, then network
//! - Shutdown has timeout: abandoned tasks after the grace period

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{drain, Shutdown};
