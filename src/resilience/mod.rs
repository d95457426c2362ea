//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to the chain RPC:
//!     → timeouts.rs (enforce request deadline, observe cancellation)
//!     → On broadcast failure: retries.rs (classify terminal vs transient,
//!       fixed backoff between attempts)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Cancellation wins over a pending result at every suspension point
//! - Only transient failures are retried; terminal ones abort at once

pub mod retries;
pub mod timeouts;
