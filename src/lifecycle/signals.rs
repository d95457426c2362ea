//! OS signal handling.
//!
//! The first SIGINT/SIGTERM triggers a graceful shutdown; a second one exits
//! the process immediately with status 130.

use crate::lifecycle::shutdown::Shutdown;

/// Exit status for a forced exit.
pub const FORCED_EXIT_CODE: i32 = 130;

/// Spawn the signal listener for `shutdown`.
pub fn spawn_signal_handler(shutdown: Shutdown) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = wait_for_signal().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signals");
            return;
        }
        tracing::warn!("Shutdown signal received, no new accounts will be started");
        shutdown.trigger();

        if let Err(e) = wait_for_signal().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signals");
            return;
        }
        tracing::error!("Second shutdown signal received, exiting immediately");
        std::process::exit(FORCED_EXIT_CODE);
    })
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
