//! Signal handling for graceful shutdown.

use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::watch;

/// Creates a future that completes when a shutdown signal is received.
///
/// Listens for SIGTERM and SIGINT (Ctrl+C).
pub async fn shutdown_signal() -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT, initiating graceful shutdown");
        }
    }
    Ok(())
}

/// Spawns a task that flips `shutdown_tx` to `true` on SIGTERM or SIGINT.
pub fn spawn_shutdown_handler(shutdown_tx: Arc<watch::Sender<bool>>) {
    tokio::spawn(async move {
        if let Err(e) = shutdown_signal().await {
            tracing::error!("Failed to install signal handlers: {}", e);
            return;
        }
        shutdown_tx.send_replace(true);
    });
}
