//! Signal handling for graceful shutdown.
//!
//! The first SIGINT/SIGTERM (Ctrl+C on Windows) stops the tick loop after
//! the current tick; a second one exits immediately.

use tokio::signal;
use tracing::info;

/// Waits for a termination signal and logs it.
pub async fn wait_for_shutdown_signal() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    wait_for_shutdown_signal_silent().await?;
    info!("📡 Received shutdown signal - finishing the current tick");
    Ok(())
}

/// Waits for a termination signal without logging.
pub async fn wait_for_shutdown_signal_silent() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    #[cfg(unix)]
    {
        use signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => (),
            _ = sigterm.recv() => ()
        }
    }

    #[cfg(windows)]
    signal::ctrl_c().await?;

    Ok(())
}
