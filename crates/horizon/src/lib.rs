//! # Horizon Relevancy Host
//!
//! Runs the [`horizon_relevancy`] router at a fixed tick rate, optionally
//! populated with simulated bot connections, and exposes its admin console
//! on stdin.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run with default configuration (writes config.toml if missing)
//! horizon
//!
//! # Custom configuration, 64 bots at 60 Hz
//! horizon --config production.toml --bots 64 --tick-rate 60
//!
//! # JSON logging for production
//! horizon --json-logs
//! ```
//!
//! ## Signal Handling
//!
//! SIGINT (Ctrl+C) and SIGTERM stop the loop after the current tick. A
//! second signal exits immediately.

use tracing::error;

pub mod app;
pub mod bots;
pub mod cli;
pub mod config;
pub mod logging;
pub mod signals;

use app::Application;
use cli::CliArgs;
use config::AppConfig;

pub use config::{LoggingSettings, ServerSettings};

/// Runs the host: parse arguments, set up logging, build and run the
/// application.
///
/// # Exit Codes
///
/// * **0**: Successful execution and shutdown
/// * **1**: Error during startup, configuration, or runtime
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Logging settings come from the file, so load it once up front.
    let mut config = AppConfig::load_from_file(&args.config_path)
        .await
        .unwrap_or_default();
    app::apply_overrides(&mut config, &args);

    if let Err(e) = logging::setup_logging(&config.logging, args.json_logs) {
        eprintln!("❌ Failed to setup logging: {e}");
        std::process::exit(1);
    }

    match Application::new(args).await {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("❌ Application error: {:?}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("❌ Failed to start application: {e:?}");
            std::process::exit(1);
        }
    }

    Ok(())
}
