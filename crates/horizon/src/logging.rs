//! Logging system setup.
//!
//! Initializes `tracing-subscriber` with either human-readable or JSON
//! output. `RUST_LOG` takes precedence over the configured level.

use crate::config::LoggingSettings;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global subscriber.
///
/// # Arguments
///
/// * `config` - Logging configuration from the config file
/// * `json_format` - Forces JSON output regardless of `config`
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn setup_logging(
    config: &LoggingSettings,
    json_format: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = config.level.as_str();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if json_format || config.json_format {
        registry
            .with(fmt::layer()
                .json()
                .with_file(false)
                .with_line_number(false)
                .with_thread_ids(true)
                .with_thread_names(true)
            )
            .try_init()?;
    } else {
        registry
            .with(fmt::layer()
                .with_ansi(true)
                .with_file(false)
                .with_line_number(false)
                .with_target(false)
            )
            .try_init()?;
    }

    info!("🔧 Logging initialized with level: {}", log_level);
    Ok(())
}

/// Logs the startup banner.
pub fn display_banner() {
    let version = option_env!("CARGO_PKG_VERSION").unwrap_or("UNK");
    info!("╔══════════════════════════════════════════╗");
    info!("║        🧭 HORIZON RELEVANCY HOST 🧭      ║");
    info!("║                 v{:<8}                ║", version);
    info!("║                                          ║");
    info!("║  Actor-to-connection relevancy routing   ║");
    info!("║  🌐 Global   📍 Spatial                  ║");
    info!("║  👤 Owner    👥 Team                     ║");
    info!("╚══════════════════════════════════════════╝");
}
