//! Configuration management for the Horizon relevancy host.
//!
//! This module handles loading and validation of the host configuration
//! from TOML files. The `[relevancy]` table is handed to the router as-is;
//! `[[classes]]` entries extend the engine's built-in type hierarchy.

use horizon_relevancy::{engine_base_classes, ClassDescriptor, ClassHierarchy, RelevancyConfig, RelevancyError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

fn default_stats_interval_secs() -> u64 {
    60
}

fn default_world_extent() -> f64 {
    20000.0
}

fn default_bot_speed() -> f64 {
    600.0
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Host loop settings
    pub server: ServerSettings,
    /// Logging configuration settings
    pub logging: LoggingSettings,
    /// Router configuration
    #[serde(default)]
    pub relevancy: RelevancyConfig,
    /// Game types registered on top of the engine base types
    #[serde(default)]
    pub classes: Vec<ClassDescriptor>,
}

/// Host loop settings.
///
/// The tick rate itself lives in `relevancy.server_tick_rate` since the
/// router derives replication periods from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Seconds between routing statistics reports
    #[serde(default = "default_stats_interval_secs")]
    pub stats_interval_secs: u64,
    /// Simulated bot connections spawned at startup
    #[serde(default)]
    pub bots: usize,
    /// Half-width of the square bots wander in
    #[serde(default = "default_world_extent")]
    pub world_extent: f64,
    /// Bot movement speed in units per second
    #[serde(default = "default_bot_speed")]
    pub bot_speed: f64,
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    pub json_format: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                stats_interval_secs: default_stats_interval_secs(),
                bots: 0,
                world_extent: default_world_extent(),
                bot_speed: default_bot_speed(),
            },
            logging: LoggingSettings {
                level: "info".to_string(),
                json_format: false,
            },
            relevancy: RelevancyConfig::default(),
            classes: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, creates a default configuration file at
    /// the specified path and returns the default configuration.
    pub async fn load_from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Builds the type hierarchy: engine base types, then `[[classes]]` in
    /// file order. A class may only name a parent registered before it.
    pub fn build_hierarchy(&self) -> Result<ClassHierarchy, RelevancyError> {
        let mut descriptors = engine_base_classes();
        descriptors.extend(self.classes.iter().cloned());
        ClassHierarchy::from_descriptors(descriptors)
    }

    /// Validates the configuration for consistency and correctness.
    pub fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        if self.server.stats_interval_secs == 0 {
            return Err("server.stats_interval_secs must be greater than 0".to_string());
        }

        if !(self.server.world_extent > 0.0) {
            return Err("server.world_extent must be greater than 0".to_string());
        }

        if self.server.bot_speed < 0.0 {
            return Err("server.bot_speed cannot be negative".to_string());
        }

        if let Some(class) = self.classes.iter().find(|class| class.name.is_empty()) {
            return Err(format!("Class with parent {:?} has an empty name", class.parent));
        }

        self.relevancy
            .validate()
            .map_err(|e| format!("relevancy: {e}"))?;

        self.build_hierarchy()
            .map_err(|e| format!("classes: {e}"))?;

        Ok(())
    }
}
