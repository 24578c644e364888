//! Relevancy Configuration Management
//!
//! Configuration structures for the relevancy router: tick rate, spatial
//! index tuning, destruction info range, frequency buckets, and the explicit
//! policy and replication presets fed to the class table.

use crate::classification::{default_pawn_preset, PolicyPreset, ReplicationInfoPreset};
use serde::{Deserialize, Serialize};

/// Lower clamp for cell size and destruction info distance
pub const MIN_WORLD_DISTANCE: f64 = 1000.0;
/// Upper clamp for cell size and destruction info distance
pub const MAX_WORLD_DISTANCE: f64 = 100000.0;

/// Complete relevancy router configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevancyConfig {
    /// Server simulation rate in Hz, used to derive replication periods
    pub server_tick_rate: f32,
    /// Spatial index configuration
    pub spatial: SpatialConfig,
    /// Maximum distance at which destruction infos are replicated
    pub destruction_info_max_distance: f64,
    /// List size handed to the external frequency-bucket consumer
    pub frequency_bucket_list_size: usize,
    /// Explicit type → policy overrides, applied after the built-ins
    pub policy_presets: Vec<PolicyPreset>,
    /// Explicit type → replication parameter presets
    pub replication_presets: Vec<ReplicationInfoPreset>,
}

impl Default for RelevancyConfig {
    fn default() -> Self {
        Self {
            server_tick_rate: 30.0,
            spatial: SpatialConfig::default(),
            destruction_info_max_distance: 30000.0,
            frequency_bucket_list_size: 12,
            policy_presets: Vec::new(),
            replication_presets: vec![default_pawn_preset()],
        }
    }
}

/// Spatial index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Grid cell edge length in world units
    pub cell_size: f64,
    /// World-space origin offset of the grid (x, y)
    pub spatial_bias: (f64, f64),
    /// Rebuild the grid when an object leaves the biased bounds
    pub enable_spatial_rebuilds: bool,
    /// Types that never trigger a rebuild while rebuilds are enabled
    pub rebuild_blacklist: Vec<String>,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            cell_size: 10000.0,
            spatial_bias: (-150000.0, -200000.0),
            enable_spatial_rebuilds: false,
            rebuild_blacklist: Vec::new(),
        }
    }
}

impl SpatialConfig {
    /// Cell size clamped to the supported range.
    pub fn clamped_cell_size(&self) -> f64 {
        self.cell_size.clamp(MIN_WORLD_DISTANCE, MAX_WORLD_DISTANCE)
    }
}

impl RelevancyConfig {
    /// Destruction info distance clamped to the supported range.
    pub fn clamped_destruction_distance(&self) -> f64 {
        self.destruction_info_max_distance
            .clamp(MIN_WORLD_DISTANCE, MAX_WORLD_DISTANCE)
    }

    /// Validates the configuration and returns the first error found
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.server_tick_rate > 0.0) {
            return Err(ConfigValidationError::InvalidValue(
                "server_tick_rate must be > 0".to_string(),
            ));
        }

        if self.server_tick_rate > 1000.0 {
            return Err(ConfigValidationError::InvalidValue(
                "server_tick_rate cannot exceed 1000".to_string(),
            ));
        }

        if self.spatial.cell_size <= 0.0 {
            return Err(ConfigValidationError::InvalidValue(
                "spatial.cell_size must be > 0".to_string(),
            ));
        }

        if self.destruction_info_max_distance <= 0.0 {
            return Err(ConfigValidationError::InvalidValue(
                "destruction_info_max_distance must be > 0".to_string(),
            ));
        }

        if self.frequency_bucket_list_size == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "frequency_bucket_list_size must be > 0".to_string(),
            ));
        }

        if !self.spatial.enable_spatial_rebuilds && !self.spatial.rebuild_blacklist.is_empty() {
            return Err(ConfigValidationError::Conflict(
                "spatial.rebuild_blacklist is set but spatial rebuilds are disabled".to_string(),
            ));
        }

        for preset in &self.policy_presets {
            if preset.class.is_empty() {
                return Err(ConfigValidationError::MissingRequired(
                    "policy_presets[].class".to_string(),
                ));
            }
        }

        for preset in &self.replication_presets {
            if preset.class.is_empty() {
                return Err(ConfigValidationError::MissingRequired(
                    "replication_presets[].class".to_string(),
                ));
            }
            if !(0.0..=1.0).contains(&preset.distance_priority_scale)
                || !(0.0..=1.0).contains(&preset.starvation_priority_scale)
            {
                return Err(ConfigValidationError::InvalidValue(format!(
                    "priority scales for {} must be between 0.0 and 1.0",
                    preset.class
                )));
            }
        }

        Ok(())
    }
}

/// Configuration builder for easier setup
pub struct RelevancyConfigBuilder {
    config: RelevancyConfig,
}

impl RelevancyConfigBuilder {
    /// Creates a new configuration builder with default values
    pub fn new() -> Self {
        Self {
            config: RelevancyConfig::default(),
        }
    }

    /// Sets the server tick rate in Hz
    pub fn with_tick_rate(mut self, tick_rate: f32) -> Self {
        self.config.server_tick_rate = tick_rate;
        self
    }

    /// Sets grid cell size and origin bias
    pub fn with_grid(mut self, cell_size: f64, bias_x: f64, bias_y: f64) -> Self {
        self.config.spatial.cell_size = cell_size;
        self.config.spatial.spatial_bias = (bias_x, bias_y);
        self
    }

    /// Enables spatial rebuilds, excluding the given types
    pub fn with_spatial_rebuilds(mut self, blacklist: Vec<String>) -> Self {
        self.config.spatial.enable_spatial_rebuilds = true;
        self.config.spatial.rebuild_blacklist = blacklist;
        self
    }

    /// Sets the destruction info distance
    pub fn with_destruction_distance(mut self, distance: f64) -> Self {
        self.config.destruction_info_max_distance = distance;
        self
    }

    /// Sets the frequency bucket list size
    pub fn with_frequency_buckets(mut self, list_size: usize) -> Self {
        self.config.frequency_bucket_list_size = list_size;
        self
    }

    /// Appends an explicit policy override
    pub fn with_policy(mut self, preset: PolicyPreset) -> Self {
        self.config.policy_presets.push(preset);
        self
    }

    /// Appends a replication parameter preset
    pub fn with_replication_preset(mut self, preset: ReplicationInfoPreset) -> Self {
        self.config.replication_presets.push(preset);
        self
    }

    /// Builds the final configuration
    pub fn build(self) -> RelevancyConfig {
        self.config
    }
}

impl Default for RelevancyConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Preset configurations for common use cases
pub mod presets {
    use super::*;

    /// Fast-paced arena: high tick rate, small cells
    pub fn competitive() -> RelevancyConfig {
        RelevancyConfigBuilder::new()
            .with_tick_rate(60.0)
            .with_grid(5000.0, -50000.0, -50000.0)
            .with_destruction_distance(15000.0)
            .build()
    }

    /// Large open world with rebuilds for objects leaving the grid
    pub fn open_world() -> RelevancyConfig {
        RelevancyConfigBuilder::new()
            .with_tick_rate(30.0)
            .with_grid(20000.0, -400000.0, -400000.0)
            .with_spatial_rebuilds(Vec::new())
            .with_destruction_distance(60000.0)
            .build()
    }

    /// Testing configuration with a single frequency bucket
    pub fn testing() -> RelevancyConfig {
        RelevancyConfigBuilder::new()
            .with_tick_rate(30.0)
            .with_frequency_buckets(1)
            .build()
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
    #[error("Conflicting configuration: {0}")]
    Conflict(String),
}
