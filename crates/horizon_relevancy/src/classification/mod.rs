//! # Classification
//!
//! Maps every host type to exactly one [`RoutingPolicy`] and to the per-type
//! replication parameters the external scheduler consumes.
//!
//! The [`ClassTable`] is built once from the [`ClassHierarchy`] and the
//! configured presets, then only read. Policies are stored sparsely: a
//! subtype whose relevancy flags match its parent gets no entry of its own
//! and resolves through its nearest ancestor.

mod hierarchy;
mod table;

pub use hierarchy::{
    engine_base_classes, ClassDescriptor, ClassHierarchy, Lineage, ACTOR_CLASS,
    DEBUG_ACTOR_CLASS, GAMEPLAY_DEBUGGER_CLASS, INFO_CLASS, LEVEL_SCRIPT_CLASS, PAWN_CLASS,
};
pub use table::ClassTable;

use serde::{Deserialize, Serialize};

/// Routing rule for a type. Each variant maps to one container.
///
/// Variants from [`RoutingPolicy::SpatialStatic`] onwards are spatialized;
/// the declaration order is relied upon by [`RoutingPolicy::is_spatialized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoutingPolicy {
    /// Not routed to any container; the host replicates it by other means
    NotRouted,
    /// Relevant to every connection
    RelevantAll,
    /// Relevant to the owning connection only
    RelevantOwner,
    /// Relevant to every connection on the owner's team
    RelevantTeam,
    /// Spatial index; does not move
    SpatialStatic,
    /// Spatial index; moves every frame
    SpatialDynamic,
    /// Spatial index; static while dormant, dynamic while awake
    SpatialDormancy,
}

impl RoutingPolicy {
    /// Whether the policy routes into the spatial index.
    pub fn is_spatialized(self) -> bool {
        self >= RoutingPolicy::SpatialStatic
    }

    /// Whether the policy routes into per-connection containers.
    pub fn is_connection_specific(self) -> bool {
        matches!(self, RoutingPolicy::RelevantOwner | RoutingPolicy::RelevantTeam)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoutingPolicy::NotRouted => "NotRouted",
            RoutingPolicy::RelevantAll => "RelevantAll",
            RoutingPolicy::RelevantOwner => "RelevantOwner",
            RoutingPolicy::RelevantTeam => "RelevantTeam",
            RoutingPolicy::SpatialStatic => "SpatialStatic",
            RoutingPolicy::SpatialDynamic => "SpatialDynamic",
            RoutingPolicy::SpatialDormancy => "SpatialDormancy",
        }
    }
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        RoutingPolicy::NotRouted
    }
}

impl std::fmt::Display for RoutingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-type replication parameters handed to the external scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassReplicationInfo {
    /// How much distance to the viewer affects priority (0..=1)
    pub distance_priority_scale: f32,
    /// How much starvation affects priority (0..=1)
    pub starvation_priority_scale: f32,
    /// Squared cull distance; 0 for non-spatialized types
    pub cull_distance_squared: f32,
    /// Server frames between replications, at least 1
    pub replication_period_frames: u32,
    /// Frames a channel stays open after the object stops being relevant
    pub channel_timeout_frames: u32,
}

impl Default for ClassReplicationInfo {
    fn default() -> Self {
        Self {
            distance_priority_scale: 1.0,
            starvation_priority_scale: 1.0,
            cull_distance_squared: 0.0,
            replication_period_frames: 1,
            channel_timeout_frames: 4,
        }
    }
}

impl ClassReplicationInfo {
    /// Diagnostic string listing only fields that differ from the defaults.
    pub fn debug_string_delta(&self) -> String {
        let defaults = ClassReplicationInfo::default();
        let mut parts = Vec::new();
        if self.distance_priority_scale != defaults.distance_priority_scale {
            parts.push(format!("DistanceScale: {:.2}", self.distance_priority_scale));
        }
        if self.starvation_priority_scale != defaults.starvation_priority_scale {
            parts.push(format!("StarvationScale: {:.2}", self.starvation_priority_scale));
        }
        if self.cull_distance_squared != defaults.cull_distance_squared {
            parts.push(format!("CullDist: {:.0}", self.cull_distance_squared.sqrt()));
        }
        if self.replication_period_frames != defaults.replication_period_frames {
            parts.push(format!("RepPeriod: {}", self.replication_period_frames));
        }
        if self.channel_timeout_frames != defaults.channel_timeout_frames {
            parts.push(format!("ChannelTimeout: {}", self.channel_timeout_frames));
        }
        if parts.is_empty() {
            "Default".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// Resolved routing policy plus replication parameters of one type.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassPolicy {
    /// Container the type routes to
    pub policy: RoutingPolicy,
    /// Parameters for the scheduler
    pub replication: ClassReplicationInfo,
}

/// Explicit policy override for a type, keyed by type name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyPreset {
    /// Type the override applies to (and, through inheritance, its subtypes)
    pub class: String,
    /// Policy to apply
    pub policy: RoutingPolicy,
}

impl PolicyPreset {
    pub fn new(class: impl Into<String>, policy: RoutingPolicy) -> Self {
        Self { class: class.into(), policy }
    }
}

fn default_scale() -> f32 {
    1.0
}

fn default_period() -> u32 {
    1
}

fn default_timeout() -> u32 {
    4
}

fn default_include_children() -> bool {
    true
}

/// Explicit replication parameters for a type, keyed by type name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationInfoPreset {
    /// Type the parameters apply to
    pub class: String,
    /// How much distance affects priority (clamped to 0..=1)
    #[serde(default = "default_scale")]
    pub distance_priority_scale: f32,
    /// How much starvation affects priority (clamped to 0..=1)
    #[serde(default = "default_scale")]
    pub starvation_priority_scale: f32,
    /// Squared cull distance overriding the type default
    #[serde(default)]
    pub cull_distance_squared: f32,
    /// Server frames per replication
    #[serde(default = "default_period")]
    pub replication_period_frames: u32,
    /// Channel keep-alive in frames after relevancy is lost
    #[serde(default = "default_timeout")]
    pub channel_timeout_frames: u32,
    /// Whether subtypes use this preset instead of computed defaults
    #[serde(default = "default_include_children")]
    pub include_child_classes: bool,
}

impl ReplicationInfoPreset {
    /// Preset with default parameters for a type.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            distance_priority_scale: default_scale(),
            starvation_priority_scale: default_scale(),
            cull_distance_squared: 0.0,
            replication_period_frames: default_period(),
            channel_timeout_frames: default_timeout(),
            include_child_classes: default_include_children(),
        }
    }

    /// Converts to replication parameters, clamping out-of-range values.
    pub fn to_info(&self) -> ClassReplicationInfo {
        ClassReplicationInfo {
            distance_priority_scale: self.distance_priority_scale.clamp(0.0, 1.0),
            starvation_priority_scale: self.starvation_priority_scale.clamp(0.0, 1.0),
            cull_distance_squared: self.cull_distance_squared.max(0.0),
            replication_period_frames: self.replication_period_frames.max(1),
            channel_timeout_frames: self.channel_timeout_frames,
        }
    }
}

/// Preset applied to pawns by default.
///
/// The cull distance stays well above the gap between a pawn and the
/// viewer's camera so culling does not flicker.
pub fn default_pawn_preset() -> ReplicationInfoPreset {
    ReplicationInfoPreset {
        cull_distance_squared: 15000.0 * 15000.0,
        ..ReplicationInfoPreset::new(PAWN_CLASS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spatialized_ordering() {
        assert!(!RoutingPolicy::NotRouted.is_spatialized());
        assert!(!RoutingPolicy::RelevantAll.is_spatialized());
        assert!(!RoutingPolicy::RelevantOwner.is_spatialized());
        assert!(!RoutingPolicy::RelevantTeam.is_spatialized());
        assert!(RoutingPolicy::SpatialStatic.is_spatialized());
        assert!(RoutingPolicy::SpatialDynamic.is_spatialized());
        assert!(RoutingPolicy::SpatialDormancy.is_spatialized());
    }

    #[test]
    fn test_preset_clamps_values() {
        let preset = ReplicationInfoPreset {
            distance_priority_scale: 3.0,
            starvation_priority_scale: -1.0,
            cull_distance_squared: -5.0,
            replication_period_frames: 0,
            ..ReplicationInfoPreset::new("Thing")
        };
        let info = preset.to_info();
        assert_eq!(info.distance_priority_scale, 1.0);
        assert_eq!(info.starvation_priority_scale, 0.0);
        assert_eq!(info.cull_distance_squared, 0.0);
        assert_eq!(info.replication_period_frames, 1);
        assert_eq!(info.channel_timeout_frames, 4);
    }

    #[test]
    fn test_debug_string_delta_lists_changes_only() {
        assert_eq!(ClassReplicationInfo::default().debug_string_delta(), "Default");
        let info = ClassReplicationInfo {
            replication_period_frames: 3,
            ..ClassReplicationInfo::default()
        };
        assert_eq!(info.debug_string_delta(), "RepPeriod: 3");
    }

    #[test]
    fn test_policy_preset_deserializes_from_toml() {
        let preset: PolicyPreset = toml::from_str(
            r#"
class = "Flag"
policy = "RelevantTeam"
"#,
        )
        .unwrap();
        assert_eq!(preset.policy, RoutingPolicy::RelevantTeam);
        assert_eq!(preset.class, "Flag");
    }
}
