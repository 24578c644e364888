use super::hierarchy::{
    ClassHierarchy, DEBUG_ACTOR_CLASS, GAMEPLAY_DEBUGGER_CLASS, INFO_CLASS, LEVEL_SCRIPT_CLASS,
};
use super::{ClassPolicy, ClassReplicationInfo, PolicyPreset, ReplicationInfoPreset, RoutingPolicy};
use crate::types::ClassId;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

const SYNTHETIC_PREFIXES: [&str; 2] = ["SKEL_", "REINST_"];

/// Read-only type → policy and type → parameters table.
///
/// Policies and parameters are stored sparsely and resolved through the
/// nearest ancestor that has an entry. Resolution is precomputed for every
/// registered type during [`ClassTable::build`], so lookups never walk the
/// hierarchy at routing time.
#[derive(Debug, Clone, Default)]
pub struct ClassTable {
    names: Vec<String>,
    policy_entries: BTreeMap<ClassId, RoutingPolicy>,
    info_entries: BTreeMap<ClassId, ClassReplicationInfo>,
    resolved_policies: Vec<RoutingPolicy>,
    resolved_infos: Vec<ClassReplicationInfo>,
}

impl ClassTable {
    /// Builds the table.
    ///
    /// Built-in special cases are seeded first, explicit policy presets next
    /// (a later preset for the same type replaces an earlier one), and only
    /// then are policies inferred from relevancy flags for types that have
    /// no entry and whose flags differ from their parent's.
    pub fn build(
        hierarchy: &ClassHierarchy,
        policy_presets: &[PolicyPreset],
        info_presets: &[ReplicationInfoPreset],
        server_tick_rate: f32,
    ) -> Self {
        let mut table = ClassTable {
            names: hierarchy.iter().map(|(_, d)| d.name.clone()).collect(),
            ..ClassTable::default()
        };

        let builtins = [
            (DEBUG_ACTOR_CLASS, RoutingPolicy::NotRouted),
            (INFO_CLASS, RoutingPolicy::RelevantAll),
            (LEVEL_SCRIPT_CLASS, RoutingPolicy::NotRouted),
            (GAMEPLAY_DEBUGGER_CLASS, RoutingPolicy::RelevantOwner),
        ];
        for (name, policy) in builtins {
            if let Some(class) = hierarchy.find(name) {
                table.policy_entries.insert(class, policy);
            }
        }

        for preset in policy_presets {
            match hierarchy.find(&preset.class) {
                Some(class) => {
                    table.policy_entries.insert(class, preset.policy);
                }
                None => warn!("⚠️ Policy preset names unknown class '{}', ignoring", preset.class),
            }
        }

        let mut replicated_classes = Vec::new();
        for (class, descriptor) in hierarchy.iter() {
            if !descriptor.replicated {
                continue;
            }
            if SYNTHETIC_PREFIXES
                .iter()
                .any(|prefix| descriptor.name.starts_with(prefix))
            {
                continue;
            }

            replicated_classes.push(class);

            if table.policy_entries.contains_key(&class) {
                continue;
            }

            // Only types that differ from their parent need an entry of their own.
            if let Some(parent) = hierarchy.parent(class).and_then(|p| hierarchy.get(p)) {
                if parent.same_relevancy_flags(descriptor) {
                    continue;
                }
            }

            let inferred = if descriptor.should_spatialize() {
                Some(RoutingPolicy::SpatialDynamic)
            } else if descriptor.always_relevant && !descriptor.only_relevant_to_owner {
                Some(RoutingPolicy::RelevantAll)
            } else if descriptor.only_relevant_to_owner {
                Some(RoutingPolicy::RelevantOwner)
            } else {
                None
            };

            match inferred {
                Some(policy) => {
                    debug!("Inferred {} for {}", policy, descriptor.flags_debug_string());
                    table.policy_entries.insert(class, policy);
                }
                None => debug!(
                    "No policy inferred for {}, inheriting",
                    descriptor.flags_debug_string()
                ),
            }
        }

        table.resolved_policies = hierarchy
            .iter()
            .map(|(class, _)| {
                hierarchy
                    .lineage(class)
                    .find_map(|id| table.policy_entries.get(&id).copied())
                    .unwrap_or_default()
            })
            .collect();

        let mut presets = Vec::new();
        for preset in info_presets {
            match hierarchy.find(&preset.class) {
                Some(class) => {
                    table.info_entries.insert(class, preset.to_info());
                    presets.push((class, preset));
                }
                None => warn!("⚠️ Replication preset names unknown class '{}', ignoring", preset.class),
            }
        }

        for class in replicated_classes {
            let covering = presets
                .iter()
                .find(|(preset_class, _)| hierarchy.is_child_of(class, *preset_class));
            if let Some((preset_class, preset)) = covering {
                if *preset_class == class || preset.include_child_classes {
                    continue;
                }
            }

            let Some(descriptor) = hierarchy.get(class) else {
                continue;
            };
            let spatialized = table.policy(class).is_spatialized();

            let mut info = ClassReplicationInfo::default();
            if spatialized {
                info.cull_distance_squared = descriptor.net_cull_distance_squared;
            }
            info.replication_period_frames = if descriptor.net_update_frequency > 0.0 {
                ((server_tick_rate / descriptor.net_update_frequency).round() as u32).max(1)
            } else {
                1
            };

            debug!(
                "Setting replication period for {} to {} frames ({:.2} Hz), cull distance {:.0}",
                descriptor.name,
                info.replication_period_frames,
                descriptor.net_update_frequency,
                info.cull_distance_squared.sqrt()
            );
            table.info_entries.insert(class, info);
        }

        table.resolved_infos = hierarchy
            .iter()
            .map(|(class, _)| {
                hierarchy
                    .lineage(class)
                    .find_map(|id| table.info_entries.get(&id).copied())
                    .unwrap_or_default()
            })
            .collect();

        table.log_summary(hierarchy);
        table
    }

    fn log_summary(&self, hierarchy: &ClassHierarchy) {
        info!(
            "📋 Class routing map built: {} policy entries, {} settings entries over {} classes",
            self.policy_entries.len(),
            self.info_entries.len(),
            hierarchy.len()
        );

        for (class, policy) in &self.policy_entries {
            let native = hierarchy.nearest_native(*class);
            // Data-defined subtypes that agree with their native parent add nothing.
            if let Some(native) = native {
                if native != *class && self.policy_entries.get(&native) == Some(policy) {
                    continue;
                }
            }
            debug!(
                "  {} ({}) -> {}",
                self.name(*class),
                native.map(|n| self.name(n)).unwrap_or("None"),
                policy
            );
        }

        for (class, info) in &self.info_entries {
            debug!("  {} -> {}", self.name(*class), info.debug_string_delta());
        }
    }

    /// Resolved policy; [`RoutingPolicy::NotRouted`] for unknown types.
    pub fn policy(&self, class: ClassId) -> RoutingPolicy {
        self.resolved_policies
            .get(class.index())
            .copied()
            .unwrap_or_default()
    }

    /// The type's own entry, `None` when it inherits.
    pub fn entry(&self, class: ClassId) -> Option<RoutingPolicy> {
        self.policy_entries.get(&class).copied()
    }

    /// Resolved replication parameters; defaults for unknown types.
    pub fn replication_info(&self, class: ClassId) -> ClassReplicationInfo {
        self.resolved_infos
            .get(class.index())
            .copied()
            .unwrap_or_default()
    }

    /// Policy and parameters together.
    pub fn class_policy(&self, class: ClassId) -> ClassPolicy {
        ClassPolicy {
            policy: self.policy(class),
            replication: self.replication_info(class),
        }
    }

    /// Type name as known at build time.
    pub fn name(&self, class: ClassId) -> &str {
        self.names
            .get(class.index())
            .map(String::as_str)
            .unwrap_or("None")
    }

    /// Explicit and inferred entries, in type registration order.
    pub fn entries(&self) -> impl Iterator<Item = (ClassId, RoutingPolicy)> + '_ {
        self.policy_entries.iter().map(|(class, policy)| (*class, *policy))
    }

    /// Number of policy entries (not counting inherited types).
    pub fn len(&self) -> usize {
        self.policy_entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policy_entries.is_empty()
    }

    /// Routing table formatted one entry per line for the admin console.
    pub fn routing_report(&self) -> Vec<String> {
        let mut lines = vec![
            "====================================".to_string(),
            "Relevancy Routing Policies".to_string(),
            "====================================".to_string(),
        ];
        lines.extend(
            self.entries()
                .map(|(class, policy)| format!("{:<40} --> {}", self.name(class), policy)),
        );
        lines
    }

    /// Types whose resolved policy is spatialized.
    pub fn spatialized_classes(&self) -> HashSet<ClassId> {
        self.resolved_policies
            .iter()
            .enumerate()
            .filter(|(_, policy)| policy.is_spatialized())
            .map(|(index, _)| ClassId(index as u32))
            .collect()
    }
}
