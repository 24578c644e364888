//! Host type registry consulted when the classification table is built.
//!
//! The host describes every replicated type once: its parent, whether it is
//! replicated at all, its relevancy flags and its default update frequency
//! and cull distance. The router never looks at these descriptors after
//! [`ClassTable::build`](super::ClassTable::build) has run.

use crate::error::RelevancyError;
use crate::types::ClassId;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name of the root actor type the engine defaults hang off.
pub const ACTOR_CLASS: &str = "Actor";
/// Replication graph debug actor; replicated by a special path, never routed.
pub const DEBUG_ACTOR_CLASS: &str = "ReplicationGraphDebugActor";
/// Non-spatial info actors (game state, player state); relevant to everyone.
pub const INFO_CLASS: &str = "Info";
/// Level script actors; never routed.
pub const LEVEL_SCRIPT_CLASS: &str = "LevelScriptActor";
/// Gameplay debugger replicator; only its owning connection needs it.
pub const GAMEPLAY_DEBUGGER_CLASS: &str = "GameplayDebuggerCategoryReplicator";
/// Pawns get a dedicated replication preset in the default configuration.
pub const PAWN_CLASS: &str = "Pawn";

fn default_true() -> bool {
    true
}

fn default_net_update_frequency() -> f32 {
    100.0
}

fn default_net_cull_distance_squared() -> f32 {
    15000.0 * 15000.0
}

/// Replication defaults of one host type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    /// Unique type name
    pub name: String,
    /// Parent type name, `None` for roots
    #[serde(default)]
    pub parent: Option<String>,
    /// Whether instances replicate at all
    #[serde(default = "default_true")]
    pub replicated: bool,
    /// Relevant to every connection regardless of position
    #[serde(default)]
    pub always_relevant: bool,
    /// Relevant only to the owning connection
    #[serde(default)]
    pub only_relevant_to_owner: bool,
    /// Relevancy is delegated to the owner object
    #[serde(default)]
    pub net_use_owner_relevancy: bool,
    /// Desired updates per second
    #[serde(default = "default_net_update_frequency")]
    pub net_update_frequency: f32,
    /// Default cull distance, squared
    #[serde(default = "default_net_cull_distance_squared")]
    pub net_cull_distance_squared: f32,
    /// Native (code-defined) type, as opposed to a data-defined subtype
    #[serde(default = "default_true")]
    pub native: bool,
}

impl ClassDescriptor {
    /// Creates a replicated, spatialized root type with engine defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            replicated: true,
            always_relevant: false,
            only_relevant_to_owner: false,
            net_use_owner_relevancy: false,
            net_update_frequency: default_net_update_frequency(),
            net_cull_distance_squared: default_net_cull_distance_squared(),
            native: true,
        }
    }

    /// Sets the parent type.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Marks the type as not replicated.
    pub fn not_replicated(mut self) -> Self {
        self.replicated = false;
        self
    }

    /// Sets the always-relevant flag.
    pub fn always_relevant(mut self) -> Self {
        self.always_relevant = true;
        self
    }

    /// Sets the owner-only-relevant flag.
    pub fn only_relevant_to_owner(mut self) -> Self {
        self.only_relevant_to_owner = true;
        self
    }

    /// Sets the owner-relevancy-delegated flag.
    pub fn net_use_owner_relevancy(mut self) -> Self {
        self.net_use_owner_relevancy = true;
        self
    }

    /// Sets the default update frequency in Hz.
    pub fn with_update_frequency(mut self, frequency: f32) -> Self {
        self.net_update_frequency = frequency;
        self
    }

    /// Sets the default squared cull distance.
    pub fn with_cull_distance_squared(mut self, distance_squared: f32) -> Self {
        self.net_cull_distance_squared = distance_squared;
        self
    }

    /// Marks the type as data-defined rather than native.
    pub fn data_defined(mut self) -> Self {
        self.native = false;
        self
    }

    /// Whether the replication-relevant flags match another descriptor.
    pub fn same_relevancy_flags(&self, other: &ClassDescriptor) -> bool {
        self.replicated == other.replicated
            && self.always_relevant == other.always_relevant
            && self.only_relevant_to_owner == other.only_relevant_to_owner
            && self.net_use_owner_relevancy == other.net_use_owner_relevancy
    }

    /// Whether inference should place the type in the spatial index.
    pub fn should_spatialize(&self) -> bool {
        self.replicated
            && !(self.always_relevant || self.only_relevant_to_owner || self.net_use_owner_relevancy)
    }

    /// Compact flag dump used in diagnostics.
    pub fn flags_debug_string(&self) -> String {
        format!(
            "{} [{}/{}/{}]",
            self.name,
            self.always_relevant as u8,
            self.only_relevant_to_owner as u8,
            self.net_use_owner_relevancy as u8
        )
    }
}

#[derive(Debug, Clone)]
struct ClassEntry {
    descriptor: ClassDescriptor,
    parent: Option<ClassId>,
}

/// Registry of host types, parents always registered before children.
#[derive(Debug, Clone, Default)]
pub struct ClassHierarchy {
    classes: Vec<ClassEntry>,
    by_name: HashMap<CompactString, ClassId>,
}

impl ClassHierarchy {
    /// Creates an empty hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every descriptor in order.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = ClassDescriptor>,
    ) -> Result<Self, RelevancyError> {
        let mut hierarchy = Self::new();
        for descriptor in descriptors {
            hierarchy.register(descriptor)?;
        }
        Ok(hierarchy)
    }

    /// Registers a type. Its parent must already be registered.
    pub fn register(&mut self, descriptor: ClassDescriptor) -> Result<ClassId, RelevancyError> {
        if self.by_name.contains_key(descriptor.name.as_str()) {
            return Err(RelevancyError::DuplicateClass { name: descriptor.name });
        }

        let parent = match &descriptor.parent {
            Some(parent_name) => match self.find(parent_name) {
                Some(id) => Some(id),
                None => {
                    return Err(RelevancyError::UnknownParent {
                        name: descriptor.name.clone(),
                        parent: parent_name.clone(),
                    })
                }
            },
            None => None,
        };

        let id = ClassId(self.classes.len() as u32);
        self.by_name.insert(CompactString::new(&descriptor.name), id);
        self.classes.push(ClassEntry { descriptor, parent });
        Ok(id)
    }

    /// Looks a type up by name.
    pub fn find(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    /// Descriptor of a registered type.
    pub fn get(&self, class: ClassId) -> Option<&ClassDescriptor> {
        self.classes.get(class.index()).map(|entry| &entry.descriptor)
    }

    /// Type name, `"None"` for handles this hierarchy never issued.
    pub fn name(&self, class: ClassId) -> &str {
        self.get(class).map(|d| d.name.as_str()).unwrap_or("None")
    }

    /// Direct parent of a type.
    pub fn parent(&self, class: ClassId) -> Option<ClassId> {
        self.classes.get(class.index()).and_then(|entry| entry.parent)
    }

    /// The type itself followed by each ancestor up to the root.
    pub fn lineage(&self, class: ClassId) -> Lineage<'_> {
        let next = self.get(class).map(|_| class);
        Lineage { hierarchy: self, next }
    }

    /// Whether `class` is `ancestor` or derives from it.
    pub fn is_child_of(&self, class: ClassId, ancestor: ClassId) -> bool {
        self.lineage(class).any(|id| id == ancestor)
    }

    /// Closest native type in the lineage, the type itself included.
    pub fn nearest_native(&self, class: ClassId) -> Option<ClassId> {
        self.lineage(class)
            .find(|id| self.get(*id).map(|d| d.native).unwrap_or(false))
    }

    /// All types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &ClassDescriptor)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(index, entry)| (ClassId(index as u32), &entry.descriptor))
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no type is registered.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Iterator over a type and its ancestors.
pub struct Lineage<'a> {
    hierarchy: &'a ClassHierarchy,
    next: Option<ClassId>,
}

impl Iterator for Lineage<'_> {
    type Item = ClassId;

    fn next(&mut self) -> Option<ClassId> {
        let current = self.next?;
        self.next = self.hierarchy.parent(current);
        Some(current)
    }
}

/// The engine types every host world starts from.
///
/// `Actor` itself does not replicate; pawns and other world actors are
/// spatialized, controllers are owner-only, info actors are global.
/// Descriptors do not inherit flags, so subtypes repeat their parent's.
pub fn engine_base_classes() -> Vec<ClassDescriptor> {
    vec![
        ClassDescriptor::new(ACTOR_CLASS).not_replicated(),
        ClassDescriptor::new(INFO_CLASS)
            .with_parent(ACTOR_CLASS)
            .always_relevant()
            .with_update_frequency(10.0),
        ClassDescriptor::new("GameStateBase")
            .with_parent(INFO_CLASS)
            .always_relevant()
            .with_update_frequency(10.0),
        ClassDescriptor::new("PlayerState")
            .with_parent(INFO_CLASS)
            .always_relevant()
            .with_update_frequency(1.0),
        ClassDescriptor::new("Controller")
            .with_parent(ACTOR_CLASS)
            .only_relevant_to_owner(),
        ClassDescriptor::new("PlayerController")
            .with_parent("Controller")
            .only_relevant_to_owner(),
        ClassDescriptor::new(PAWN_CLASS).with_parent(ACTOR_CLASS),
        ClassDescriptor::new("Character").with_parent(PAWN_CLASS),
        ClassDescriptor::new(LEVEL_SCRIPT_CLASS)
            .with_parent(ACTOR_CLASS)
            .always_relevant(),
        ClassDescriptor::new(DEBUG_ACTOR_CLASS)
            .with_parent(ACTOR_CLASS)
            .only_relevant_to_owner(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_requires_parent_first() {
        let mut hierarchy = ClassHierarchy::new();
        let err = hierarchy
            .register(ClassDescriptor::new("Child").with_parent("Missing"))
            .unwrap_err();
        assert!(matches!(err, RelevancyError::UnknownParent { .. }));
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut hierarchy = ClassHierarchy::new();
        hierarchy.register(ClassDescriptor::new("Actor")).unwrap();
        let err = hierarchy.register(ClassDescriptor::new("Actor")).unwrap_err();
        assert!(matches!(err, RelevancyError::DuplicateClass { .. }));
    }

    #[test]
    fn test_lineage_walks_to_root() {
        let hierarchy = ClassHierarchy::from_descriptors(engine_base_classes()).unwrap();
        let character = hierarchy.find("Character").unwrap();
        let names: Vec<&str> = hierarchy
            .lineage(character)
            .map(|id| hierarchy.name(id))
            .collect();
        assert_eq!(names, vec!["Character", "Pawn", "Actor"]);

        let pawn = hierarchy.find(PAWN_CLASS).unwrap();
        let info = hierarchy.find(INFO_CLASS).unwrap();
        assert!(hierarchy.is_child_of(character, pawn));
        assert!(hierarchy.is_child_of(pawn, pawn));
        assert!(!hierarchy.is_child_of(character, info));
    }

    #[test]
    fn test_nearest_native_skips_data_defined_types() {
        let mut descriptors = engine_base_classes();
        descriptors.push(
            ClassDescriptor::new("BP_Hero")
                .with_parent("Character")
                .data_defined(),
        );
        let hierarchy = ClassHierarchy::from_descriptors(descriptors).unwrap();
        let hero = hierarchy.find("BP_Hero").unwrap();
        assert_eq!(hierarchy.nearest_native(hero), hierarchy.find("Character"));
    }

    #[test]
    fn test_descriptor_deserializes_with_defaults() {
        let descriptor: ClassDescriptor = toml::from_str(
            r#"
name = "Projectile"
parent = "Actor"
net_update_frequency = 30.0
"#,
        )
        .unwrap();
        assert!(descriptor.replicated);
        assert!(descriptor.native);
        assert!(descriptor.should_spatialize());
        assert_eq!(descriptor.net_update_frequency, 30.0);
        assert_eq!(descriptor.net_cull_distance_squared, 15000.0 * 15000.0);
    }
}
