//! Replicated object records and net-owner resolution.

use crate::classification::ClassPolicy;
use crate::dependents::DependentActorList;
use crate::spatial::SpatialMode;
use crate::types::{ClassId, ConnectionId, ObjectId, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What the host tells the router about an object becoming replicated.
///
/// # Examples
///
/// ```rust
/// use horizon_relevancy::{ClassId, ObjectDescriptor, ObjectId, Vec3};
///
/// let controller = ObjectId::new();
/// let pawn = ObjectDescriptor::new(ClassId(6))
///     .with_owner(controller)
///     .at(Vec3::new(100.0, 0.0, 0.0));
/// assert_eq!(pawn.owner, Some(controller));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    pub id: ObjectId,
    pub class: ClassId,
    /// Direct owner; the net owner is found by walking owners upwards
    pub owner: Option<ObjectId>,
    pub position: Vec3,
    /// The object is a player controller, i.e. a connection's routing identity
    pub is_controller: bool,
    pub dormant: bool,
}

impl ObjectDescriptor {
    /// Describes a new object with a fresh id at the origin.
    pub fn new(class: ClassId) -> Self {
        Self {
            id: ObjectId::new(),
            class,
            owner: None,
            position: Vec3::zero(),
            is_controller: false,
            dormant: false,
        }
    }

    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.id = id;
        self
    }

    pub fn with_owner(mut self, owner: ObjectId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Marks the object as a player controller
    pub fn controller(mut self) -> Self {
        self.is_controller = true;
        self
    }

    pub fn dormant(mut self) -> Self {
        self.dormant = true;
        self
    }
}

/// Container an object is currently routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteTarget {
    /// The global always-relevant node
    Global,
    /// A connection's owner-relevant node
    Owner(ConnectionId),
    /// A connection's team node
    Team(ConnectionId),
    /// The spatial index, under the given mode
    Spatial(SpatialMode),
    /// Waiting for the owning connection
    Pending,
}

/// Per-object state kept by the router.
#[derive(Debug, Clone)]
pub struct ObjectRecord {
    pub id: ObjectId,
    pub class: ClassId,
    pub owner: Option<ObjectId>,
    pub position: Vec3,
    pub is_controller: bool,
    pub dormant: bool,
    /// Resolved once at registration
    pub policy: ClassPolicy,
    pub(crate) route: Option<RouteTarget>,
    pub(crate) dependents: DependentActorList,
}

impl ObjectRecord {
    pub(crate) fn new(descriptor: ObjectDescriptor, policy: ClassPolicy) -> Self {
        Self {
            id: descriptor.id,
            class: descriptor.class,
            owner: descriptor.owner,
            position: descriptor.position,
            is_controller: descriptor.is_controller,
            dormant: descriptor.dormant,
            policy,
            route: None,
            dependents: DependentActorList::new(),
        }
    }

    /// Container the object is routed to, `None` when unrouted
    pub fn route(&self) -> Option<RouteTarget> {
        self.route
    }

    pub fn dependents(&self) -> &DependentActorList {
        &self.dependents
    }
}

/// Registry of replicated objects.
#[derive(Debug, Clone, Default)]
pub struct ObjectRegistry {
    records: HashMap<ObjectId, ObjectRecord>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record. Returns `false`, leaving the existing record in
    /// place, if the id is already registered.
    pub fn insert(&mut self, record: ObjectRecord) -> bool {
        if self.records.contains_key(&record.id) {
            return false;
        }
        self.records.insert(record.id, record);
        true
    }

    pub fn remove(&mut self, object: ObjectId) -> Option<ObjectRecord> {
        self.records.remove(&object)
    }

    pub fn get(&self, object: ObjectId) -> Option<&ObjectRecord> {
        self.records.get(&object)
    }

    pub fn get_mut(&mut self, object: ObjectId) -> Option<&mut ObjectRecord> {
        self.records.get_mut(&object)
    }

    pub fn contains(&self, object: ObjectId) -> bool {
        self.records.contains_key(&object)
    }

    /// Net-owner identity of an object, walking the owner chain starting
    /// with the object itself.
    ///
    /// The walk stops at the first controller, the first id `is_identity`
    /// accepts, or a declared owner that is not registered (yet). A chain
    /// that ends without an owner, or loops, has no identity.
    pub fn net_owner(&self, object: ObjectId, is_identity: impl Fn(ObjectId) -> bool) -> Option<ObjectId> {
        let mut current = self.records.get(&object)?;
        for _ in 0..=self.records.len() {
            if current.is_controller || is_identity(current.id) {
                return Some(current.id);
            }
            let owner = current.owner?;
            match self.records.get(&owner) {
                Some(record) => current = record,
                None => return Some(owner),
            }
        }
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectRecord> {
        self.records.values()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(registry: &mut ObjectRegistry, descriptor: ObjectDescriptor) -> ObjectId {
        let id = descriptor.id;
        assert!(registry.insert(ObjectRecord::new(descriptor, ClassPolicy::default())));
        id
    }

    fn no_identity(_: ObjectId) -> bool {
        false
    }

    #[test]
    fn test_net_owner_walks_to_first_controller() {
        let mut registry = ObjectRegistry::new();
        let controller = insert(&mut registry, ObjectDescriptor::new(ClassId(0)).controller());
        let pawn = insert(
            &mut registry,
            ObjectDescriptor::new(ClassId(1)).with_owner(controller),
        );
        let weapon = insert(&mut registry, ObjectDescriptor::new(ClassId(2)).with_owner(pawn));

        assert_eq!(registry.net_owner(weapon, no_identity), Some(controller));
        assert_eq!(registry.net_owner(controller, no_identity), Some(controller));
    }

    #[test]
    fn test_net_owner_absent_without_owner() {
        let mut registry = ObjectRegistry::new();
        let lonely = insert(&mut registry, ObjectDescriptor::new(ClassId(0)));
        assert_eq!(registry.net_owner(lonely, no_identity), None);
        assert_eq!(registry.net_owner(ObjectId::new(), no_identity), None);
    }

    #[test]
    fn test_net_owner_stops_at_unregistered_owner() {
        let mut registry = ObjectRegistry::new();
        let missing = ObjectId::new();
        let pawn = insert(&mut registry, ObjectDescriptor::new(ClassId(1)).with_owner(missing));
        let weapon = insert(&mut registry, ObjectDescriptor::new(ClassId(2)).with_owner(pawn));

        assert_eq!(registry.net_owner(weapon, no_identity), Some(missing));
    }

    #[test]
    fn test_net_owner_accepts_known_identity() {
        let mut registry = ObjectRegistry::new();
        // Registered without the controller flag, but known to the caller.
        let identity = insert(&mut registry, ObjectDescriptor::new(ClassId(0)));
        let weapon = insert(&mut registry, ObjectDescriptor::new(ClassId(2)).with_owner(identity));

        assert_eq!(registry.net_owner(weapon, no_identity), None);
        assert_eq!(registry.net_owner(weapon, |id| id == identity), Some(identity));
    }

    #[test]
    fn test_net_owner_survives_cycles() {
        let mut registry = ObjectRegistry::new();
        let a = ObjectId::new();
        let b = ObjectId::new();
        insert(&mut registry, ObjectDescriptor::new(ClassId(0)).with_id(a).with_owner(b));
        insert(&mut registry, ObjectDescriptor::new(ClassId(0)).with_id(b).with_owner(a));
        assert_eq!(registry.net_owner(a, no_identity), None);
    }

    #[test]
    fn test_duplicate_insert_keeps_original() {
        let mut registry = ObjectRegistry::new();
        let id = insert(&mut registry, ObjectDescriptor::new(ClassId(3)));
        let duplicate = ObjectRecord::new(
            ObjectDescriptor::new(ClassId(4)).with_id(id),
            ClassPolicy::default(),
        );
        assert!(!registry.insert(duplicate));
        assert_eq!(registry.get(id).map(|r| r.class), Some(ClassId(3)));
    }
}
