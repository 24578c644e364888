//! Spatial relevancy
//!
//! The router consumes spatial indexing as a capability: anything that
//! implements [`SpatialIndex`] can back the spatialized policies. Objects
//! are inserted under one of three [`SpatialMode`]s and must be removed
//! under the same mode they were inserted with.
//!
//! [`GridSpatialization`] is the reference implementation, an R*-tree with
//! grid-cell bookkeeping for bias and rebuild handling.

mod grid;

pub use grid::{GridSpatialization, GridStats};

use crate::classification::RoutingPolicy;
use crate::types::{ClassId, ObjectId, Vec3};
use serde::{Deserialize, Serialize};

/// How a spatialized object is tracked by the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpatialMode {
    /// Never moves; position is read once at insert
    Static,
    /// Moves; position updates are applied
    Dynamic,
    /// Static while dormant, dynamic while awake
    Dormancy,
}

impl SpatialMode {
    /// Mode for a spatialized policy, `None` for every other policy.
    pub fn from_policy(policy: RoutingPolicy) -> Option<Self> {
        match policy {
            RoutingPolicy::SpatialStatic => Some(SpatialMode::Static),
            RoutingPolicy::SpatialDynamic => Some(SpatialMode::Dynamic),
            RoutingPolicy::SpatialDormancy => Some(SpatialMode::Dormancy),
            _ => None,
        }
    }
}

/// What the index needs to know about an object at insert time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialActorInfo {
    pub object: ObjectId,
    pub class: ClassId,
    pub position: Vec3,
    /// Squared distance beyond which the object is not relevant to a viewer
    pub cull_distance_squared: f32,
    /// Current dormancy; only meaningful for [`SpatialMode::Dormancy`]
    pub dormant: bool,
}

/// Spatial index capability consumed by the routing context.
///
/// Removal under a mode other than the insert mode is a no-op returning
/// `false`.
pub trait SpatialIndex: Send + Sync {
    fn insert_static(&mut self, info: SpatialActorInfo);
    fn insert_dynamic(&mut self, info: SpatialActorInfo);
    fn insert_dormancy(&mut self, info: SpatialActorInfo);

    fn remove_static(&mut self, object: ObjectId) -> bool;
    fn remove_dynamic(&mut self, object: ObjectId) -> bool;
    fn remove_dormancy(&mut self, object: ObjectId) -> bool;

    /// Moves an object. Ignored for objects the index treats as static.
    fn update_position(&mut self, object: ObjectId, position: Vec3);

    /// Switches a dormancy-aware object between static and dynamic
    /// tracking. `position` is the object's current location.
    fn set_dormant(&mut self, object: ObjectId, dormant: bool, position: Vec3);

    /// Once-per-tick maintenance before gathers run
    fn prepare_for_replication(&mut self) {}

    /// Objects relevant to a viewer at `viewer`
    fn gather(&self, viewer: Vec3) -> Vec<ObjectId>;

    fn contains(&self, object: ObjectId) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every object
    fn reset(&mut self);

    /// Inserts under the given mode
    fn insert(&mut self, mode: SpatialMode, info: SpatialActorInfo) {
        match mode {
            SpatialMode::Static => self.insert_static(info),
            SpatialMode::Dynamic => self.insert_dynamic(info),
            SpatialMode::Dormancy => self.insert_dormancy(info),
        }
    }

    /// Removes under the given mode
    fn remove(&mut self, mode: SpatialMode, object: ObjectId) -> bool {
        match mode {
            SpatialMode::Static => self.remove_static(object),
            SpatialMode::Dynamic => self.remove_dynamic(object),
            SpatialMode::Dormancy => self.remove_dormancy(object),
        }
    }
}
