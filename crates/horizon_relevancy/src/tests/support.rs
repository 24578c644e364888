//! Shared world fixture for the scenario tests.

use crate::classification::GAMEPLAY_DEBUGGER_CLASS;
use crate::{
    engine_base_classes, ClassDescriptor, ClassHierarchy, ClassId, ConnectionId, ObjectDescriptor,
    ObjectId, PolicyPreset, RelevancyConfig, RelevancyConfigBuilder, RoutingContext, RoutingPolicy,
    Vec3,
};

/// Team-relevant capture flag
pub const FLAG: &str = "Flag";
/// Owner-only inventory item
pub const WEAPON: &str = "Weapon";
/// Static spatialized building
pub const TOWER: &str = "Tower";
/// Dormancy-aware spatialized door
pub const DOOR: &str = "Door";

pub fn test_hierarchy() -> ClassHierarchy {
    let mut descriptors = engine_base_classes();
    descriptors.extend([
        ClassDescriptor::new(FLAG).with_parent("Actor"),
        ClassDescriptor::new(WEAPON)
            .with_parent("Actor")
            .only_relevant_to_owner(),
        ClassDescriptor::new(TOWER)
            .with_parent("Actor")
            .with_cull_distance_squared(20000.0 * 20000.0),
        ClassDescriptor::new(DOOR).with_parent("Actor"),
        ClassDescriptor::new(GAMEPLAY_DEBUGGER_CLASS).with_parent("Actor"),
    ]);
    ClassHierarchy::from_descriptors(descriptors).unwrap()
}

pub fn test_config() -> RelevancyConfig {
    RelevancyConfigBuilder::new()
        .with_policy(PolicyPreset::new(FLAG, RoutingPolicy::RelevantTeam))
        .with_policy(PolicyPreset::new(TOWER, RoutingPolicy::SpatialStatic))
        .with_policy(PolicyPreset::new(DOOR, RoutingPolicy::SpatialDormancy))
        .build()
}

/// A routing context plus helpers to populate it.
pub struct TestWorld {
    pub hierarchy: ClassHierarchy,
    pub router: RoutingContext,
}

impl TestWorld {
    pub fn new() -> Self {
        let hierarchy = test_hierarchy();
        let router = RoutingContext::new(&hierarchy, test_config()).unwrap();
        Self { hierarchy, router }
    }

    pub fn class(&self, name: &str) -> ClassId {
        self.hierarchy
            .find(name)
            .unwrap_or_else(|| panic!("unknown test class {name}"))
    }

    /// Adds an object of the named class and returns its id.
    pub fn spawn(&mut self, class: &str, owner: Option<ObjectId>, position: Vec3) -> ObjectId {
        let mut descriptor = ObjectDescriptor::new(self.class(class)).at(position);
        descriptor.owner = owner;
        let id = descriptor.id;
        assert!(self.router.add_object(descriptor));
        id
    }

    /// Adds a player controller at `position` without a connection.
    pub fn spawn_controller(&mut self, position: Vec3) -> ObjectId {
        let descriptor = ObjectDescriptor::new(self.class("PlayerController"))
            .controller()
            .at(position);
        let id = descriptor.id;
        assert!(self.router.add_object(descriptor));
        id
    }

    /// Opens a connection identified by `controller`.
    pub fn connect(&mut self, controller: ObjectId) -> ConnectionId {
        let connection = ConnectionId::new();
        assert!(self.router.add_connection(connection, Some(controller)));
        connection
    }

    /// Controller plus connection, reconciled so the controller is routed.
    pub fn join(&mut self, position: Vec3) -> (ObjectId, ConnectionId) {
        let controller = self.spawn_controller(position);
        let connection = self.connect(controller);
        self.router.prepare_for_replication();
        (controller, connection)
    }

    /// Asserts every registered id in `objects` sits in at most one container.
    pub fn assert_single_container(&self, objects: &[ObjectId]) {
        for object in objects {
            assert!(
                self.router.container_count(*object) <= 1,
                "object {object} routed to more than one container"
            );
        }
    }
}
