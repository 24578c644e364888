//! # Horizon Relevancy
//!
//! Actor-to-connection relevancy routing for multiplayer game servers.
//! Every tick the router decides which replicated objects each client
//! connection must receive, grouped by the rule that made them relevant.
//!
//! ## Core Features
//!
//! - **Class Policies**: One [`RoutingPolicy`] per host type, resolved
//!   through the type hierarchy with explicit overrides
//! - **Global Relevancy**: Objects every connection receives
//! - **Spatial Relevancy**: Proximity gathers through a pluggable
//!   [`SpatialIndex`], with an R*-tree reference grid
//! - **Owner and Team Relevancy**: Per-connection containers, with team
//!   gathers delegating across every connection sharing a team tag
//! - **Deferred Routing**: Objects and team requests that arrive before
//!   their connection are retried once per tick
//! - **Dependent Objects**: Copy-on-write lists of objects that ride along
//!   with their owner
//!
//! ## Quick Start Example
//!
//! ```rust
//! use horizon_relevancy::*;
//!
//! let hierarchy = ClassHierarchy::from_descriptors(engine_base_classes()).unwrap();
//! let mut router = RoutingContext::new(&hierarchy, RelevancyConfig::default()).unwrap();
//!
//! let controller_class = hierarchy.find("PlayerController").unwrap();
//! let controller = ObjectDescriptor::new(controller_class).controller();
//! let controller_id = controller.id;
//! router.add_object(controller);
//!
//! let connection = ConnectionId::new();
//! router.add_connection(connection, Some(controller_id));
//!
//! // Once per tick: reconcile deferred work, then gather.
//! router.prepare_for_replication();
//! let relevant = router.gather(connection);
//! assert!(relevant.owner.contains(&controller_id));
//! ```

pub mod classification;
pub mod config;
pub mod connection;
pub mod console;
pub mod dependents;
pub mod error;
pub mod graph;
pub mod nodes;
pub mod objects;
pub mod pending;
pub mod spatial;
pub mod types;

#[cfg(test)]
mod tests;

pub use classification::{
    default_pawn_preset, engine_base_classes, ClassDescriptor, ClassHierarchy, ClassPolicy,
    ClassReplicationInfo, ClassTable, PolicyPreset, ReplicationInfoPreset, RoutingPolicy,
};
pub use config::{presets, ConfigValidationError, RelevancyConfig, RelevancyConfigBuilder, SpatialConfig};
pub use connection::ConnectionGraph;
pub use console::ConsoleCommand;
pub use dependents::DependentActorList;
pub use error::RelevancyError;
pub use graph::{GatherResult, RoutingContext, RoutingStats};
pub use nodes::{ActorListNode, TeamRegistry};
pub use objects::{ObjectDescriptor, ObjectRecord, RouteTarget};
pub use pending::{PendingObjectRoute, PendingQueue, PendingTeamAssignment};
pub use spatial::{GridSpatialization, SpatialActorInfo, SpatialIndex, SpatialMode};
pub use types::{ClassId, ConnectionId, ObjectId, TeamTag, Vec3};
