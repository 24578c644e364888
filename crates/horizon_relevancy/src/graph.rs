//! # Routing Context
//!
//! The [`RoutingContext`] owns every routing container of one world and
//! decides which container each replicated object goes to:
//!
//! - **Global** - objects relevant to every connection
//! - **Spatial** - objects relevant by proximity, through a [`SpatialIndex`]
//! - **Owner** - objects relevant only to the owning connection
//! - **Team** - objects relevant to every connection on the owner's team
//!
//! ## Tick phases
//!
//! 1. Host events ([`add_object`](RoutingContext::add_object),
//!    [`set_team`](RoutingContext::set_team), ...) apply immediately.
//! 2. [`prepare_for_replication`](RoutingContext::prepare_for_replication)
//!    retries deferred team requests, then deferred object routes.
//! 3. [`gather`](RoutingContext::gather) or
//!    [`gather_all`](RoutingContext::gather_all) produce per-connection
//!    object lists. Gathers only need `&self`, so `gather_all` fans out
//!    over the rayon pool.
//!
//! Nothing here fails at routing time: unknown ids are no-ops, policy
//! misses resolve to [`RoutingPolicy::NotRouted`] and unresolved owners
//! degrade relevancy.

use crate::classification::{ClassHierarchy, ClassPolicy, ClassTable, RoutingPolicy};
use crate::config::{ConfigValidationError, RelevancyConfig, SpatialConfig};
use crate::connection::ConnectionGraph;
use crate::console::ConsoleCommand;
use crate::error::RelevancyError;
use crate::nodes::{ActorListNode, TeamRegistry};
use crate::objects::{ObjectDescriptor, ObjectRecord, ObjectRegistry, RouteTarget};
use crate::pending::PendingQueue;
use crate::spatial::{GridSpatialization, SpatialActorInfo, SpatialIndex, SpatialMode};
use crate::types::{ClassId, ConnectionId, ObjectId, TeamTag, Vec3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Objects relevant to one connection for one tick, grouped by rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatherResult {
    pub always_relevant: Vec<ObjectId>,
    pub spatial: Vec<ObjectId>,
    pub owner: Vec<ObjectId>,
    pub team: Vec<ObjectId>,
    /// Dependents of the objects above, each listed once
    pub dependents: Vec<ObjectId>,
}

impl GatherResult {
    /// Every gathered object in list order: global, spatial, owner, team,
    /// then dependents.
    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.always_relevant
            .iter()
            .chain(&self.spatial)
            .chain(&self.owner)
            .chain(&self.team)
            .chain(&self.dependents)
            .copied()
    }

    pub fn contains(&self, object: ObjectId) -> bool {
        self.iter().any(|o| o == object)
    }

    pub fn len(&self) -> usize {
        self.always_relevant.len()
            + self.spatial.len()
            + self.owner.len()
            + self.team.len()
            + self.dependents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Routing counters since the context was created
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingStats {
    pub routed_global: u64,
    pub routed_spatial: u64,
    pub routed_owner: u64,
    pub routed_team: u64,
    /// Object routes queued, re-queues included
    pub pending_enqueued: u64,
    pub pending_resolved: u64,
    pub pending_dropped: u64,
    pub team_requests_deferred: u64,
    pub team_changes: u64,
    pub duplicate_adds: u64,
    pub drains: u64,
    pub world_resets: u64,
}

/// Relevancy routing state of one world.
pub struct RoutingContext {
    classes: ClassTable,
    objects: ObjectRegistry,
    always_relevant: ActorListNode,
    spatial: Box<dyn SpatialIndex>,
    connections: HashMap<ConnectionId, ConnectionGraph>,
    /// Controller object → connection it identifies
    controllers: HashMap<ObjectId, ConnectionId>,
    teams: TeamRegistry,
    pending: PendingQueue,
    frequency_bucket_list_size: usize,
    destruction_info_max_distance_squared: f64,
    stats: RoutingStats,
}

impl RoutingContext {
    /// Creates a context backed by the reference [`GridSpatialization`].
    ///
    /// # Arguments
    ///
    /// * `hierarchy` - Host types, read once to build the class table
    /// * `config` - Router configuration, validated before use
    pub fn new(
        hierarchy: &ClassHierarchy,
        config: RelevancyConfig,
    ) -> Result<Self, ConfigValidationError> {
        let blacklist = resolve_rebuild_blacklist(hierarchy, &config.spatial);
        let grid = GridSpatialization::new(&config.spatial, blacklist);
        Self::with_spatial_index(hierarchy, config, Box::new(grid))
    }

    /// Creates a context backed by a caller-supplied spatial index.
    pub fn with_spatial_index(
        hierarchy: &ClassHierarchy,
        config: RelevancyConfig,
        spatial: Box<dyn SpatialIndex>,
    ) -> Result<Self, ConfigValidationError> {
        config.validate()?;

        let classes = ClassTable::build(
            hierarchy,
            &config.policy_presets,
            &config.replication_presets,
            config.server_tick_rate,
        );
        let destruction_distance = config.clamped_destruction_distance();

        info!(
            "🧭 Relevancy router ready: {} classes, tick rate {} Hz, {} frequency buckets",
            hierarchy.len(),
            config.server_tick_rate,
            config.frequency_bucket_list_size
        );

        Ok(Self {
            classes,
            objects: ObjectRegistry::new(),
            always_relevant: ActorListNode::new(),
            spatial,
            connections: HashMap::new(),
            controllers: HashMap::new(),
            teams: TeamRegistry::new(),
            pending: PendingQueue::new(),
            frequency_bucket_list_size: config.frequency_bucket_list_size,
            destruction_info_max_distance_squared: destruction_distance * destruction_distance,
            stats: RoutingStats::default(),
        })
    }

    // ------------------------------------------------------------------
    // Objects
    // ------------------------------------------------------------------

    /// Registers a replicated object and routes it by its class policy.
    ///
    /// Returns `false` if the id is already registered; the duplicate is
    /// logged and ignored.
    pub fn add_object(&mut self, descriptor: ObjectDescriptor) -> bool {
        let object = descriptor.id;
        let policy = self.classes.class_policy(descriptor.class);
        if !self.objects.insert(ObjectRecord::new(descriptor, policy)) {
            warn!("⚠️ Object {} added twice, ignoring", object);
            self.stats.duplicate_adds += 1;
            return false;
        }
        self.route_add(object);
        true
    }

    /// Unroutes and forgets an object. Unknown ids are ignored.
    pub fn remove_object(&mut self, object: ObjectId) -> bool {
        if !self.objects.contains(object) {
            return false;
        }
        self.route_remove(object);
        self.objects.remove(object);
        true
    }

    /// Moves an object; the spatial index only tracks movement for dynamic
    /// and awake dormancy-aware objects.
    pub fn set_object_position(&mut self, object: ObjectId, position: Vec3) {
        let Some(record) = self.objects.get_mut(object) else {
            return;
        };
        record.position = position;
        if let Some(RouteTarget::Spatial(_)) = record.route {
            self.spatial.update_position(object, position);
        }
    }

    /// Updates an object's dormancy.
    pub fn set_dormant(&mut self, object: ObjectId, dormant: bool) {
        let Some(record) = self.objects.get_mut(object) else {
            return;
        };
        record.dormant = dormant;
        if record.route == Some(RouteTarget::Spatial(SpatialMode::Dormancy)) {
            let position = record.position;
            self.spatial.set_dormant(object, dormant, position);
        }
    }

    /// Moves a connection-specific object to a new owner.
    ///
    /// Objects of unrouted and spatialized classes are left untouched,
    /// owner included.
    pub fn change_owner(&mut self, object: ObjectId, new_owner: Option<ObjectId>) {
        let Some(record) = self.objects.get(object) else {
            return;
        };
        let policy = record.policy.policy;
        if policy == RoutingPolicy::NotRouted || policy.is_spatialized() {
            debug!("Owner change ignored for {} ({})", object, policy);
            return;
        }

        self.route_remove(object);
        if let Some(record) = self.objects.get_mut(object) {
            record.owner = new_owner;
        }
        self.route_add(object);
    }

    /// Moves a gameplay debugger replicator from its old owner's connection
    /// to its current owner's.
    pub fn reassign_debugger(&mut self, debugger: ObjectId, old_owner: ObjectId) {
        if let Some(old) = self.resolve_connection(old_owner) {
            if let Some(graph) = self.connections.get_mut(&old) {
                graph.owner_node.remove(debugger);
            }
        }
        self.route_remove(debugger);

        if !self.objects.contains(debugger) {
            return;
        }
        if let Some(current) = self.resolve_connection(debugger) {
            if let Some(graph) = self.connections.get_mut(&current) {
                graph.owner_node.add(debugger);
                self.stats.routed_owner += 1;
                self.set_route(debugger, Some(RouteTarget::Owner(current)));
            }
        }
    }

    // ------------------------------------------------------------------
    // Dependents
    // ------------------------------------------------------------------

    /// Makes `dependent` piggyback on `owner`'s relevancy.
    pub fn add_dependent(&mut self, owner: ObjectId, dependent: ObjectId) -> bool {
        match self.objects.get(owner) {
            Some(record) => record.dependents.add(dependent),
            None => false,
        }
    }

    pub fn remove_dependent(&mut self, owner: ObjectId, dependent: ObjectId) -> bool {
        match self.objects.get(owner) {
            Some(record) => record.dependents.remove(dependent),
            None => false,
        }
    }

    /// Snapshot of an object's dependents; empty for unknown objects.
    pub fn dependents(&self, owner: ObjectId) -> Arc<Vec<ObjectId>> {
        self.objects
            .get(owner)
            .map(|record| record.dependents.snapshot())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Connections and teams
    // ------------------------------------------------------------------

    /// Registers a connection.
    ///
    /// `controller` is the player controller object identifying the
    /// connection. Without one, objects can never resolve to this
    /// connection and it only receives global and spatial relevancy.
    pub fn add_connection(&mut self, connection: ConnectionId, controller: Option<ObjectId>) -> bool {
        if self.connections.contains_key(&connection) {
            warn!("⚠️ Connection {} registered twice, ignoring", connection);
            return false;
        }

        match controller {
            Some(controller) => {
                if let Some(previous) = self.controllers.insert(controller, connection) {
                    warn!(
                        "⚠️ Controller {} moved from connection {} to {}",
                        controller, previous, connection
                    );
                    if let Some(graph) = self.connections.get_mut(&previous) {
                        graph.controller = None;
                    }
                }
                info!("🔌 Connection {} established for controller {}", connection, controller);
            }
            None => warn!(
                "⚠️ Connection {} has no controller; routing degraded to global and spatial relevancy",
                connection
            ),
        }

        self.connections
            .insert(connection, ConnectionGraph::new(connection, controller));
        true
    }

    /// Removes a connection, its team membership and its containers.
    /// Objects routed to those containers go back to pending and follow
    /// their owner to its next connection.
    pub fn remove_connection(&mut self, connection: ConnectionId) -> bool {
        let Some(graph) = self.connections.remove(&connection) else {
            warn!("⚠️ Could not find connection {} to remove", connection);
            return false;
        };

        if !graph.team.is_none() {
            self.teams.remove(&graph.team, connection);
        }
        if let Some(controller) = graph.controller {
            if self.controllers.get(&controller) == Some(&connection) {
                self.controllers.remove(&controller);
            }
        }

        // Their owners still exist, so they wait for a reconnect.
        for object in graph.owner_node.objects().iter().chain(graph.team_node.objects()) {
            let Some(record) = self.objects.get_mut(*object) else {
                continue;
            };
            record.route = Some(RouteTarget::Pending);
            let policy = record.policy.policy;
            if self.pending.enqueue_object(*object, policy) {
                self.stats.pending_enqueued += 1;
            }
        }

        info!(
            "🔌 Connection {} removed ({} owner, {} team objects pending)",
            connection,
            graph.owner_node.len(),
            graph.team_node.len()
        );
        true
    }

    /// Sets the viewer location used for the connection's spatial gather.
    /// Without one, the controller object's position is used.
    pub fn set_viewer_location(&mut self, connection: ConnectionId, location: Vec3) -> bool {
        match self.connections.get_mut(&connection) {
            Some(graph) => {
                graph.viewer = Some(location);
                true
            }
            None => false,
        }
    }

    /// Moves the requestor's connection to `team`.
    ///
    /// If the requestor does not resolve to a connection yet, the request
    /// waits for the next reconciliation pass.
    pub fn set_team(&mut self, requestor: ObjectId, team: TeamTag) {
        match self.resolve_connection(requestor) {
            Some(connection) => self.apply_team(connection, team),
            None => {
                debug!("Team request from {} deferred until its connection exists", requestor);
                self.pending.enqueue_team(requestor, team);
                self.stats.team_requests_deferred += 1;
            }
        }
    }

    fn apply_team(&mut self, connection: ConnectionId, team: TeamTag) {
        let Some(graph) = self.connections.get_mut(&connection) else {
            return;
        };
        if graph.team == team {
            return;
        }

        if !graph.team.is_none() {
            self.teams.remove(&graph.team, connection);
        }
        if !team.is_none() {
            self.teams.add(&team, connection);
        }
        debug!("👥 Connection {} team {} -> {}", connection, graph.team, team);
        graph.team = team;
        self.stats.team_changes += 1;
    }

    // ------------------------------------------------------------------
    // Per tick
    // ------------------------------------------------------------------

    /// Reconciles deferred work, team requests first, then object routes.
    ///
    /// Each queue is taken whole before processing, so anything re-queued
    /// here is retried next tick at the earliest.
    pub fn prepare_for_replication(&mut self) {
        for request in self.pending.take_teams() {
            let requestor_alive = self.objects.contains(request.requestor)
                || self.controllers.contains_key(&request.requestor);
            let connection = if requestor_alive {
                self.resolve_connection(request.requestor)
            } else {
                None
            };

            match connection {
                Some(connection) => {
                    self.apply_team(connection, request.team);
                    self.stats.pending_resolved += 1;
                }
                None => {
                    debug!(
                        "Dropping team request from {} for team {}",
                        request.requestor, request.team
                    );
                    self.stats.pending_dropped += 1;
                }
            }
        }

        for entry in self.pending.take_objects() {
            if !self.objects.contains(entry.object) || self.net_owner(entry.object).is_none() {
                debug!("Dropping pending route for {}", entry.object);
                self.set_route(entry.object, None);
                self.stats.pending_dropped += 1;
                continue;
            }

            self.set_route(entry.object, None);
            let route = self.route_add_to_connection(entry.object, entry.policy);
            if matches!(route, Some(RouteTarget::Owner(_)) | Some(RouteTarget::Team(_))) {
                self.stats.pending_resolved += 1;
            }
            self.set_route(entry.object, route);
        }

        self.spatial.prepare_for_replication();
        self.stats.drains += 1;
    }

    /// Objects relevant to a connection this tick. Empty for unknown
    /// connections.
    pub fn gather(&self, connection: ConnectionId) -> GatherResult {
        let Some(graph) = self.connections.get(&connection) else {
            return GatherResult::default();
        };

        let mut result = GatherResult::default();
        self.always_relevant.gather_into(&mut result.always_relevant);
        if let Some(viewer) = self.viewer_location(graph) {
            result.spatial = self.spatial.gather(viewer);
        }
        graph.owner_node.gather_into(&mut result.owner);
        result.team = self.gather_team(connection);
        result.dependents = self.collect_dependents(&result);
        result
    }

    /// Team-relevant objects for a connection.
    ///
    /// A connection without a team only sees its own team container. With
    /// a team, it sees the team containers of every registered teammate,
    /// itself included, in registry order.
    pub fn gather_team(&self, connection: ConnectionId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        let Some(graph) = self.connections.get(&connection) else {
            return out;
        };

        if graph.team.is_none() {
            graph.gather_team_default(&mut out);
            return out;
        }

        for member in self.teams.members(&graph.team) {
            if let Some(teammate) = self.connections.get(member) {
                teammate.gather_team_default(&mut out);
            }
        }
        out
    }

    /// Gathers for every connection in parallel.
    pub fn gather_all(&self) -> HashMap<ConnectionId, GatherResult> {
        self.connections
            .par_iter()
            .map(|(connection, _)| (*connection, self.gather(*connection)))
            .collect()
    }

    fn viewer_location(&self, graph: &ConnectionGraph) -> Option<Vec3> {
        graph.viewer.or_else(|| {
            graph
                .controller
                .and_then(|controller| self.objects.get(controller))
                .map(|record| record.position)
        })
    }

    fn collect_dependents(&self, result: &GatherResult) -> Vec<ObjectId> {
        let mut seen = HashSet::new();
        let mut dependents = Vec::new();
        for object in result.iter() {
            let Some(record) = self.objects.get(object) else {
                continue;
            };
            for dependent in record.dependents.snapshot().iter() {
                if seen.insert(*dependent) {
                    dependents.push(*dependent);
                }
            }
        }
        dependents
    }

    /// Clears the world's routing state ahead of a world transition.
    ///
    /// Global, spatial and per-connection containers, both pending queues
    /// and the object records (dependents included) are emptied. Connections,
    /// their controllers and team tags and the team registry survive.
    /// Objects carried into the new world are added again by the host;
    /// removals of the old world's objects are no-ops.
    pub fn reset_world(&mut self) {
        info!(
            "🔄 Resetting world routing state ({} objects, {} connections)",
            self.objects.len(),
            self.connections.len()
        );

        self.always_relevant.reset();
        self.spatial.reset();
        for graph in self.connections.values_mut() {
            graph.reset_nodes();
        }
        self.pending.clear();
        self.objects.clear();
        self.stats.world_resets += 1;
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    /// Runs one admin console line and returns the lines it printed.
    pub fn execute_console_command(&mut self, line: &str) -> Result<Vec<String>, RelevancyError> {
        match ConsoleCommand::parse(line)? {
            ConsoleCommand::PrintRouting => {
                let lines = self.classes.routing_report();
                for line in &lines {
                    info!("{}", line);
                }
                Ok(lines)
            }
            ConsoleCommand::FrequencyBuckets(buckets) => {
                let message = format!("Setting Frequency Buckets to {}", buckets);
                info!("{}", message);
                self.frequency_bucket_list_size = buckets;
                Ok(vec![message])
            }
        }
    }

    pub fn frequency_bucket_list_size(&self) -> usize {
        self.frequency_bucket_list_size
    }

    /// Squared distance beyond which destruction infos are not sent
    pub fn destruction_info_max_distance_squared(&self) -> f64 {
        self.destruction_info_max_distance_squared
    }

    pub fn class_table(&self) -> &ClassTable {
        &self.classes
    }

    /// Resolved policy of a registered object
    pub fn policy_of(&self, object: ObjectId) -> Option<ClassPolicy> {
        self.objects.get(object).map(|record| record.policy)
    }

    /// Policy of a class, [`RoutingPolicy::NotRouted`] when unknown
    pub fn policy_for_class(&self, class: ClassId) -> RoutingPolicy {
        self.classes.policy(class)
    }

    pub fn route_of(&self, object: ObjectId) -> Option<RouteTarget> {
        self.objects.get(object).and_then(|record| record.route)
    }

    pub fn object(&self, object: ObjectId) -> Option<&ObjectRecord> {
        self.objects.get(object)
    }

    pub fn connection(&self, connection: ConnectionId) -> Option<&ConnectionGraph> {
        self.connections.get(&connection)
    }

    pub fn team_of(&self, connection: ConnectionId) -> Option<&TeamTag> {
        self.connections.get(&connection).map(|graph| &graph.team)
    }

    pub fn teams(&self) -> &TeamRegistry {
        &self.teams
    }

    pub fn pending(&self) -> &PendingQueue {
        &self.pending
    }

    pub fn always_relevant(&self) -> &ActorListNode {
        &self.always_relevant
    }

    pub fn spatial(&self) -> &dyn SpatialIndex {
        self.spatial.as_ref()
    }

    pub fn stats(&self) -> &RoutingStats {
        &self.stats
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of routing containers holding the object. Anything above one
    /// is a routing bug.
    pub fn container_count(&self, object: ObjectId) -> usize {
        let mut count = usize::from(self.always_relevant.contains(object))
            + usize::from(self.spatial.contains(object));
        for graph in self.connections.values() {
            count += usize::from(graph.owner_node.contains(object));
            count += usize::from(graph.team_node.contains(object));
        }
        count
    }

    // ------------------------------------------------------------------
    // Routing
    // ------------------------------------------------------------------

    /// Connection an object resolves to: directly if it identifies one,
    /// else through its net owner.
    fn resolve_connection(&self, object: ObjectId) -> Option<ConnectionId> {
        self.controllers.get(&object).copied().or_else(|| {
            self.net_owner(object)
                .and_then(|owner| self.controllers.get(&owner).copied())
        })
    }

    /// Net-owner identity, treating every mapped controller as one.
    fn net_owner(&self, object: ObjectId) -> Option<ObjectId> {
        self.objects
            .net_owner(object, |id| self.controllers.contains_key(&id))
    }

    fn set_route(&mut self, object: ObjectId, route: Option<RouteTarget>) {
        if let Some(record) = self.objects.get_mut(object) {
            record.route = route;
        }
    }

    fn route_add(&mut self, object: ObjectId) {
        let Some(record) = self.objects.get(object) else {
            return;
        };
        if let Some(existing) = record.route {
            warn!("⚠️ Object {} already routed to {:?}, ignoring", object, existing);
            self.stats.duplicate_adds += 1;
            return;
        }

        let policy = record.policy;
        let info = SpatialActorInfo {
            object,
            class: record.class,
            position: record.position,
            cull_distance_squared: policy.replication.cull_distance_squared,
            dormant: record.dormant,
        };

        let route = match policy.policy {
            RoutingPolicy::NotRouted => {
                debug!("Object {} is not routed", object);
                None
            }
            RoutingPolicy::RelevantAll => {
                self.always_relevant.add(object);
                self.stats.routed_global += 1;
                Some(RouteTarget::Global)
            }
            RoutingPolicy::RelevantOwner | RoutingPolicy::RelevantTeam => {
                self.route_add_to_connection(object, policy.policy)
            }
            spatialized => SpatialMode::from_policy(spatialized).map(|mode| {
                self.spatial.insert(mode, info);
                self.stats.routed_spatial += 1;
                RouteTarget::Spatial(mode)
            }),
        };
        self.set_route(object, route);
    }

    fn route_add_to_connection(&mut self, object: ObjectId, policy: RoutingPolicy) -> Option<RouteTarget> {
        let net_owner = self.net_owner(object);
        let connection = net_owner.and_then(|owner| self.controllers.get(&owner).copied());

        match (connection, net_owner) {
            (Some(connection), _) => {
                let graph = self.connections.get_mut(&connection)?;
                if policy == RoutingPolicy::RelevantOwner {
                    graph.owner_node.add(object);
                    self.stats.routed_owner += 1;
                    debug!("Object {} routed to owner of connection {}", object, connection);
                    Some(RouteTarget::Owner(connection))
                } else {
                    graph.team_node.add(object);
                    self.stats.routed_team += 1;
                    debug!("Object {} routed to team of connection {}", object, connection);
                    Some(RouteTarget::Team(connection))
                }
            }
            (None, Some(owner)) => {
                debug!("Object {} waits for connection of {}", object, owner);
                self.pending.enqueue_object(object, policy);
                self.stats.pending_enqueued += 1;
                Some(RouteTarget::Pending)
            }
            (None, None) => {
                debug!("Object {} has no net owner, left unrouted", object);
                None
            }
        }
    }

    fn route_remove(&mut self, object: ObjectId) {
        let Some(route) = self.objects.get_mut(object).and_then(|record| record.route.take()) else {
            return;
        };

        match route {
            RouteTarget::Global => {
                self.always_relevant.remove(object);
            }
            RouteTarget::Owner(connection) => {
                if let Some(graph) = self.connections.get_mut(&connection) {
                    graph.owner_node.remove(object);
                }
            }
            RouteTarget::Team(connection) => {
                if let Some(graph) = self.connections.get_mut(&connection) {
                    graph.team_node.remove(object);
                }
            }
            RouteTarget::Spatial(mode) => {
                self.spatial.remove(mode, object);
            }
            RouteTarget::Pending => {
                self.pending.cancel_object(object);
            }
        }
    }
}

/// Rebuild blacklist names resolved to classes, subclasses included.
fn resolve_rebuild_blacklist(hierarchy: &ClassHierarchy, spatial: &SpatialConfig) -> HashSet<ClassId> {
    let roots: Vec<ClassId> = spatial
        .rebuild_blacklist
        .iter()
        .filter_map(|name| {
            let class = hierarchy.find(name);
            if class.is_none() {
                warn!("⚠️ Rebuild blacklist names unknown class '{}'", name);
            }
            class
        })
        .collect();

    hierarchy
        .iter()
        .map(|(class, _)| class)
        .filter(|class| roots.iter().any(|root| hierarchy.is_child_of(*class, *root)))
        .collect()
}

impl std::fmt::Debug for RoutingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingContext")
            .field("objects", &self.objects.len())
            .field("connections", &self.connections.len())
            .field("teams", &self.teams.team_count())
            .field("spatial", &self.spatial.len())
            .field("stats", &self.stats)
            .finish()
    }
}
