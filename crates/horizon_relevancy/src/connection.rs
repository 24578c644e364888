//! Per-connection routing state
use crate::nodes::ActorListNode;
use crate::types::{ConnectionId, ObjectId, TeamTag, Vec3};

/// Routing containers and team tag of one client connection.
#[derive(Debug, Clone)]
pub struct ConnectionGraph {
    pub id: ConnectionId,
    /// Controller object the host identified the connection by, if any
    pub controller: Option<ObjectId>,
    pub(crate) owner_node: ActorListNode,
    pub(crate) team_node: ActorListNode,
    pub(crate) team: TeamTag,
    pub(crate) viewer: Option<Vec3>,
}

impl ConnectionGraph {
    pub fn new(id: ConnectionId, controller: Option<ObjectId>) -> Self {
        Self {
            id,
            controller,
            owner_node: ActorListNode::new(),
            team_node: ActorListNode::new(),
            team: TeamTag::none(),
            viewer: None,
        }
    }

    /// Whether routing can reach this connection through owned objects
    pub fn is_degraded(&self) -> bool {
        self.controller.is_none()
    }

    pub fn team(&self) -> &TeamTag {
        &self.team
    }

    /// Objects relevant only to this connection
    pub fn owner_node(&self) -> &ActorListNode {
        &self.owner_node
    }

    /// Objects this connection shares with its team
    pub fn team_node(&self) -> &ActorListNode {
        &self.team_node
    }

    pub fn viewer(&self) -> Option<Vec3> {
        self.viewer
    }

    /// Appends this connection's own team node, without delegating to
    /// teammates.
    pub fn gather_team_default(&self, out: &mut Vec<ObjectId>) {
        self.team_node.gather_into(out);
    }

    pub(crate) fn reset_nodes(&mut self) {
        self.owner_node.reset();
        self.team_node.reset();
    }
}
