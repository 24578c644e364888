//! Deferred routing work.
//!
//! Connection-specific objects whose owning connection does not exist yet,
//! and team requests issued before the requestor's connection exists, wait
//! here until the next reconciliation pass. Each pass takes the whole queue
//! first, so anything re-queued while draining waits for the following tick.

use crate::classification::RoutingPolicy;
use crate::types::{ObjectId, TeamTag};
use std::mem;

/// Object waiting for its owner's connection
#[derive(Debug, Clone, PartialEq)]
pub struct PendingObjectRoute {
    pub object: ObjectId,
    pub policy: RoutingPolicy,
}

/// Team request waiting for the requestor's connection
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTeamAssignment {
    pub requestor: ObjectId,
    pub team: TeamTag,
}

#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    objects: Vec<PendingObjectRoute>,
    teams: Vec<PendingTeamAssignment>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an object route. Returns `false` if the object is already queued.
    pub fn enqueue_object(&mut self, object: ObjectId, policy: RoutingPolicy) -> bool {
        if self.is_object_pending(object) {
            return false;
        }
        self.objects.push(PendingObjectRoute { object, policy });
        true
    }

    /// Cancels a queued object route. Returns `false` if none was queued.
    pub fn cancel_object(&mut self, object: ObjectId) -> bool {
        let before = self.objects.len();
        self.objects.retain(|entry| entry.object != object);
        self.objects.len() != before
    }

    pub fn is_object_pending(&self, object: ObjectId) -> bool {
        self.objects.iter().any(|entry| entry.object == object)
    }

    /// Queues a team request. Requests are applied in the order queued.
    pub fn enqueue_team(&mut self, requestor: ObjectId, team: TeamTag) {
        self.teams.push(PendingTeamAssignment { requestor, team });
    }

    /// Takes every queued object route, leaving the queue empty
    pub fn take_objects(&mut self) -> Vec<PendingObjectRoute> {
        mem::take(&mut self.objects)
    }

    /// Takes every queued team request, leaving the queue empty
    pub fn take_teams(&mut self) -> Vec<PendingTeamAssignment> {
        mem::take(&mut self.teams)
    }

    pub fn objects(&self) -> &[PendingObjectRoute] {
        &self.objects
    }

    pub fn teams(&self) -> &[PendingTeamAssignment] {
        &self.teams
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.teams.is_empty()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.teams.clear();
    }
}
