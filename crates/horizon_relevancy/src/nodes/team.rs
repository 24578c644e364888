//! Team membership registry
use crate::types::{ConnectionId, TeamTag};
use smallvec::SmallVec;
use std::collections::HashMap;

type Members = SmallVec<[ConnectionId; 8]>;

/// Team tag → connections on that team.
///
/// The "no team" tag is never stored and no entry is ever left empty.
#[derive(Debug, Clone, Default)]
pub struct TeamRegistry {
    teams: HashMap<TeamTag, Members>,
}

impl TeamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to a team. Returns `false` for the "no team" tag
    /// or if the connection is already a member.
    pub fn add(&mut self, team: &TeamTag, connection: ConnectionId) -> bool {
        if team.is_none() {
            return false;
        }
        let members = self.teams.entry(team.clone()).or_default();
        if members.contains(&connection) {
            return false;
        }
        members.push(connection);
        true
    }

    /// Removes a connection from a team, dropping the team once empty.
    pub fn remove(&mut self, team: &TeamTag, connection: ConnectionId) -> bool {
        let Some(members) = self.teams.get_mut(team) else {
            return false;
        };
        let Some(position) = members.iter().position(|member| *member == connection) else {
            return false;
        };
        members.swap_remove(position);
        if members.is_empty() {
            self.teams.remove(team);
        }
        true
    }

    /// Members of a team in registry order; empty for unknown teams.
    pub fn members(&self, team: &TeamTag) -> &[ConnectionId] {
        self.teams.get(team).map(|m| m.as_slice()).unwrap_or(&[])
    }

    pub fn contains(&self, team: &TeamTag, connection: ConnectionId) -> bool {
        self.members(team).contains(&connection)
    }

    /// Number of non-empty teams
    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    /// All teams with their members
    pub fn iter(&self) -> impl Iterator<Item = (&TeamTag, &[ConnectionId])> {
        self.teams.iter().map(|(team, members)| (team, members.as_slice()))
    }
}
