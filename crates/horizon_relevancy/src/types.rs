//! # Core Type Definitions
//!
//! Identifiers and small value types shared by every part of the relevancy
//! router.
//!
//! ## Key Types
//!
//! - [`ObjectId`] - Unique identifier for a replicated world object
//! - [`ConnectionId`] - Unique identifier for a client connection
//! - [`ClassId`] - Handle to a type registered in the [`ClassHierarchy`](crate::ClassHierarchy)
//! - [`TeamTag`] - Team name, with an explicit "no team" default
//! - [`Vec3`] - Double precision world position

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a replicated object.
///
/// Wraps a UUID so object ids cannot be confused with connection ids.
///
/// # Examples
///
/// ```rust
/// use horizon_relevancy::ObjectId;
///
/// let pawn = ObjectId::new();
/// println!("Spawned {}", pawn);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    /// Creates a new random object ID using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::str::FromStr for ObjectId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a client connection.
///
/// Connection ids are handed to the router by the transport layer through
/// the connection-established and connection-removed notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Creates a new random connection ID using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a type registered in a [`ClassHierarchy`](crate::ClassHierarchy).
///
/// Handles are dense indices; they are only meaningful for the hierarchy
/// that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub u32);

impl ClassId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ClassId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "class#{}", self.0)
    }
}

/// Team a connection belongs to.
///
/// The empty tag is the "no team" default: a connection carrying it is never
/// present in the [`TeamRegistry`](crate::TeamRegistry).
///
/// # Examples
///
/// ```rust
/// use horizon_relevancy::TeamTag;
///
/// let red = TeamTag::new("red");
/// assert!(!red.is_none());
/// assert!(TeamTag::none().is_none());
/// assert_eq!(TeamTag::default(), TeamTag::none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamTag(CompactString);

impl TeamTag {
    /// Creates a team tag. An empty name yields the "no team" tag.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(CompactString::new(name.as_ref()))
    }

    /// The "no team" tag.
    pub fn none() -> Self {
        Self(CompactString::default())
    }

    /// Whether this is the "no team" tag.
    pub fn is_none(&self) -> bool {
        self.0.is_empty()
    }

    /// The team name, empty for "no team".
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for TeamTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            f.write_str("None")
        } else {
            f.write_str(self.0.as_str())
        }
    }
}

impl From<&str> for TeamTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Represents a 3D position in the game world.
///
/// Uses double precision so large worlds keep accurate distances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X coordinate (typically east-west axis)
    pub x: f64,
    /// Y coordinate (typically north-south axis)
    pub y: f64,
    /// Z coordinate (typically vertical axis)
    pub z: f64,
}

impl Vec3 {
    /// Creates a new Vec3 with the specified coordinates.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Creates a zero vector (0, 0, 0).
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Squared Euclidean distance to another point.
    pub fn distance_squared(&self, other: Vec3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: Vec3) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub(crate) fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_tag_none_is_default() {
        assert!(TeamTag::default().is_none());
        assert!(TeamTag::new("").is_none());
        assert_eq!(TeamTag::none().to_string(), "None");
        assert_eq!(TeamTag::from("blue").as_str(), "blue");
    }

    #[test]
    fn test_object_id_round_trips_through_string() {
        let id = ObjectId::new();
        let parsed: ObjectId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_vec3_distance() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 4.0, 0.0);
        assert_eq!(a.distance_squared(b), 25.0);
        assert_eq!(a.distance(b), 5.0);
    }
}
