#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the wildlife sync layer.
//!
//! This crate defines the vocabulary that connects the external wildlife
//! collaborator, the pure systems, and the coordinator that sequences them.
//! Collaborators implement the capability traits in [`host`], report what
//! happened through [`Event`] values, and accept [`Command`] values from
//! adapters. Systems read immutable snapshots and mutate collaborator state
//! only through the capability traits.

pub mod data;
pub mod error;
pub mod host;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use data::{
    CreatureDataTable, CreatureRecord, EnvironmentAnchorSet, HabitatCode, LocationalData,
    Probability, ProbabilityTable, RarityBucket, SpawnCandidate, SpawnConfig,
};
pub use error::{BridgeError, HostError};

/// Edge length of a single map tile measured in pixels.
pub const TILE_SIZE: f32 = 64.0;

/// Identifier of a connected peer.
///
/// The zero value is reserved as the absent peer and never owns anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerId(u64);

impl PeerId {
    /// The null peer used when no peer is known.
    pub const NONE: PeerId = PeerId(0);

    /// Creates a new peer identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Reports whether this is the null peer.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer#{}", self.0)
    }
}

/// Identifier of a local peer session (one screen of a split-screen process).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u32);

impl SessionId {
    /// Creates a new session identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identity of a wildlife entity owned by the collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Name of a map area. Empty names are never constructed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AreaName(String);

impl AreaName {
    /// Creates an area name, rejecting empty strings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() {
            None
        } else {
            Some(Self(name))
        }
    }

    /// Borrows the area name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compares two names ignoring ASCII case, the way presence scans match areas.
    #[must_use]
    pub fn matches(&self, other: &AreaName) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl TryFrom<String> for AreaName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        AreaName::new(value).ok_or_else(|| "area name must not be empty".to_owned())
    }
}

impl From<AreaName> for String {
    fn from(value: AreaName) -> Self {
        value.0
    }
}

impl fmt::Display for AreaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Continuous position measured in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new point from pixel coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal pixel coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical pixel coordinate; grows downward.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: WorldPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Translates the point by the provided pixel offsets.
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Tile containing the point, truncating toward zero.
    #[must_use]
    pub fn tile(self) -> TileCoord {
        TileCoord::new((self.x / TILE_SIZE) as i32, (self.y / TILE_SIZE) as i32)
    }
}

/// Index of a map tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    x: i32,
    y: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row of the tile.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Pixel position of the tile center.
    #[must_use]
    pub fn center(self) -> WorldPoint {
        WorldPoint::new(
            self.x as f32 * TILE_SIZE + TILE_SIZE / 2.0,
            self.y as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        )
    }
}

/// Direction an actor faces, numbered the way the collaborator numbers it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Toward decreasing rows.
    North,
    /// Toward increasing columns.
    East,
    /// Toward increasing rows.
    South,
    /// Toward decreasing columns.
    West,
}

impl Facing {
    /// Facing that points from an actor's standing point toward a tile.
    ///
    /// The standing point is converted to tile space around the tile the
    /// actor occupies, then the angle to `target` is split into quadrants
    /// centered on each cardinal direction.
    #[must_use]
    pub fn toward_tile(standing: WorldPoint, target: TileCoord) -> Self {
        let center_x = (standing.x() + TILE_SIZE / 2.0) / TILE_SIZE;
        let center_y = (standing.y() + TILE_SIZE / 2.0) / TILE_SIZE;
        let dx = target.x() as f32 - center_x;
        let dy = target.y() as f32 - center_y;
        let angle = dy.atan2(dx);

        let quarter = std::f32::consts::FRAC_PI_4;
        if (-quarter..quarter).contains(&angle) {
            Self::East
        } else if (quarter..3.0 * quarter).contains(&angle) {
            Self::South
        } else if angle >= 3.0 * quarter || angle < -3.0 * quarter {
            Self::West
        } else {
            Self::North
        }
    }

    /// Pixel offset that steps `distance` pixels against this facing.
    #[must_use]
    pub const fn backoff(self, distance: f32) -> (f32, f32) {
        match self {
            Self::North => (0.0, distance),
            Self::East => (-distance, 0.0),
            Self::South => (0.0, -distance),
            Self::West => (distance, 0.0),
        }
    }
}

/// Control scheme used by the local session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputMode {
    /// Keyboard and mouse with a precise cursor.
    #[default]
    Mouse,
    /// Gamepad with a coarser cursor.
    Gamepad,
}

/// Kind of thrown consumable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThrowVariant {
    /// Regular throwable.
    #[default]
    Standard,
    /// Boosted throwable with a wider catch radius and a higher spawn chance.
    Boosted,
}

/// Explicit per-session context passed to every session-scoped operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionContext {
    /// Local session issuing the call.
    pub session: SessionId,
    /// Peer controlled by the session.
    pub peer: PeerId,
    /// Whether this process is authoritative for spawn, despawn and capture.
    pub is_host: bool,
    /// Control scheme in use on the session.
    pub input_mode: InputMode,
}

impl SessionContext {
    /// Context for the host peer using mouse controls.
    #[must_use]
    pub const fn host(session: SessionId, peer: PeerId) -> Self {
        Self {
            session,
            peer,
            is_host: true,
            input_mode: InputMode::Mouse,
        }
    }

    /// Context for a non-host peer using mouse controls.
    #[must_use]
    pub const fn guest(session: SessionId, peer: PeerId) -> Self {
        Self {
            session,
            peer,
            is_host: false,
            input_mode: InputMode::Mouse,
        }
    }

    /// Copy of the context with a different input mode.
    #[must_use]
    pub const fn with_input_mode(mut self, input_mode: InputMode) -> Self {
        self.input_mode = input_mode;
        self
    }
}

/// Immutable view of a wildlife entity used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySnapshot {
    /// Identity of the entity.
    pub id: EntityId,
    /// Creature key the entity was created from.
    pub key: String,
    /// Effective pixel position.
    pub position: WorldPoint,
    /// Area the entity currently lives in, if any.
    pub area: Option<AreaName>,
    /// Whether the entity left lifecycle management.
    pub released: bool,
}

/// Immutable view of a connected peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerSnapshot {
    /// Identity of the peer.
    pub id: PeerId,
    /// Area the peer currently occupies, if any.
    pub area: Option<AreaName>,
}

/// Position and facing of an actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorPose {
    /// Top-left pixel position of the actor.
    pub position: WorldPoint,
    /// Direction the actor faces.
    pub facing: Facing,
}

impl ActorPose {
    /// Pixel point the actor stands on.
    #[must_use]
    pub fn standing_point(&self) -> WorldPoint {
        self.position.offset(TILE_SIZE / 2.0, TILE_SIZE / 2.0)
    }
}

/// Commands that adapters submit to the collaborator world.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Connects a peer and places it in an area.
    ConnectPeer {
        /// Peer joining the world.
        peer: PeerId,
        /// Area the peer arrives in.
        area: AreaName,
        /// Tile the peer stands on after arriving.
        tile: TileCoord,
    },
    /// Moves a peer from its current area into another.
    WarpPeer {
        /// Peer changing areas.
        peer: PeerId,
        /// Destination area.
        to: AreaName,
        /// Tile the peer stands on after arriving.
        tile: TileCoord,
    },
    /// Disconnects a peer.
    DisconnectPeer {
        /// Peer leaving the world.
        peer: PeerId,
    },
    /// Marks an entity as released from lifecycle management.
    ReleaseEntity {
        /// Entity that should no longer be despawned.
        entity: EntityId,
    },
}

/// Events the collaborator broadcasts after state changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A peer connected.
    PeerConnected {
        /// Peer that joined.
        peer: PeerId,
        /// Area the peer arrived in.
        area: AreaName,
    },
    /// A peer changed areas.
    PeerWarped {
        /// Peer that moved.
        peer: PeerId,
        /// Area the peer left, if it had one.
        from: Option<AreaName>,
        /// Area the peer entered.
        to: AreaName,
    },
    /// A peer disconnected.
    PeerDisconnected {
        /// Peer that left.
        peer: PeerId,
        /// Area the peer occupied before leaving.
        from: Option<AreaName>,
    },
    /// An entity joined the registry.
    EntityCreated {
        /// Identity of the new entity.
        entity: EntityId,
        /// Area the entity was placed in.
        area: AreaName,
    },
    /// An entity left the registry.
    EntityRemoved {
        /// Identity of the removed entity.
        entity: EntityId,
    },
    /// An entity was released from lifecycle management.
    EntityReleased {
        /// Identity of the released entity.
        entity: EntityId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_peer_is_reported_as_none() {
        assert!(PeerId::NONE.is_none());
        assert!(!PeerId::new(7).is_none());
    }

    #[test]
    fn area_names_reject_empty_strings() {
        assert!(AreaName::new("").is_none());
        let pond = AreaName::new("Pond").expect("area");
        assert_eq!(pond.as_str(), "Pond");
    }

    #[test]
    fn area_matching_ignores_case() {
        let upper = AreaName::new("Pond").expect("area");
        let lower = AreaName::new("pond").expect("area");
        assert!(upper.matches(&lower));
        assert_ne!(upper, lower);
    }

    #[test]
    fn tile_center_sits_half_a_tile_in() {
        let center = TileCoord::new(2, 3).center();
        assert_eq!(center, WorldPoint::new(160.0, 224.0));
        assert_eq!(center.tile(), TileCoord::new(2, 3));
    }

    #[test]
    fn facing_points_toward_target_quadrant() {
        let standing = WorldPoint::new(5.0 * TILE_SIZE, 5.0 * TILE_SIZE);
        assert_eq!(Facing::toward_tile(standing, TileCoord::new(9, 5)), Facing::East);
        assert_eq!(Facing::toward_tile(standing, TileCoord::new(5, 9)), Facing::South);
        assert_eq!(Facing::toward_tile(standing, TileCoord::new(1, 5)), Facing::West);
        assert_eq!(Facing::toward_tile(standing, TileCoord::new(5, 1)), Facing::North);
    }

    #[test]
    fn backoff_steps_against_facing() {
        assert_eq!(Facing::North.backoff(96.0), (0.0, 96.0));
        assert_eq!(Facing::East.backoff(96.0), (-96.0, 0.0));
        assert_eq!(Facing::South.backoff(96.0), (0.0, -96.0));
        assert_eq!(Facing::West.backoff(96.0), (96.0, 0.0));
    }
}
