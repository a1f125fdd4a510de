//! Capability traits the external wildlife collaborator implements.
//!
//! Every trait is object safe so that systems can be driven either by a
//! concrete collaborator or through `dyn` references handed across module
//! boundaries, as the spawn bridge does.

use crate::{
    ActorPose, AreaName, CreatureDataTable, EntityId, EntitySnapshot, EnvironmentAnchorSet,
    HostError, LocationalData, PeerId, PeerSnapshot, SpawnConfig, TileCoord,
};

/// Registry of live wildlife entities.
pub trait EntityRegistry {
    /// Snapshots of every registered entity in registry order.
    fn entities(&self) -> Vec<EntitySnapshot>;

    /// Number of registered entities.
    fn entity_count(&self) -> usize {
        self.entities().len()
    }

    /// Snapshot of a single entity.
    fn entity(&self, id: EntityId) -> Option<EntitySnapshot> {
        self.entities().into_iter().find(|entity| entity.id == id)
    }

    /// Creates an entity from a bare creature key, appending it to the registry.
    fn create_entity(
        &mut self,
        key: &str,
        tile: TileCoord,
        area: &AreaName,
    ) -> Result<EntityId, HostError>;

    /// Removes an entity from the registry.
    fn remove_entity(&mut self, id: EntityId) -> Result<(), HostError>;
}

/// Session collaborator listing connected peers.
pub trait PeerPresence {
    /// Every connected peer with its current area.
    fn peers(&self) -> Vec<PeerSnapshot>;

    /// Current area of a single peer.
    fn area_of(&self, peer: PeerId) -> Option<AreaName> {
        self.peers()
            .into_iter()
            .find(|snapshot| snapshot.id == peer)
            .and_then(|snapshot| snapshot.area)
    }
}

/// Map queries over static terrain.
pub trait TerrainQuery {
    /// Tiles holding trees.
    fn trees(&self, area: &AreaName) -> Result<Vec<TileCoord>, HostError>;
    /// Tiles holding bushes.
    fn bushes(&self, area: &AreaName) -> Result<Vec<TileCoord>, HostError>;
    /// Tiles holding stumps.
    fn stumps(&self, area: &AreaName) -> Result<Vec<TileCoord>, HostError>;
    /// Open-water tiles used as spawn anchors.
    fn water(&self, area: &AreaName) -> Result<Vec<TileCoord>, HostError>;
    /// Whether the tile is any kind of water.
    fn is_water_tile(&self, area: &AreaName, tile: TileCoord) -> bool;
    /// Whether the tile is open water suitable for spawning.
    fn is_open_water(&self, area: &AreaName, tile: TileCoord) -> bool;
    /// Width and height of the area's map in tiles.
    fn map_size(&self, area: &AreaName) -> Option<(i32, i32)>;
}

/// The collaborator's own spawn machinery and its single mutable workspace.
pub trait SpawnWorkspace {
    /// Working spawn configuration the collaborator currently applies.
    fn spawn_config(&self) -> SpawnConfig;
    /// Overwrites the working spawn configuration.
    fn set_spawn_config(&mut self, config: SpawnConfig);
    /// Overwrites the anchor fields the collaborator's spawn routine reads.
    fn set_anchors(&mut self, anchors: EnvironmentAnchorSet);
    /// Creatures the collaborator considers native to an area.
    fn creatures_for_area(&self, area: &AreaName) -> Result<LocationalData, HostError>;
    /// The collaborator's own rarity roll over a pool of native creatures.
    fn roll_native_rarity(&mut self, pool: &LocationalData) -> Option<String>;
    /// Runs the collaborator's spawn routine for one area.
    fn try_spawn_from_area(&mut self, area: &AreaName) -> Result<(), HostError>;
    /// Runs the collaborator's periodic spawn evaluation for the current area.
    fn run_spawn_pass(&mut self, area: &AreaName) -> Result<(), HostError>;
    /// The collaborator's default "clear everything unclaimed" routine.
    fn clear_unclaimed_default(&mut self, area: &AreaName);
}

/// Actor state and the collaborator's capture operation.
pub trait ActorHost {
    /// Pose of the actor controlled by `peer`.
    fn actor_pose(&self, peer: PeerId) -> Option<ActorPose>;
    /// Overwrites the pose of the actor controlled by `peer`.
    fn set_actor_pose(&mut self, peer: PeerId, pose: ActorPose);
    /// Swaps the process-wide current actor, returning the previous occupant.
    fn replace_current_actor(&mut self, peer: PeerId) -> PeerId;
    /// Capture attempt by the current actor; requires the actor to stand close.
    fn try_capture(&mut self, peer: PeerId) -> Result<(), HostError>;
}

/// Static creature catalogue.
pub trait CreatureCatalog {
    /// The catalogue, if the collaborator exposes one.
    fn creature_data(&self) -> Option<&CreatureDataTable>;
}

/// Full capability set of the wildlife collaborator.
pub trait WildlifeHost:
    EntityRegistry + PeerPresence + TerrainQuery + SpawnWorkspace + ActorHost + CreatureCatalog
{
}

impl<T> WildlifeHost for T where
    T: EntityRegistry + PeerPresence + TerrainQuery + SpawnWorkspace + ActorHost + CreatureCatalog
{
}
