#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! In-memory wildlife collaborator.
//!
//! The world plays the part of the external simulation the sync layer sits
//! on: it stores areas, peers, actors and wildlife entities, exposes them
//! through the capability traits in [`wildlife_sync_core::host`], and reports
//! every state change as an [`Event`]. Its own spawn and capture routines are
//! intentionally naive so that the systems wrapped around them are observable
//! in tests.

mod area;

use std::collections::BTreeMap;

use wildlife_sync_core::{
    host::{
        ActorHost, CreatureCatalog, EntityRegistry, PeerPresence, SpawnWorkspace, TerrainQuery,
    },
    ActorPose, AreaName, Command, CreatureDataTable, EntityId, EntitySnapshot,
    EnvironmentAnchorSet, Event, Facing, HabitatCode, HostError, LocationalData, PeerId,
    PeerSnapshot, SpawnConfig, TileCoord, WorldPoint, TILE_SIZE,
};

pub use area::AreaLayout;

const DEFAULT_RNG_SEED: u64 = 0x42f0_e1eb_d4a5_3c21;

/// Furthest distance, measured from the actor's top-left corner, at which the
/// world's capture routine still grabs an entity.
pub const CAPTURE_REACH: f32 = 2.0 * TILE_SIZE;

/// Failures the world injects into its capability calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FaultPlan {
    /// `remove_entity` fails for every entity.
    pub fail_removals: bool,
    /// `try_capture` fails before touching any entity.
    pub fail_capture: bool,
    /// Every terrain anchor query fails.
    pub fail_terrain: bool,
    /// `try_spawn_from_area` fails before spawning.
    pub fail_spawn: bool,
}

/// Record of an entity taken by the world's capture routine.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureRecord {
    /// Peer whose actor performed the capture.
    pub peer: PeerId,
    /// Entity that was captured.
    pub entity: EntityId,
    /// Creature key of the captured entity.
    pub key: String,
    /// Actor pose at the time of the capture.
    pub pose: ActorPose,
}

/// Record of one periodic spawn pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnPassRecord {
    /// Area evaluated by the pass.
    pub area: AreaName,
    /// Working spawn configuration at the start of the pass.
    pub config: SpawnConfig,
}

/// Record of one call into the world's spawn routine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnRecord {
    /// Area the spawn was requested for.
    pub area: AreaName,
    /// Area the anchors in the workspace were computed from.
    pub anchors_from: Option<AreaName>,
    /// Entity created by the call, if any.
    pub entity: Option<EntityId>,
}

#[derive(Clone, Debug)]
struct PeerState {
    id: PeerId,
    area: Option<AreaName>,
    pose: ActorPose,
}

#[derive(Clone, Debug)]
struct EntityState {
    id: EntityId,
    key: String,
    position: WorldPoint,
    area: Option<AreaName>,
    released: bool,
}

impl EntityState {
    fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            key: self.key.clone(),
            position: self.position,
            area: self.area.clone(),
            released: self.released,
        }
    }
}

/// Represents the collaborator's authoritative wildlife state.
#[derive(Debug)]
pub struct World {
    areas: BTreeMap<AreaName, AreaLayout>,
    peers: Vec<PeerState>,
    entities: Vec<EntityState>,
    next_entity_id: u32,
    current_actor: PeerId,
    spawn_config: SpawnConfig,
    anchors: Option<EnvironmentAnchorSet>,
    native_creatures: BTreeMap<AreaName, LocationalData>,
    catalog: Option<CreatureDataTable>,
    rng_state: u64,
    faults: FaultPlan,
    captures: Vec<CaptureRecord>,
    spawn_passes: Vec<SpawnPassRecord>,
    spawn_log: Vec<SpawnRecord>,
    pending_events: Vec<Event>,
}

impl World {
    /// Creates an empty world using the default random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_RNG_SEED)
    }

    /// Creates an empty world whose internal rolls follow `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            areas: BTreeMap::new(),
            peers: Vec::new(),
            entities: Vec::new(),
            next_entity_id: 1,
            current_actor: PeerId::NONE,
            spawn_config: SpawnConfig::default(),
            anchors: None,
            native_creatures: BTreeMap::new(),
            catalog: None,
            rng_state: seed,
            faults: FaultPlan::default(),
            captures: Vec::new(),
            spawn_passes: Vec::new(),
            spawn_log: Vec::new(),
            pending_events: Vec::new(),
        }
    }

    /// Loads an area, replacing any previous layout with the same name.
    pub fn add_area(&mut self, layout: AreaLayout) {
        let _ = self.areas.insert(layout.name.clone(), layout);
    }

    /// Installs the static creature catalogue.
    pub fn set_catalog(&mut self, catalog: CreatureDataTable) {
        self.catalog = Some(catalog);
    }

    /// Declares which creatures are native to an area.
    pub fn set_native_creatures(&mut self, area: AreaName, creatures: LocationalData) {
        let _ = self.native_creatures.insert(area, creatures);
    }

    /// Replaces the injected failures.
    pub fn set_faults(&mut self, faults: FaultPlan) {
        self.faults = faults;
    }

    /// Places an entity at an exact pixel position, bypassing spawn rules.
    pub fn place_entity(
        &mut self,
        key: impl Into<String>,
        position: WorldPoint,
        area: &AreaName,
    ) -> EntityId {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id = self.next_entity_id.saturating_add(1);
        self.entities.push(EntityState {
            id,
            key: key.into(),
            position,
            area: Some(area.clone()),
            released: false,
        });
        self.pending_events.push(Event::EntityCreated {
            entity: id,
            area: area.clone(),
        });
        id
    }

    /// Moves events produced by capability calls into `out_events`.
    pub fn drain_events(&mut self, out_events: &mut Vec<Event>) {
        out_events.append(&mut self.pending_events);
    }

    fn area(&self, area: &AreaName) -> Result<&AreaLayout, HostError> {
        self.areas
            .get(area)
            .ok_or_else(|| HostError::MissingArea(area.clone()))
    }

    fn terrain_list(
        &self,
        area: &AreaName,
        select: fn(&AreaLayout) -> Vec<TileCoord>,
    ) -> Result<Vec<TileCoord>, HostError> {
        if self.faults.fail_terrain {
            return Err(HostError::operation("terrain", "query failure injected"));
        }
        self.area(area).map(select)
    }

    fn peer_mut(&mut self, peer: PeerId) -> Option<&mut PeerState> {
        self.peers.iter_mut().find(|state| state.id == peer)
    }

    fn next_index(&mut self, len: usize) -> usize {
        self.rng_state = next_random(self.rng_state);
        ((self.rng_state >> 33) as usize) % len.max(1)
    }

    fn remove_at(&mut self, index: usize) -> EntityState {
        let removed = self.entities.remove(index);
        self.pending_events
            .push(Event::EntityRemoved { entity: removed.id });
        removed
    }

    fn spawn_anchor(&mut self, key: &str) -> Option<TileCoord> {
        let anchors = self.anchors.as_ref()?;
        let habitat = self
            .spawn_config
            .locational_data
            .get(key)
            .map_or(HabitatCode::Unspecified, |record| record.habitat());
        let pool: Vec<TileCoord> = match habitat {
            HabitatCode::Water => anchors.water.clone(),
            HabitatCode::Ground(_) | HabitatCode::Unspecified => anchors
                .trees
                .iter()
                .chain(&anchors.bushes)
                .chain(&anchors.stumps)
                .chain(&anchors.water)
                .copied()
                .collect(),
        };
        if pool.is_empty() {
            return None;
        }
        let index = self.next_index(pool.len());
        pool.get(index).copied()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry for World {
    fn entities(&self) -> Vec<EntitySnapshot> {
        self.entities.iter().map(EntityState::snapshot).collect()
    }

    fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn entity(&self, id: EntityId) -> Option<EntitySnapshot> {
        self.entities
            .iter()
            .find(|entity| entity.id == id)
            .map(EntityState::snapshot)
    }

    fn create_entity(
        &mut self,
        key: &str,
        tile: TileCoord,
        area: &AreaName,
    ) -> Result<EntityId, HostError> {
        if key.is_empty() {
            return Err(HostError::UnknownKey(key.to_owned()));
        }
        if !self.area(area)?.contains(tile) {
            return Err(HostError::operation(
                "create_entity",
                format!("tile {tile:?} lies outside '{area}'"),
            ));
        }

        let id = self.place_entity(key, tile.center(), area);
        log::trace!("world created {id:?} ('{key}') at {tile:?} in '{area}'");
        Ok(id)
    }

    fn remove_entity(&mut self, id: EntityId) -> Result<(), HostError> {
        if self.faults.fail_removals {
            return Err(HostError::operation("remove_entity", "removal failure injected"));
        }
        let index = self
            .entities
            .iter()
            .position(|entity| entity.id == id)
            .ok_or(HostError::MissingEntity(id))?;
        let _ = self.remove_at(index);
        Ok(())
    }
}

impl PeerPresence for World {
    fn peers(&self) -> Vec<PeerSnapshot> {
        self.peers
            .iter()
            .map(|state| PeerSnapshot {
                id: state.id,
                area: state.area.clone(),
            })
            .collect()
    }
}

impl TerrainQuery for World {
    fn trees(&self, area: &AreaName) -> Result<Vec<TileCoord>, HostError> {
        self.terrain_list(area, |layout| layout.trees.clone())
    }

    fn bushes(&self, area: &AreaName) -> Result<Vec<TileCoord>, HostError> {
        self.terrain_list(area, |layout| layout.bushes.clone())
    }

    fn stumps(&self, area: &AreaName) -> Result<Vec<TileCoord>, HostError> {
        self.terrain_list(area, |layout| layout.stumps.clone())
    }

    fn water(&self, area: &AreaName) -> Result<Vec<TileCoord>, HostError> {
        self.terrain_list(area, |layout| layout.open_water.iter().copied().collect())
    }

    fn is_water_tile(&self, area: &AreaName, tile: TileCoord) -> bool {
        self.areas
            .get(area)
            .is_some_and(|layout| layout.water.contains(&tile))
    }

    fn is_open_water(&self, area: &AreaName, tile: TileCoord) -> bool {
        self.areas
            .get(area)
            .is_some_and(|layout| layout.open_water.contains(&tile))
    }

    fn map_size(&self, area: &AreaName) -> Option<(i32, i32)> {
        self.areas
            .get(area)
            .map(|layout| (layout.columns, layout.rows))
    }
}

impl SpawnWorkspace for World {
    fn spawn_config(&self) -> SpawnConfig {
        self.spawn_config.clone()
    }

    fn set_spawn_config(&mut self, config: SpawnConfig) {
        self.spawn_config = config;
    }

    fn set_anchors(&mut self, anchors: EnvironmentAnchorSet) {
        self.anchors = Some(anchors);
    }

    fn creatures_for_area(&self, area: &AreaName) -> Result<LocationalData, HostError> {
        let _ = self.area(area)?;
        Ok(self
            .native_creatures
            .get(area)
            .cloned()
            .unwrap_or_default())
    }

    fn roll_native_rarity(&mut self, pool: &LocationalData) -> Option<String> {
        if pool.is_empty() {
            return None;
        }
        let index = self.next_index(pool.len());
        pool.keys().nth(index).cloned()
    }

    fn try_spawn_from_area(&mut self, area: &AreaName) -> Result<(), HostError> {
        if self.faults.fail_spawn {
            return Err(HostError::operation("try_spawn_from_area", "spawn failure injected"));
        }
        let _ = self.area(area)?;

        let anchors_from = self.anchors.as_ref().map(|anchors| anchors.area.clone());
        let mut record = SpawnRecord {
            area: area.clone(),
            anchors_from,
            entity: None,
        };

        let slots = self.spawn_config.spawn_list.len();
        if slots > 0 {
            let index = self.next_index(slots);
            let key = self
                .spawn_config
                .spawn_list
                .get(index)
                .cloned()
                .unwrap_or_default();
            if !key.is_empty() {
                if let Some(tile) = self.spawn_anchor(&key) {
                    // Anchors from another area may not fit this map.
                    match self.create_entity(&key, tile, area) {
                        Ok(entity) => record.entity = Some(entity),
                        Err(error) => log::debug!("world spawn of '{key}' skipped: {error}"),
                    }
                }
            }
        }

        self.spawn_log.push(record);
        Ok(())
    }

    fn run_spawn_pass(&mut self, area: &AreaName) -> Result<(), HostError> {
        let _ = self.area(area)?;
        self.spawn_passes.push(SpawnPassRecord {
            area: area.clone(),
            config: self.spawn_config.clone(),
        });
        Ok(())
    }

    fn clear_unclaimed_default(&mut self, area: &AreaName) {
        let mut index = self.entities.len();
        while index > 0 {
            index -= 1;
            let entity = &self.entities[index];
            if !entity.released && entity.area.as_ref() != Some(area) {
                let _ = self.remove_at(index);
            }
        }
    }
}

impl ActorHost for World {
    fn actor_pose(&self, peer: PeerId) -> Option<ActorPose> {
        self.peers
            .iter()
            .find(|state| state.id == peer)
            .map(|state| state.pose)
    }

    fn set_actor_pose(&mut self, peer: PeerId, pose: ActorPose) {
        if let Some(state) = self.peer_mut(peer) {
            state.pose = pose;
        }
    }

    fn replace_current_actor(&mut self, peer: PeerId) -> PeerId {
        std::mem::replace(&mut self.current_actor, peer)
    }

    fn try_capture(&mut self, peer: PeerId) -> Result<(), HostError> {
        if self.faults.fail_capture {
            return Err(HostError::operation("try_capture", "capture failure injected"));
        }
        if self.current_actor != peer {
            return Err(HostError::operation(
                "try_capture",
                format!("{peer} is not the current actor"),
            ));
        }
        let (pose, area) = self
            .peers
            .iter()
            .find(|state| state.id == peer)
            .map(|state| (state.pose, state.area.clone()))
            .ok_or(HostError::MissingActor(peer))?;

        let target = self.entities.iter().position(|entity| {
            !entity.released
                && entity.area.is_some()
                && entity.area == area
                && entity.position.distance(pose.position) <= CAPTURE_REACH
        });
        if let Some(index) = target {
            let captured = self.remove_at(index);
            log::trace!("world capture of {:?} by {peer}", captured.id);
            self.captures.push(CaptureRecord {
                peer,
                entity: captured.id,
                key: captured.key,
                pose,
            });
        }
        Ok(())
    }
}

impl CreatureCatalog for World {
    fn creature_data(&self) -> Option<&CreatureDataTable> {
        self.catalog.as_ref()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Events produced by earlier capability calls are flushed ahead of the
/// command's own events.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    world.drain_events(out_events);
    match command {
        Command::ConnectPeer { peer, area, tile } => {
            if peer.is_none() {
                return;
            }
            let pose = ActorPose {
                position: tile_origin(tile),
                facing: Facing::South,
            };
            match world.peer_mut(peer) {
                Some(state) => {
                    state.area = Some(area.clone());
                    state.pose = pose;
                }
                None => world.peers.push(PeerState {
                    id: peer,
                    area: Some(area.clone()),
                    pose,
                }),
            }
            out_events.push(Event::PeerConnected { peer, area });
        }
        Command::WarpPeer { peer, to, tile } => {
            let Some(state) = world.peer_mut(peer) else {
                log::debug!("ignoring warp of unknown {peer}");
                return;
            };
            let from = state.area.replace(to.clone());
            state.pose.position = tile_origin(tile);
            out_events.push(Event::PeerWarped { peer, from, to });
        }
        Command::DisconnectPeer { peer } => {
            let Some(index) = world.peers.iter().position(|state| state.id == peer) else {
                return;
            };
            let state = world.peers.remove(index);
            if world.current_actor == peer {
                world.current_actor = PeerId::NONE;
            }
            out_events.push(Event::PeerDisconnected {
                peer,
                from: state.area,
            });
        }
        Command::ReleaseEntity { entity } => {
            if let Some(state) = world.entities.iter_mut().find(|state| state.id == entity) {
                if !state.released {
                    state.released = true;
                    out_events.push(Event::EntityReleased { entity });
                }
            }
        }
    }
}

fn tile_origin(tile: TileCoord) -> WorldPoint {
    WorldPoint::new(tile.x() as f32 * TILE_SIZE, tile.y() as f32 * TILE_SIZE)
}

fn next_random(state: u64) -> u64 {
    state.wrapping_mul(636_413_622_384_679_3005).wrapping_add(1)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use wildlife_sync_core::{AreaName, EnvironmentAnchorSet, PeerId};

    use super::{CaptureRecord, SpawnPassRecord, SpawnRecord, World};

    /// Captures performed by the world's capture routine, oldest first.
    #[must_use]
    pub fn captures(world: &World) -> &[CaptureRecord] {
        &world.captures
    }

    /// Periodic spawn passes the world has run, oldest first.
    #[must_use]
    pub fn spawn_passes(world: &World) -> &[SpawnPassRecord] {
        &world.spawn_passes
    }

    /// Calls into the world's spawn routine, oldest first.
    #[must_use]
    pub fn spawn_log(world: &World) -> &[SpawnRecord] {
        &world.spawn_log
    }

    /// Anchors currently written into the spawn workspace.
    #[must_use]
    pub fn anchors(world: &World) -> Option<&EnvironmentAnchorSet> {
        world.anchors.as_ref()
    }

    /// Occupant of the current-actor slot.
    #[must_use]
    pub fn current_actor(world: &World) -> PeerId {
        world.current_actor
    }

    /// Number of live entities placed in `area`.
    #[must_use]
    pub fn entities_in(world: &World, area: &AreaName) -> usize {
        world
            .entities
            .iter()
            .filter(|entity| entity.area.as_ref() == Some(area))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wildlife_sync_core::CreatureRecord;

    fn area(name: &str) -> AreaName {
        AreaName::new(name).expect("area name")
    }

    fn world_with_pond() -> World {
        let mut world = World::new();
        world.add_area(
            AreaLayout::new(area("Pond"), 10, 10)
                .with_open_water([TileCoord::new(4, 4), TileCoord::new(5, 4)])
                .with_shallow_water([TileCoord::new(3, 4)])
                .with_trees([TileCoord::new(1, 1)]),
        );
        world.add_area(AreaLayout::new(area("Farm"), 10, 10));
        world
    }

    #[test]
    fn apply_reports_peer_movement() {
        let mut world = world_with_pond();
        let mut events = Vec::new();
        let peer = PeerId::new(1);

        apply(
            &mut world,
            Command::ConnectPeer {
                peer,
                area: area("Pond"),
                tile: TileCoord::new(2, 2),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::WarpPeer {
                peer,
                to: area("Farm"),
                tile: TileCoord::new(0, 0),
            },
            &mut events,
        );
        apply(&mut world, Command::DisconnectPeer { peer }, &mut events);

        assert_eq!(
            events,
            vec![
                Event::PeerConnected {
                    peer,
                    area: area("Pond"),
                },
                Event::PeerWarped {
                    peer,
                    from: Some(area("Pond")),
                    to: area("Farm"),
                },
                Event::PeerDisconnected {
                    peer,
                    from: Some(area("Farm")),
                },
            ]
        );
        assert!(world.peers().is_empty());
    }

    #[test]
    fn created_entities_sit_on_tile_centers_and_append() {
        let mut world = world_with_pond();
        let pond = area("Pond");
        let first = world.place_entity("Carp", WorldPoint::new(1.0, 1.0), &pond);
        let second = world
            .create_entity("Bass", TileCoord::new(4, 4), &pond)
            .expect("create");

        let entities = world.entities();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].id, first);
        assert_eq!(entities[1].id, second);
        assert_eq!(entities[1].position, TileCoord::new(4, 4).center());
    }

    #[test]
    fn create_entity_rejects_unknown_area_and_empty_key() {
        let mut world = world_with_pond();
        assert_eq!(
            world.create_entity("Carp", TileCoord::new(0, 0), &area("Cave")),
            Err(HostError::MissingArea(area("Cave")))
        );
        assert_eq!(
            world.create_entity("", TileCoord::new(0, 0), &area("Pond")),
            Err(HostError::UnknownKey(String::new()))
        );
    }

    #[test]
    fn default_clearing_spares_released_and_local_entities() {
        let mut world = world_with_pond();
        let pond = area("Pond");
        let farm = area("Farm");
        let local = world.place_entity("Carp", WorldPoint::new(0.0, 0.0), &pond);
        let _ = world.place_entity("Crow", WorldPoint::new(0.0, 0.0), &farm);
        let released = world.place_entity("Hawk", WorldPoint::new(0.0, 0.0), &farm);
        let mut events = Vec::new();
        apply(&mut world, Command::ReleaseEntity { entity: released }, &mut events);

        world.clear_unclaimed_default(&pond);

        let remaining: Vec<EntityId> = world.entities().iter().map(|entity| entity.id).collect();
        assert_eq!(remaining, vec![local, released]);
    }

    #[test]
    fn capture_requires_current_actor_slot() {
        let mut world = world_with_pond();
        let pond = area("Pond");
        let peer = PeerId::new(1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConnectPeer {
                peer,
                area: pond.clone(),
                tile: TileCoord::new(4, 3),
            },
            &mut events,
        );
        let _ = world.place_entity("Carp", WorldPoint::new(256.0, 256.0), &pond);

        assert!(world.try_capture(peer).is_err());
        assert_eq!(world.entity_count(), 1);

        let previous = world.replace_current_actor(peer);
        assert_eq!(previous, PeerId::NONE);
        world.try_capture(peer).expect("capture");
        assert_eq!(world.entity_count(), 0);
        assert_eq!(query::captures(&world).len(), 1);
    }

    #[test]
    fn spawn_routine_uses_whatever_anchors_are_installed() {
        let mut world = world_with_pond();
        let pond = area("Pond");
        let mut locational = LocationalData::new();
        let mut fields = vec![String::new(); 18];
        fields[17] = "3".to_owned();
        let _ = locational.insert("Carp".to_owned(), CreatureRecord::new(fields));
        world.set_spawn_config(SpawnConfig::new(locational, vec!["Carp".to_owned()]));

        world.try_spawn_from_area(&pond).expect("spawn");
        assert_eq!(world.entity_count(), 0);

        let mut anchors = EnvironmentAnchorSet::empty(pond.clone());
        anchors.water = vec![TileCoord::new(4, 4)];
        world.set_anchors(anchors);
        world.try_spawn_from_area(&pond).expect("spawn");

        let entities = world.entities();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].position, TileCoord::new(4, 4).center());
        assert_eq!(query::spawn_log(&world)[1].anchors_from, Some(pond));
    }

    #[test]
    fn faults_surface_as_errors() {
        let mut world = world_with_pond();
        let pond = area("Pond");
        let entity = world.place_entity("Carp", WorldPoint::new(0.0, 0.0), &pond);
        world.set_faults(FaultPlan {
            fail_removals: true,
            fail_terrain: true,
            ..FaultPlan::default()
        });

        assert!(world.remove_entity(entity).is_err());
        assert!(world.water(&pond).is_err());
        assert!(world.is_open_water(&pond, TileCoord::new(4, 4)));
        assert!(world.is_water_tile(&pond, TileCoord::new(3, 4)));
        assert!(!world.is_open_water(&pond, TileCoord::new(3, 4)));
    }
}
