#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawn fallback when a throw lands without catching anything.
//!
//! A single [`SpawnResolver`] slot lets an optional probability table decide
//! what appears at the landing site. The [`ConsolationSpawner`] gate decides
//! whether anything appears at all and falls back to the creature catalogue
//! when the slot is empty or declines.

mod consolation;
mod table;

use std::fmt;

use rand::RngCore;
use wildlife_sync_core::{
    host::WildlifeHost, ActorPose, AreaName, BridgeError, EntityId, PeerId, ProbabilityTable,
    ThrowVariant, TileCoord, WorldPoint,
};

pub use consolation::{
    ConsolationConfig, ConsolationSpawner, BOOSTED_SPAWN_CHANCE, SEARCH_RADIUS,
    STANDARD_SPAWN_CHANCE,
};
pub use table::TableSpawnResolver;

/// Where and how a throw landed.
#[derive(Clone, Debug, PartialEq)]
pub struct LandingSite {
    /// Peer whose throw landed.
    pub peer: PeerId,
    /// Area of the landing.
    pub area: AreaName,
    /// Landing point in pixels.
    pub point: WorldPoint,
    /// Pose of the throwing actor.
    pub actor: ActorPose,
    /// Kind of consumable thrown.
    pub variant: ThrowVariant,
}

/// Request handed to the installed resolver.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnRequest {
    /// Landing that triggered the request.
    pub site: LandingSite,
    /// Open-water tile chosen for the spawn.
    pub spawn_tile: TileCoord,
}

/// Pluggable decision of what to spawn at a landing site.
pub trait SpawnResolver {
    /// Spawns something for `request`, returning the created entity.
    ///
    /// `None` declines and lets the built-in selection run instead.
    fn resolve(
        &mut self,
        request: &SpawnRequest,
        host: &mut dyn WildlifeHost,
        rng: &mut dyn RngCore,
    ) -> Option<EntityId>;
}

/// Write-once slot holding the installed resolver.
#[derive(Default)]
pub struct SpawnBridge {
    resolver: Option<Box<dyn SpawnResolver>>,
}

impl SpawnBridge {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `resolver`. The slot can be filled only once.
    pub fn install(&mut self, resolver: Box<dyn SpawnResolver>) -> Result<(), BridgeError> {
        if self.resolver.is_some() {
            return Err(BridgeError::AlreadyInstalled);
        }
        self.resolver = Some(resolver);
        Ok(())
    }

    /// Wires the table-driven resolver when a probability table is available.
    ///
    /// Returns whether a resolver was installed. A missing table leaves the
    /// slot empty so the built-in selection keeps working.
    pub fn install_from_table(
        &mut self,
        table: Option<ProbabilityTable>,
    ) -> Result<bool, BridgeError> {
        let Some(table) = table else {
            log::info!("no probability table available; consolation spawns use the catalogue");
            return Ok(false);
        };

        let entries = table.len();
        self.install(Box::new(TableSpawnResolver::new(table)))?;
        log::info!("table spawn resolver installed with {entries} entries");
        Ok(true)
    }

    /// Whether a resolver is installed.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.resolver.is_some()
    }

    /// Hands `request` to the installed resolver, if any.
    pub fn resolve(
        &mut self,
        request: &SpawnRequest,
        host: &mut dyn WildlifeHost,
        rng: &mut dyn RngCore,
    ) -> Option<EntityId> {
        self.resolver.as_mut()?.resolve(request, host, rng)
    }
}

impl fmt::Debug for SpawnBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnBridge")
            .field("installed", &self.is_installed())
            .finish()
    }
}
