use rand::{Rng, RngCore};
use wildlife_sync_core::{
    host::WildlifeHost, EntityId, SessionContext, ThrowVariant, TileCoord, TILE_SIZE,
};
use wildlife_sync_system_spawn_selection::{SelectorConfig, WeightedSpawnSelector};

use crate::{LandingSite, SpawnBridge, SpawnRequest};

/// Chance that a standard throw with no catch spawns something.
pub const STANDARD_SPAWN_CHANCE: f64 = 0.20;

/// Chance that a boosted throw with no catch spawns something.
pub const BOOSTED_SPAWN_CHANCE: f64 = 0.40;

/// Pixel radius around the landing point considered by the gate.
pub const SEARCH_RADIUS: f32 = 300.0;

/// Tunables of the consolation gate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConsolationConfig {
    standard_chance: f64,
    boosted_chance: f64,
    search_radius: f32,
}

impl ConsolationConfig {
    /// Creates a new gate configuration.
    #[must_use]
    pub const fn new(standard_chance: f64, boosted_chance: f64, search_radius: f32) -> Self {
        Self {
            standard_chance,
            boosted_chance,
            search_radius,
        }
    }

    /// Spawn chance for a throw variant.
    #[must_use]
    pub const fn chance(&self, variant: ThrowVariant) -> f64 {
        match variant {
            ThrowVariant::Standard => self.standard_chance,
            ThrowVariant::Boosted => self.boosted_chance,
        }
    }

    /// Radius of the water checks around the landing point.
    #[must_use]
    pub const fn search_radius(&self) -> f32 {
        self.search_radius
    }
}

impl Default for ConsolationConfig {
    fn default() -> Self {
        Self::new(STANDARD_SPAWN_CHANCE, BOOSTED_SPAWN_CHANCE, SEARCH_RADIUS)
    }
}

/// Built-in gate that may spawn a water creature after a missed throw.
#[derive(Debug, Default)]
pub struct ConsolationSpawner {
    config: ConsolationConfig,
    selector: WeightedSpawnSelector,
    open_tiles: Vec<TileCoord>,
}

impl ConsolationSpawner {
    /// Creates a gate with the provided tunables.
    #[must_use]
    pub fn new(config: ConsolationConfig, selector: SelectorConfig) -> Self {
        Self {
            config,
            selector: WeightedSpawnSelector::new(selector),
            open_tiles: Vec::new(),
        }
    }

    /// Configuration the gate runs with.
    #[must_use]
    pub const fn config(&self) -> &ConsolationConfig {
        &self.config
    }

    /// Runs the gate for a landing without a catch.
    ///
    /// Only the host spawns. Nothing appears while a creature near the
    /// landing already swims in water, when the chance roll fails, or when
    /// no open water lies within reach. The installed resolver gets the
    /// first say; the catalogue is used when it declines.
    pub fn attempt(
        &mut self,
        ctx: &SessionContext,
        site: &LandingSite,
        bridge: &mut SpawnBridge,
        host: &mut dyn WildlifeHost,
        rng: &mut dyn RngCore,
    ) -> Option<EntityId> {
        if !ctx.is_host {
            return None;
        }

        let area = &site.area;
        let radius = self.config.search_radius;
        let water_occupied = host.entities().iter().any(|entity| {
            !entity.released
                && entity.area.as_ref().is_some_and(|other| other.matches(area))
                && entity.position.distance(site.point) <= radius
                && host.is_water_tile(area, entity.position.tile())
        });
        if water_occupied {
            log::debug!("no consolation spawn in '{area}': water near the landing is occupied");
            return None;
        }

        let chance = self.config.chance(site.variant);
        let roll: f64 = rng.gen();
        if roll >= chance {
            log::trace!("consolation roll {roll:.3} missed {chance:.2} in '{area}'");
            return None;
        }

        let Some((columns, rows)) = host.map_size(area) else {
            log::warn!("no consolation spawn: map size of '{area}' is unknown");
            return None;
        };
        let span = ((radius / TILE_SIZE).ceil() as i32).max(1);
        let origin = site.point.tile();
        self.open_tiles.clear();
        for y in (origin.y() - span).max(0)..=(origin.y() + span).min(rows - 1) {
            for x in (origin.x() - span).max(0)..=(origin.x() + span).min(columns - 1) {
                let tile = TileCoord::new(x, y);
                if tile.center().distance(site.point) <= radius && host.is_open_water(area, tile) {
                    self.open_tiles.push(tile);
                }
            }
        }
        if self.open_tiles.is_empty() {
            log::debug!("no consolation spawn: no open water near the landing in '{area}'");
            return None;
        }
        let spawn_tile = self.open_tiles[rng.gen_range(0..self.open_tiles.len())];

        let request = SpawnRequest {
            site: site.clone(),
            spawn_tile,
        };
        if let Some(entity) = bridge.resolve(&request, host, rng) {
            return Some(entity);
        }

        let key = {
            let Some(catalog) = host.creature_data() else {
                log::debug!("no consolation spawn: no creature catalogue available");
                return None;
            };
            if !self.selector.has_water_keys(catalog) {
                log::debug!("no consolation spawn: catalogue holds no eligible water creature");
                return None;
            }
            self.selector.choose_water_key(catalog, rng)?
        };

        match host.create_entity(&key, spawn_tile, area) {
            Ok(entity) => {
                log::info!(
                    "consolation spawn of '{key}' as {entity:?} at {spawn_tile:?} in '{area}' for {}",
                    site.peer
                );
                Some(entity)
            }
            Err(error) => {
                log::warn!("consolation spawn of '{key}' in '{area}' failed: {error}");
                None
            }
        }
    }
}
