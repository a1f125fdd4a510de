use rand::RngCore;
use wildlife_sync_core::{host::WildlifeHost, EntityId, ProbabilityTable};
use wildlife_sync_system_spawn_selection::{SelectorConfig, WeightedSpawnSelector};

use crate::{SpawnRequest, SpawnResolver};

/// Resolver that draws water creatures from the external probability table.
#[derive(Debug)]
pub struct TableSpawnResolver {
    table: ProbabilityTable,
    selector: WeightedSpawnSelector,
}

impl TableSpawnResolver {
    /// Creates a resolver over `table` with the default table-selection tunables.
    #[must_use]
    pub fn new(table: ProbabilityTable) -> Self {
        Self::with_config(table, SelectorConfig::for_table())
    }

    /// Creates a resolver over `table` with custom selector tunables.
    #[must_use]
    pub fn with_config(table: ProbabilityTable, config: SelectorConfig) -> Self {
        Self {
            table,
            selector: WeightedSpawnSelector::new(config),
        }
    }

    /// Table the resolver reads.
    #[must_use]
    pub fn table(&self) -> &ProbabilityTable {
        &self.table
    }
}

impl SpawnResolver for TableSpawnResolver {
    fn resolve(
        &mut self,
        request: &SpawnRequest,
        host: &mut dyn WildlifeHost,
        rng: &mut dyn RngCore,
    ) -> Option<EntityId> {
        let area = &request.site.area;
        let locational = match host.creatures_for_area(area) {
            Ok(locational) => locational,
            Err(error) => {
                log::warn!("table spawn in '{area}' skipped: {error}");
                return None;
            }
        };

        let candidates = self
            .selector
            .candidates_from_table(&locational, &self.table, true);
        if candidates.is_empty() {
            log::debug!("table gives no water creature of '{area}' a chance");
            return None;
        }

        let key = self.selector.select_one(&candidates, rng)?;
        match host.create_entity(&key, request.spawn_tile, area) {
            Ok(entity) => {
                log::info!(
                    "table spawn of '{key}' as {entity:?} at {:?} in '{area}' for {}",
                    request.spawn_tile,
                    request.site.peer
                );
                Some(entity)
            }
            Err(error) => {
                log::warn!("table spawn of '{key}' in '{area}' failed: {error}");
                None
            }
        }
    }
}
