//! Rebuilds the collaborator's spawn slot list from weighted table rolls.

use rand::Rng;
use wildlife_sync_core::{host::SpawnWorkspace, LocationalData, ProbabilityTable, SpawnCandidate};

use crate::{table_probability, WeightedSpawnSelector};

/// Number of slots in a rebuilt spawn list.
pub const SPAWN_SLOTS: usize = 30;

/// Every slot at a multiple of this interval tries the table before the native roll.
pub const TABLE_FIRST_INTERVAL: usize = 3;

/// Interleaves table-driven rolls with the collaborator's native rarity roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnListBuilder {
    slots: usize,
    table_first_interval: usize,
}

impl SpawnListBuilder {
    /// Creates a builder rolling `slots` entries.
    #[must_use]
    pub const fn new(slots: usize, table_first_interval: usize) -> Self {
        Self {
            slots,
            table_first_interval,
        }
    }

    /// Number of slots rolled per build.
    #[must_use]
    pub const fn slots(&self) -> usize {
        self.slots
    }

    /// Builds a slot list for `locational`, or `None` when the table gives no
    /// entry a chance and the collaborator's own list should stand.
    ///
    /// Entries with a positive table chance roll through `selector`; the rest
    /// roll through the collaborator's native rarity roll. Slots whose rolls
    /// both come up empty are left out of the list.
    pub fn build<W, R>(
        &self,
        selector: &mut WeightedSpawnSelector,
        locational: &LocationalData,
        table: &ProbabilityTable,
        workspace: &mut W,
        rng: &mut R,
    ) -> Option<Vec<String>>
    where
        W: SpawnWorkspace + ?Sized,
        R: Rng + ?Sized,
    {
        let dampening = selector.config().shiny_dampening();
        let mut from_table = Vec::new();
        let mut native = LocationalData::new();
        for (key, record) in locational {
            match table_probability(table, key, dampening) {
                Some(probability) => from_table.push(SpawnCandidate {
                    key: key.clone(),
                    rarity: record.rarity(),
                    probability,
                }),
                None => {
                    let _ = native.insert(key.clone(), record.clone());
                }
            }
        }

        if from_table.is_empty() {
            log::debug!(
                "spawn list left as is: none of {} entries has a table chance",
                locational.len()
            );
            return None;
        }

        let interval = self.table_first_interval.max(1);
        let mut list = Vec::with_capacity(self.slots);
        for slot in 0..self.slots {
            let pick = if native.is_empty() {
                selector.select_one(&from_table, rng)
            } else if slot % interval == 0 {
                selector
                    .select_one(&from_table, rng)
                    .or_else(|| workspace.roll_native_rarity(&native))
            } else {
                workspace
                    .roll_native_rarity(&native)
                    .or_else(|| selector.select_one(&from_table, rng))
            };
            if let Some(key) = pick {
                list.push(key);
            }
        }

        log::debug!(
            "rebuilt {} of {} spawn slots from {} table and {} native entries",
            list.len(),
            self.slots,
            from_table.len(),
            native.len()
        );
        Some(list)
    }
}

impl Default for SpawnListBuilder {
    fn default() -> Self {
        Self::new(SPAWN_SLOTS, TABLE_FIRST_INTERVAL)
    }
}
