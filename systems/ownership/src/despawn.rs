use std::collections::HashSet;

use wildlife_sync_core::{host::EntityRegistry, PeerSnapshot};

use crate::OwnershipTracker;

/// Result of a reconciliation pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The custom pass ran to completion.
    Completed {
        /// Number of entities removed from empty areas.
        removed: usize,
    },
    /// The custom pass aborted; the caller must run the collaborator's default clearing.
    FallBackToDefault,
}

/// Removes unclaimed entities from areas nobody occupies.
///
/// Replaces a "clear everything on warp" policy: entities survive as long as
/// at least one peer stands in their area, regardless of who spawned them.
#[derive(Debug, Default)]
pub struct DespawnArbiter {
    populated: HashSet<String>,
}

impl DespawnArbiter {
    /// Creates an arbiter with empty scratch space.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every non-released entity whose area holds no peer.
    ///
    /// The registry is walked from the back so removals never shift indices
    /// still to be visited. Removed entities are forgotten by `ownership`.
    pub fn reconcile<R>(
        &mut self,
        registry: &mut R,
        presence: &[PeerSnapshot],
        ownership: &mut OwnershipTracker,
    ) -> ReconcileOutcome
    where
        R: EntityRegistry + ?Sized,
    {
        self.populated.clear();
        for snapshot in presence {
            if let Some(area) = &snapshot.area {
                let _ = self.populated.insert(area.as_str().to_ascii_lowercase());
            }
        }

        let entities = registry.entities();
        let mut removed = 0;
        for entity in entities.iter().rev() {
            if entity.released {
                continue;
            }

            let occupied = entity
                .area
                .as_ref()
                .is_some_and(|area| self.populated.contains(&area.as_str().to_ascii_lowercase()));
            if occupied {
                continue;
            }

            if let Err(error) = registry.remove_entity(entity.id) {
                log::error!(
                    "reconcile aborted removing {:?} ('{}') in {:?}: {error}",
                    entity.id,
                    entity.key,
                    entity.area.as_ref().map(|area| area.as_str()),
                );
                return ReconcileOutcome::FallBackToDefault;
            }

            let _ = ownership.forget_entity(entity.id);
            removed += 1;
            log::trace!(
                "removed {:?} ('{}') from unoccupied area {:?}",
                entity.id,
                entity.key,
                entity.area.as_ref().map(|area| area.as_str()),
            );
        }

        if removed > 0 {
            log::debug!("reconcile removed {removed} entities from unoccupied areas");
        }
        ReconcileOutcome::Completed { removed }
    }
}
