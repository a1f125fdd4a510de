#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-area knowledge the collaborator's single spawn workspace forgets.
//!
//! The collaborator keeps one working spawn configuration and one set of
//! terrain anchors for the whole process. With several peers in different
//! areas, whichever area spawned last leaves its data behind for everyone
//! else. These caches keep a copy per area and write the right one back
//! before the collaborator reads it.

mod anchors;

use std::collections::HashMap;

use wildlife_sync_core::{AreaName, SpawnConfig};

pub use anchors::EnvironmentAnchorCache;

/// Last productive spawn configuration of every area.
#[derive(Debug, Default)]
pub struct SpawnConfigCache {
    profiles: HashMap<AreaName, SpawnConfig>,
}

impl SpawnConfigCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `config` for `area` unless it has no eligible entry.
    ///
    /// Returns `true` when the stored profile was replaced.
    pub fn capture(&mut self, area: &AreaName, config: SpawnConfig) -> bool {
        if config.is_empty() {
            log::debug!("kept previous spawn profile of '{area}': captured config is empty");
            return false;
        }

        log::debug!(
            "captured spawn profile of '{area}' with {} eligible entries",
            config.eligible_entries()
        );
        let _ = self.profiles.insert(area.clone(), config);
        true
    }

    /// Last captured profile of `area`.
    #[must_use]
    pub fn restore(&self, area: &AreaName) -> Option<&SpawnConfig> {
        self.profiles.get(area)
    }

    /// Number of areas with a captured profile.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Reports whether no profile has been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
