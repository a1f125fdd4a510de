use wildlife_sync_core::{AreaName, PeerId};

/// Entity count observed right before the collaborator's spawn routine ran.
///
/// Handed back to [`crate::Coordinator::finish_spawn_attempt`], which compares
/// it with the count afterwards to find the entities the attempt created.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a spawn attempt must be finished to record what it created"]
pub struct SpawnAttempt {
    pub(crate) area: AreaName,
    pub(crate) peer: PeerId,
    pub(crate) entities_before: usize,
}

impl SpawnAttempt {
    /// Area the attempt spawns into.
    #[must_use]
    pub fn area(&self) -> &AreaName {
        &self.area
    }

    /// Peer the attempt acts for.
    #[must_use]
    pub const fn peer(&self) -> PeerId {
        self.peer
    }

    /// Registry size before the attempt.
    #[must_use]
    pub const fn entities_before(&self) -> usize {
        self.entities_before
    }
}
