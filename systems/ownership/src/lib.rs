#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Entity and area ownership bookkeeping.
//!
//! Ownership is decided from locally observable signals only: the peer whose
//! spawn action created an entity owns it, and the first peer to spawn into
//! or warp into an unclaimed area claims that area. Claims are released only
//! after re-scanning peer presence, never on assumption.

mod despawn;

use std::collections::HashMap;

use wildlife_sync_core::{AreaName, EntityId, PeerId, PeerSnapshot};

pub use despawn::{DespawnArbiter, ReconcileOutcome};

/// Maps entities and areas to the peer that claims them.
#[derive(Debug, Default)]
pub struct OwnershipTracker {
    entity_owners: HashMap<EntityId, PeerId>,
    area_claims: HashMap<AreaName, PeerId>,
}

impl OwnershipTracker {
    /// Creates a tracker with no records.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers that `peer` spawned `entity` into `area` and claims the area.
    ///
    /// Recording the same entity again replaces the previous owner, so an
    /// entity never has more than one owner.
    pub fn record_spawn(&mut self, entity: EntityId, peer: PeerId, area: &AreaName) {
        if peer.is_none() {
            log::debug!("ignoring spawn of {entity:?} in '{area}' without a spawning peer");
            return;
        }

        let _ = self.entity_owners.insert(entity, peer);
        let _ = self.claim_area(area, peer);
        log::trace!("{entity:?} in '{area}' owned by {peer}");
    }

    /// Drops the ownership record of an entity that left the registry.
    pub fn forget_entity(&mut self, entity: EntityId) -> Option<PeerId> {
        self.entity_owners.remove(&entity)
    }

    /// Peer that spawned the entity, if known.
    #[must_use]
    pub fn owner_of(&self, entity: EntityId) -> Option<PeerId> {
        self.entity_owners.get(&entity).copied()
    }

    /// Number of entities with a recorded owner.
    #[must_use]
    pub fn owned_entity_count(&self) -> usize {
        self.entity_owners.len()
    }

    /// Claims `area` for `peer` unless it is already claimed.
    ///
    /// Returns `true` when a new claim was created. A null peer never claims.
    pub fn claim_area(&mut self, area: &AreaName, peer: PeerId) -> bool {
        if peer.is_none() || self.area_claims.contains_key(area) {
            return false;
        }

        let _ = self.area_claims.insert(area.clone(), peer);
        log::debug!("area '{area}' claimed by {peer}");
        true
    }

    /// Peer currently holding the claim on `area`.
    #[must_use]
    pub fn claimant(&self, area: &AreaName) -> Option<PeerId> {
        self.area_claims.get(area).copied()
    }

    /// Iterator over every active area claim.
    pub fn claims(&self) -> impl Iterator<Item = (&AreaName, PeerId)> {
        self.area_claims.iter().map(|(area, peer)| (area, *peer))
    }

    /// Releases the claim on `area` if `departing` holds it and nobody else remains.
    ///
    /// `presence` must be a fresh scan of every connected peer. Returns `true`
    /// when the claim was removed.
    pub fn release_area_if_abandoned(
        &mut self,
        area: &AreaName,
        departing: PeerId,
        presence: &[PeerSnapshot],
    ) -> bool {
        if self.claimant(area) != Some(departing) {
            return false;
        }

        let someone_else_there = presence.iter().any(|snapshot| {
            snapshot.id != departing && snapshot.area.as_ref() == Some(area)
        });
        if someone_else_there {
            log::debug!("area '{area}' stays claimed by {departing}: other peers remain");
            return false;
        }

        let _ = self.area_claims.remove(area);
        log::debug!("area '{area}' released: {departing} left and the area is empty");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(name: &str) -> AreaName {
        AreaName::new(name).expect("area name")
    }

    fn peer_in(id: u64, name: Option<&str>) -> PeerSnapshot {
        PeerSnapshot {
            id: PeerId::new(id),
            area: name.map(area),
        }
    }

    #[test]
    fn first_claim_wins() {
        let mut tracker = OwnershipTracker::new();
        let pond = area("Pond");
        assert!(tracker.claim_area(&pond, PeerId::new(1)));
        assert!(!tracker.claim_area(&pond, PeerId::new(2)));
        assert_eq!(tracker.claimant(&pond), Some(PeerId::new(1)));
    }

    #[test]
    fn null_peer_never_claims() {
        let mut tracker = OwnershipTracker::new();
        let pond = area("Pond");
        assert!(!tracker.claim_area(&pond, PeerId::NONE));
        assert_eq!(tracker.claimant(&pond), None);

        tracker.record_spawn(EntityId::new(3), PeerId::NONE, &pond);
        assert_eq!(tracker.owner_of(EntityId::new(3)), None);
        assert_eq!(tracker.claimant(&pond), None);
    }

    #[test]
    fn claim_persists_while_another_peer_remains() {
        let mut tracker = OwnershipTracker::new();
        let pond = area("Pond");
        let _ = tracker.claim_area(&pond, PeerId::new(1));

        let presence = vec![peer_in(1, Some("Farm")), peer_in(2, Some("Pond"))];
        assert!(!tracker.release_area_if_abandoned(&pond, PeerId::new(1), &presence));
        assert_eq!(tracker.claimant(&pond), Some(PeerId::new(1)));
    }

    #[test]
    fn claim_clears_when_area_empties() {
        let mut tracker = OwnershipTracker::new();
        let pond = area("Pond");
        let _ = tracker.claim_area(&pond, PeerId::new(1));

        let presence = vec![peer_in(1, Some("Farm")), peer_in(2, Some("Town"))];
        assert!(tracker.release_area_if_abandoned(&pond, PeerId::new(1), &presence));
        assert_eq!(tracker.claimant(&pond), None);
    }

    #[test]
    fn non_claimant_departure_is_ignored() {
        let mut tracker = OwnershipTracker::new();
        let pond = area("Pond");
        let _ = tracker.claim_area(&pond, PeerId::new(1));

        let presence = vec![peer_in(1, Some("Pond"))];
        assert!(!tracker.release_area_if_abandoned(&pond, PeerId::new(2), &presence));
        assert_eq!(tracker.claimant(&pond), Some(PeerId::new(1)));
    }

    #[test]
    fn respawn_replaces_owner() {
        let mut tracker = OwnershipTracker::new();
        let pond = area("Pond");
        let entity = EntityId::new(9);
        tracker.record_spawn(entity, PeerId::new(1), &pond);
        tracker.record_spawn(entity, PeerId::new(2), &pond);
        assert_eq!(tracker.owner_of(entity), Some(PeerId::new(2)));
        assert_eq!(tracker.claimant(&pond), Some(PeerId::new(1)));
        assert_eq!(tracker.owned_entity_count(), 1);
        assert_eq!(tracker.forget_entity(entity), Some(PeerId::new(2)));
        assert_eq!(tracker.owned_entity_count(), 0);
    }
}
