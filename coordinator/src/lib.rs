#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Sequences the wildlife sync systems around the collaborator.
//!
//! The coordinator owns every per-area map and wraps the collaborator's own
//! spawn, despawn and capture routines. Within a tick it reconciles entities
//! against peer presence, restores the area's spawn profile, lets the
//! collaborator run its spawn pass, and finally advances the session's
//! flight. Only the host mutates shared state; other peers observe.

mod attempt;

use rand::RngCore;
use wildlife_sync_core::{
    host::WildlifeHost, AreaName, BridgeError, EntityId, Event, Facing, HostError,
    ProbabilityTable, SessionContext, SpawnConfig, ThrowVariant, TileCoord,
};
use wildlife_sync_system_capture::{CaptureConfig, CaptureResolver};
use wildlife_sync_system_ownership::{DespawnArbiter, OwnershipTracker, ReconcileOutcome};
use wildlife_sync_system_projectile::{
    FlightConfig, Landing, ProjectileSimulator, ThrowOutcome, ThrowRequest,
};
use wildlife_sync_system_spawn_bridge::{
    ConsolationConfig, ConsolationSpawner, LandingSite, SpawnBridge, SpawnResolver,
};
use wildlife_sync_system_spawn_config::{EnvironmentAnchorCache, SpawnConfigCache};
use wildlife_sync_system_spawn_selection::{
    SelectorConfig, SpawnListBuilder, WeightedSpawnSelector, TABLE_BLACKLIST,
};

pub use attempt::SpawnAttempt;

/// Tunables of every system the coordinator drives.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CoordinatorConfig {
    /// Weighted selector tunables. Spawn list rolls swap in the table blacklist.
    pub selector: SelectorConfig,
    /// Capture radii.
    pub capture: CaptureConfig,
    /// Flight trajectory.
    pub flight: FlightConfig,
    /// Consolation gate.
    pub consolation: ConsolationConfig,
    /// Spawn slot list shape.
    pub spawn_list: SpawnListBuilder,
}

/// What happened when a flight landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LandingOutcome {
    /// An entity near the landing point was captured.
    Captured(EntityId),
    /// Nothing was caught and the consolation gate spawned an entity.
    Spawned(EntityId),
    /// Nothing was caught and nothing spawned.
    Missed,
    /// The session is not the host and only shows the landing.
    Observed,
}

/// Landing together with its outcome.
#[derive(Clone, Debug, PartialEq)]
pub struct LandingReport {
    /// Flight that landed.
    pub landing: Landing,
    /// Resolution of the landing.
    pub outcome: LandingOutcome,
}

/// Everything a coordinator tick changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Outcome of the reconciliation pass, when one ran.
    pub reconcile: Option<ReconcileOutcome>,
    /// Entities the spawn pass created.
    pub spawned: Vec<EntityId>,
    /// Flight that landed during the tick.
    pub landing: Option<LandingReport>,
}

/// Owner of the per-area state and the per-tick ordering.
#[derive(Debug)]
pub struct Coordinator {
    ownership: OwnershipTracker,
    arbiter: DespawnArbiter,
    profiles: SpawnConfigCache,
    anchors: EnvironmentAnchorCache,
    selector: WeightedSpawnSelector,
    spawn_list: SpawnListBuilder,
    table: Option<ProbabilityTable>,
    projectiles: ProjectileSimulator,
    capture: CaptureResolver,
    consolation: ConsolationSpawner,
    bridge: SpawnBridge,
}

impl Coordinator {
    /// Creates a coordinator with the provided tunables and an empty resolver slot.
    #[must_use]
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            ownership: OwnershipTracker::new(),
            arbiter: DespawnArbiter::new(),
            profiles: SpawnConfigCache::new(),
            anchors: EnvironmentAnchorCache::new(),
            selector: WeightedSpawnSelector::new(config.selector.with_blacklist(TABLE_BLACKLIST)),
            spawn_list: config.spawn_list,
            table: None,
            projectiles: ProjectileSimulator::new(config.flight),
            capture: CaptureResolver::new(config.capture),
            consolation: ConsolationSpawner::new(config.consolation, config.selector),
            bridge: SpawnBridge::new(),
        }
    }

    /// Installs the probability table service, if one was found.
    ///
    /// With a table, consolation spawns resolve through it and spawn lists
    /// are rebuilt from it for areas without a captured profile. Without one,
    /// both keep their default behavior.
    pub fn install_probability_table(
        &mut self,
        table: Option<ProbabilityTable>,
    ) -> Result<bool, BridgeError> {
        let installed = self.bridge.install_from_table(table.clone())?;
        if installed {
            self.table = table;
        }
        Ok(installed)
    }

    /// Installs a custom consolation resolver into the single slot.
    pub fn install_resolver(
        &mut self,
        resolver: Box<dyn SpawnResolver>,
    ) -> Result<(), BridgeError> {
        self.bridge.install(resolver)
    }

    /// Entity and area ownership records.
    #[must_use]
    pub fn ownership(&self) -> &OwnershipTracker {
        &self.ownership
    }

    /// Captured spawn profiles.
    #[must_use]
    pub fn profiles(&self) -> &SpawnConfigCache {
        &self.profiles
    }

    /// Live flights.
    #[must_use]
    pub fn projectiles(&self) -> &ProjectileSimulator {
        &self.projectiles
    }

    /// Reacts to collaborator events.
    ///
    /// Area entries claim unclaimed areas, departures release claims of
    /// abandoned areas after a fresh presence scan and reconcile entities,
    /// and removals drop ownership records.
    pub fn handle_events(
        &mut self,
        ctx: &SessionContext,
        events: &[Event],
        host: &mut dyn WildlifeHost,
    ) {
        if !ctx.is_host {
            return;
        }

        for event in events {
            match event {
                Event::PeerConnected { peer, area } => {
                    let _ = self.ownership.claim_area(area, *peer);
                }
                Event::PeerWarped { peer, from, to } => {
                    let _ = self.ownership.claim_area(to, *peer);
                    if let Some(from) = from.as_ref().filter(|from| *from != to) {
                        let presence = host.peers();
                        let _ = self
                            .ownership
                            .release_area_if_abandoned(from, *peer, &presence);
                    }
                    let _ = self.clear_unclaimed(ctx, to, host);
                }
                Event::PeerDisconnected { peer, from } => {
                    let Some(from) = from else {
                        continue;
                    };
                    let presence = host.peers();
                    let _ = self
                        .ownership
                        .release_area_if_abandoned(from, *peer, &presence);
                    let _ = self.clear_unclaimed(ctx, from, host);
                }
                Event::EntityRemoved { entity } => {
                    let _ = self.ownership.forget_entity(*entity);
                }
                Event::EntityCreated { .. } | Event::EntityReleased { .. } => {}
            }
        }
    }

    /// Replaces the collaborator's "clear everything unclaimed" routine.
    ///
    /// Entities survive while their area holds a peer. If the custom pass
    /// aborts, the collaborator's default clearing runs for `area`.
    pub fn clear_unclaimed(
        &mut self,
        ctx: &SessionContext,
        area: &AreaName,
        host: &mut dyn WildlifeHost,
    ) -> Option<ReconcileOutcome> {
        if !ctx.is_host {
            return None;
        }

        let presence = host.peers();
        let outcome = self.arbiter.reconcile(host, &presence, &mut self.ownership);
        if outcome == ReconcileOutcome::FallBackToDefault {
            log::warn!("running default clearing for '{area}' after reconcile aborted");
            host.clear_unclaimed_default(area);
        }
        Some(outcome)
    }

    /// Prepares the collaborator's workspace for a spawn attempt in `area`.
    ///
    /// Recomputes the area's anchors and records the entity count. With a
    /// probability table installed, the spawn list is rebuilt from it only
    /// while the area has no captured profile; a restored profile stands.
    pub fn begin_spawn_attempt(
        &mut self,
        ctx: &SessionContext,
        area: &AreaName,
        host: &mut dyn WildlifeHost,
        rng: &mut dyn RngCore,
    ) -> SpawnAttempt {
        if let Err(error) = self.anchors.refresh(area, host) {
            log::debug!("spawn attempt in '{area}' keeps stale anchors: {error}");
        }

        let table = self
            .table
            .as_ref()
            .filter(|_| self.profiles.restore(area).is_none());
        if let Some(table) = table {
            let config = host.spawn_config();
            if let Some(list) = self.spawn_list.build(
                &mut self.selector,
                &config.locational_data,
                table,
                host,
                rng,
            ) {
                host.set_spawn_config(SpawnConfig::new(config.locational_data, list));
            }
        }

        SpawnAttempt {
            area: area.clone(),
            peer: ctx.peer,
            entities_before: host.entity_count(),
        }
    }

    /// Records what a spawn attempt created.
    ///
    /// When the registry grew, the working spawn configuration is captured as
    /// the area's profile and every new entity is recorded as owned by the
    /// attempt's peer.
    pub fn finish_spawn_attempt(
        &mut self,
        attempt: SpawnAttempt,
        host: &mut dyn WildlifeHost,
    ) -> Vec<EntityId> {
        let entities = host.entities();
        if entities.len() <= attempt.entities_before {
            return Vec::new();
        }

        let _ = self.profiles.capture(&attempt.area, host.spawn_config());
        let mut created = Vec::new();
        for entity in entities.into_iter().skip(attempt.entities_before) {
            let area = entity.area.unwrap_or_else(|| attempt.area.clone());
            self.ownership.record_spawn(entity.id, attempt.peer, &area);
            log::info!(
                "{} spawned {:?} ('{}') in '{area}'",
                attempt.peer,
                entity.id,
                entity.key
            );
            created.push(entity.id);
        }
        created
    }

    /// Runs the collaborator's spawn routine for `area` inside a spawn attempt.
    ///
    /// Failures are logged and yield no entities.
    pub fn spawn_from_area(
        &mut self,
        ctx: &SessionContext,
        area: &AreaName,
        host: &mut dyn WildlifeHost,
        rng: &mut dyn RngCore,
    ) -> Vec<EntityId> {
        if !ctx.is_host {
            return Vec::new();
        }

        let attempt = self.begin_spawn_attempt(ctx, area, host, rng);
        if let Err(error) = host.try_spawn_from_area(area) {
            log::warn!("spawn attempt by {} in '{area}' failed: {error}", ctx.peer);
        }
        self.finish_spawn_attempt(attempt, host)
    }

    /// Periodic evaluation for the session peer's current area.
    ///
    /// Reconciles entities, restores the area's last productive profile, then
    /// lets the collaborator evaluate and spawn. Guests only observe.
    pub fn spawn_evaluation_tick(
        &mut self,
        ctx: &SessionContext,
        host: &mut dyn WildlifeHost,
        rng: &mut dyn RngCore,
    ) -> TickReport {
        let mut report = TickReport::default();
        if !ctx.is_host {
            return report;
        }
        let Some(area) = host.area_of(ctx.peer) else {
            return report;
        };

        report.reconcile = self.clear_unclaimed(ctx, &area, host);

        if let Some(profile) = self.profiles.restore(&area) {
            log::trace!("restored spawn profile of '{area}'");
            host.set_spawn_config(profile.clone());
        }

        if let Err(error) = host.run_spawn_pass(&area) {
            log::warn!("spawn pass in '{area}' failed: {error}");
            return report;
        }
        report.spawned = self.spawn_from_area(ctx, &area, host, rng);
        report
    }

    /// Throws a consumable from the session's actor at `target`.
    ///
    /// Targets off the map or on dry land are rejected as `NotWater` before
    /// any flight starts. An accepted throw turns the actor toward the
    /// target; the launch follows on the next tick.
    pub fn throw(
        &mut self,
        ctx: &SessionContext,
        target: TileCoord,
        variant: ThrowVariant,
        host: &mut dyn WildlifeHost,
    ) -> Result<ThrowOutcome, HostError> {
        let peer = ctx.peer;
        let area = host.area_of(peer).ok_or(HostError::MissingActor(peer))?;
        let pose = host.actor_pose(peer).ok_or(HostError::MissingActor(peer))?;

        if !is_on_map(host.map_size(&area), target) || !host.is_water_tile(&area, target) {
            log::debug!("{peer} aimed at {target:?} in '{area}', which is not water");
            return Ok(ThrowOutcome::NotWater);
        }

        let outcome = self.projectiles.throw(
            ctx,
            ThrowRequest {
                area,
                actor: pose,
                target,
                variant,
            },
        );
        if matches!(outcome, ThrowOutcome::Accepted { .. }) {
            let mut turned = pose;
            turned.facing = Facing::toward_tile(pose.standing_point(), target);
            host.set_actor_pose(peer, turned);
        }
        Ok(outcome)
    }

    /// Advances the session's flight and resolves its landing.
    pub fn advance_flight(
        &mut self,
        ctx: &SessionContext,
        host: &mut dyn WildlifeHost,
        rng: &mut dyn RngCore,
    ) -> Option<LandingReport> {
        let landing = self.projectiles.tick(ctx.session)?;
        let outcome = self.resolve_landing(ctx, &landing, host, rng);
        Some(LandingReport { landing, outcome })
    }

    fn resolve_landing(
        &mut self,
        ctx: &SessionContext,
        landing: &Landing,
        host: &mut dyn WildlifeHost,
        rng: &mut dyn RngCore,
    ) -> LandingOutcome {
        if !ctx.is_host {
            return LandingOutcome::Observed;
        }

        match self
            .capture
            .resolve(ctx, &landing.area, landing.point, landing.variant, host)
        {
            Ok(Some(entity)) => {
                let _ = self.ownership.forget_entity(entity);
                return LandingOutcome::Captured(entity);
            }
            Ok(None) => {}
            Err(error) => {
                log::warn!(
                    "capture by {} in '{}' failed, rolling consolation: {error}",
                    ctx.peer,
                    landing.area
                );
            }
        }

        let site = LandingSite {
            peer: ctx.peer,
            area: landing.area.clone(),
            point: landing.point,
            actor: landing.actor,
            variant: landing.variant,
        };
        match self
            .consolation
            .attempt(ctx, &site, &mut self.bridge, host, rng)
        {
            Some(entity) => {
                self.ownership.record_spawn(entity, ctx.peer, &landing.area);
                LandingOutcome::Spawned(entity)
            }
            None => LandingOutcome::Missed,
        }
    }

    /// Full coordinator tick: spawn evaluation followed by flight advancement.
    pub fn tick(
        &mut self,
        ctx: &SessionContext,
        host: &mut dyn WildlifeHost,
        rng: &mut dyn RngCore,
    ) -> TickReport {
        let mut report = self.spawn_evaluation_tick(ctx, host, rng);
        report.landing = self.advance_flight(ctx, host, rng);
        report
    }
}

fn is_on_map(size: Option<(i32, i32)>, tile: TileCoord) -> bool {
    size.is_some_and(|(columns, rows)| {
        (0..columns).contains(&tile.x()) && (0..rows).contains(&tile.y())
    })
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(CoordinatorConfig::default())
    }
}
