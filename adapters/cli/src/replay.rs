use std::fmt;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wildlife_sync_coordinator::{Coordinator, CoordinatorConfig, LandingOutcome};
use wildlife_sync_core::{
    host::EntityRegistry, Command, EntityId, Event, PeerId, ProbabilityTable, SessionContext,
    SessionId,
};
use wildlife_sync_system_projectile::ThrowOutcome;
use wildlife_sync_world::{self as world, query, World};

use crate::scenario::{area_name, tile, Scenario, Step};

/// Totals gathered while replaying a scenario.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) ticks: u32,
    pub(crate) spawned: usize,
    pub(crate) captured: usize,
    pub(crate) consolation: usize,
    pub(crate) missed: usize,
    pub(crate) rejected_throws: usize,
    pub(crate) off_target_throws: usize,
    pub(crate) entities: Vec<String>,
    pub(crate) claims: Vec<String>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks: {}", self.ticks)?;
        writeln!(f, "spawned: {}", self.spawned)?;
        writeln!(
            f,
            "landings: {} captured, {} consolation, {} missed",
            self.captured, self.consolation, self.missed
        )?;
        writeln!(f, "throws rejected in flight: {}", self.rejected_throws)?;
        writeln!(f, "throws not aimed at water: {}", self.off_target_throws)?;
        writeln!(f, "claims:")?;
        for claim in &self.claims {
            writeln!(f, "  {claim}")?;
        }
        write!(f, "entities: {}", self.entities.len())?;
        for entity in &self.entities {
            write!(f, "\n  {entity}")?;
        }
        Ok(())
    }
}

/// Replays `scenario` with the host session driving the coordinator.
pub(crate) fn run(
    scenario: &Scenario,
    table: Option<ProbabilityTable>,
    seed: u64,
) -> Result<Summary> {
    let mut world = scenario.build_world(seed)?;
    let mut coordinator = Coordinator::new(CoordinatorConfig::default());
    let installed = coordinator
        .install_probability_table(table)
        .context("failed to install the probability table")?;
    log::info!(
        "replaying {} steps with seed {seed}{}",
        scenario.steps.len(),
        if installed { " and a probability table" } else { "" }
    );

    let ctx = SessionContext::host(SessionId::new(0), PeerId::new(scenario.host))
        .with_input_mode(scenario.input_mode);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut summary = Summary::default();

    for step in &scenario.steps {
        match step {
            Step::Connect { peer, area, tile: at } => {
                let command = Command::ConnectPeer {
                    peer: PeerId::new(*peer),
                    area: area_name(area)?,
                    tile: tile(*at),
                };
                apply(&mut world, &mut coordinator, &ctx, command);
            }
            Step::Warp { peer, area, tile: at } => {
                let command = Command::WarpPeer {
                    peer: PeerId::new(*peer),
                    to: area_name(area)?,
                    tile: tile(*at),
                };
                apply(&mut world, &mut coordinator, &ctx, command);
            }
            Step::Disconnect { peer } => {
                let command = Command::DisconnectPeer {
                    peer: PeerId::new(*peer),
                };
                apply(&mut world, &mut coordinator, &ctx, command);
            }
            Step::Release { entity } => {
                let command = Command::ReleaseEntity {
                    entity: EntityId::new(*entity),
                };
                apply(&mut world, &mut coordinator, &ctx, command);
            }
            Step::Throw { tile: at, variant } => {
                let outcome = coordinator
                    .throw(&ctx, tile(*at), *variant, &mut world)
                    .with_context(|| format!("throw at {at:?} failed"))?;
                match outcome {
                    ThrowOutcome::AlreadyInFlight => summary.rejected_throws += 1,
                    ThrowOutcome::NotWater => summary.off_target_throws += 1,
                    ThrowOutcome::Accepted { .. } => {}
                }
            }
            Step::Tick { count } => {
                for _ in 0..*count {
                    let report = coordinator.tick(&ctx, &mut world, &mut rng);
                    summary.ticks += 1;
                    summary.spawned += report.spawned.len();
                    if let Some(landing) = report.landing {
                        match landing.outcome {
                            LandingOutcome::Captured(_) => summary.captured += 1,
                            LandingOutcome::Spawned(_) => summary.consolation += 1,
                            LandingOutcome::Missed | LandingOutcome::Observed => {
                                summary.missed += 1
                            }
                        }
                    }
                    let mut events = Vec::new();
                    world.drain_events(&mut events);
                    coordinator.handle_events(&ctx, &events, &mut world);
                }
            }
        }
    }

    summary.entities = world
        .entities()
        .into_iter()
        .map(|entity| {
            let area = entity
                .area
                .map_or_else(|| "-".to_owned(), |area| area.to_string());
            let owner = coordinator
                .ownership()
                .owner_of(entity.id)
                .map_or_else(|| "unowned".to_owned(), |peer| peer.to_string());
            format!("{:?} '{}' in '{area}' ({owner})", entity.id, entity.key)
        })
        .collect();
    summary.claims = coordinator
        .ownership()
        .claims()
        .map(|(area, peer)| format!("'{area}' claimed by {peer}"))
        .collect();
    log::debug!("{} captures recorded by the world", query::captures(&world).len());
    Ok(summary)
}

fn apply(world: &mut World, coordinator: &mut Coordinator, ctx: &SessionContext, command: Command) {
    let mut events: Vec<Event> = Vec::new();
    world::apply(world, command, &mut events);
    coordinator.handle_events(ctx, &events, world);
}
