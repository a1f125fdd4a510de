use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wildlife_sync_core::{
    host::{EntityRegistry, SpawnWorkspace},
    AreaName, Command, CreatureDataTable, CreatureRecord, LocationalData, PeerId,
    SessionContext, SessionId, SpawnConfig, ThrowVariant, TileCoord,
};
use wildlife_sync_coordinator::{Coordinator, LandingOutcome, TickReport};
use wildlife_sync_world::{self as world, query, AreaLayout, World};

const HOST: PeerId = PeerId::new(1);
const GUEST: PeerId = PeerId::new(2);

#[test]
fn deterministic_replay_produces_identical_outcomes() {
    let first = replay(0xfeed);
    let second = replay(0xfeed);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(!first.entities.is_empty(), "scripted replay spawned nothing");
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct EntityState {
    id: u32,
    key: String,
    x_bits: u32,
    y_bits: u32,
    area: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TickRecord {
    reconciled: bool,
    spawned: Vec<u32>,
    landing: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    entities: Vec<EntityState>,
    claims: Vec<(String, u64)>,
    ticks: Vec<TickRecord>,
    captures: usize,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

enum Step {
    Apply(Command),
    Throw(TileCoord),
    Ticks(u32),
}

fn area(name: &str) -> AreaName {
    AreaName::new(name).expect("area name")
}

fn record(rarity: u8, habitat: &str) -> CreatureRecord {
    let mut fields = vec![String::new(); 18];
    fields[0] = rarity.to_string();
    fields[17] = habitat.to_owned();
    CreatureRecord::new(fields)
}

fn scripted_world() -> World {
    let mut world = World::with_seed(7);
    let pond_water = (4..9).flat_map(|x| (4..8).map(move |y| TileCoord::new(x, y)));
    world.add_area(
        AreaLayout::new(area("Pond"), 14, 12)
            .with_open_water(pond_water)
            .with_trees([TileCoord::new(1, 1), TileCoord::new(12, 2)]),
    );
    world.add_area(
        AreaLayout::new(area("Meadow"), 10, 10)
            .with_bushes([TileCoord::new(2, 2), TileCoord::new(7, 3)])
            .with_stumps([TileCoord::new(5, 8)]),
    );
    world.set_catalog(
        [
            ("Carp".to_owned(), record(0, "3")),
            ("Koi".to_owned(), record(2, "3")),
            ("Crow".to_owned(), record(1, "1")),
        ]
        .into_iter()
        .collect::<CreatureDataTable>(),
    );

    let mut pond = LocationalData::new();
    let _ = pond.insert("Carp".to_owned(), record(0, "3"));
    let _ = pond.insert("Koi".to_owned(), record(2, "3"));
    world.set_spawn_config(SpawnConfig::new(
        pond,
        vec!["Carp".to_owned(), "Koi".to_owned(), String::new()],
    ));
    world
}

fn scripted_steps() -> Vec<Step> {
    vec![
        Step::Apply(Command::ConnectPeer {
            peer: HOST,
            area: area("Pond"),
            tile: TileCoord::new(2, 5),
        }),
        Step::Apply(Command::ConnectPeer {
            peer: GUEST,
            area: area("Pond"),
            tile: TileCoord::new(10, 5),
        }),
        Step::Ticks(6),
        Step::Throw(TileCoord::new(5, 5)),
        Step::Ticks(60),
        Step::Apply(Command::WarpPeer {
            peer: HOST,
            to: area("Meadow"),
            tile: TileCoord::new(1, 1),
        }),
        Step::Ticks(4),
        Step::Apply(Command::WarpPeer {
            peer: HOST,
            to: area("Pond"),
            tile: TileCoord::new(2, 5),
        }),
        Step::Throw(TileCoord::new(7, 6)),
        Step::Ticks(60),
        Step::Apply(Command::DisconnectPeer { peer: GUEST }),
        Step::Ticks(3),
    ]
}

fn replay(seed: u64) -> ReplayOutcome {
    let ctx = SessionContext::host(SessionId::new(0), HOST);
    let mut world = scripted_world();
    let mut coordinator = Coordinator::default();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut ticks = Vec::new();

    for step in scripted_steps() {
        match step {
            Step::Apply(command) => {
                let mut events = Vec::new();
                world::apply(&mut world, command, &mut events);
                coordinator.handle_events(&ctx, &events, &mut world);
            }
            Step::Throw(target) => {
                let _ = coordinator
                    .throw(&ctx, target, ThrowVariant::Boosted, &mut world)
                    .expect("host actor is connected");
            }
            Step::Ticks(count) => {
                for _ in 0..count {
                    let report = coordinator.tick(&ctx, &mut world, &mut rng);
                    ticks.push(TickRecord::from(report));
                    let mut events = Vec::new();
                    world.drain_events(&mut events);
                    coordinator.handle_events(&ctx, &events, &mut world);
                }
            }
        }
    }

    let entities = world
        .entities()
        .into_iter()
        .map(|entity| EntityState {
            id: entity.id.get(),
            key: entity.key,
            x_bits: entity.position.x().to_bits(),
            y_bits: entity.position.y().to_bits(),
            area: entity.area.map(|area| area.to_string()),
        })
        .collect();
    let claims = coordinator
        .ownership()
        .claims()
        .map(|(area, peer)| (area.to_string(), peer.get()))
        .collect();

    ReplayOutcome {
        entities,
        claims,
        ticks,
        captures: query::captures(&world).len(),
    }
}

impl From<TickReport> for TickRecord {
    fn from(report: TickReport) -> Self {
        Self {
            reconciled: report.reconcile.is_some(),
            spawned: report.spawned.iter().map(|entity| entity.get()).collect(),
            landing: report.landing.map(|landing| match landing.outcome {
                LandingOutcome::Captured(entity) => format!("captured {}", entity.get()),
                LandingOutcome::Spawned(entity) => format!("spawned {}", entity.get()),
                LandingOutcome::Missed => "missed".to_owned(),
                LandingOutcome::Observed => "observed".to_owned(),
            }),
        }
    }
}
