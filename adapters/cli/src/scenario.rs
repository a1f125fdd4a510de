use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use wildlife_sync_core::{
    data::{HABITAT_FIELD_INDEX, RARITY_FIELD_INDEX},
    host::SpawnWorkspace,
    AreaName, CreatureDataTable, CreatureRecord, InputMode, LocationalData, SpawnConfig,
    ThrowVariant, TileCoord,
};
use wildlife_sync_world::{AreaLayout, World};

/// Scenario replayed when none is given on the command line.
pub(crate) const BUILTIN_SCENARIO: &str = r#"
host = 1

[[areas]]
name = "Pond"
columns = 14
rows = 12
open_water = [[5, 4], [6, 4], [7, 4], [5, 5], [6, 5], [7, 5], [6, 6]]
shallow_water = [[4, 5], [8, 5]]
trees = [[1, 1], [12, 2]]
natives = ["Carp", "Koi"]

[[areas]]
name = "Meadow"
columns = 10
rows = 10
bushes = [[2, 2], [7, 3]]
stumps = [[5, 8]]
natives = ["Crow"]

[[creatures]]
key = "Carp"
rarity = 0
habitat = "3"

[[creatures]]
key = "Koi"
rarity = 2
habitat = "3"

[[creatures]]
key = "Koi_Shiny"
rarity = 4
habitat = "3"

[[creatures]]
key = "Crow"
rarity = 1
habitat = "1"

[spawn]
area = "Pond"
slots = ["Carp", "Koi", ""]

[[steps]]
action = "connect"
peer = 1
area = "Pond"
tile = [2, 5]

[[steps]]
action = "connect"
peer = 2
area = "Pond"
tile = [11, 5]

[[steps]]
action = "tick"
count = 8

[[steps]]
action = "throw"
tile = [6, 5]
variant = "Boosted"

[[steps]]
action = "tick"
count = 60

[[steps]]
action = "warp"
peer = 1
area = "Meadow"
tile = [1, 1]

[[steps]]
action = "tick"
count = 4

[[steps]]
action = "disconnect"
peer = 2

[[steps]]
action = "tick"
count = 2
"#;

/// Scripted session replayed against the in-memory world.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    /// Peer driving the host session.
    pub(crate) host: u64,
    #[serde(default)]
    pub(crate) input_mode: InputMode,
    #[serde(default)]
    areas: Vec<AreaSpec>,
    #[serde(default)]
    creatures: Vec<CreatureSpec>,
    #[serde(default)]
    spawn: Option<SpawnSpec>,
    #[serde(default)]
    pub(crate) steps: Vec<Step>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AreaSpec {
    name: String,
    columns: i32,
    rows: i32,
    #[serde(default)]
    open_water: Vec<[i32; 2]>,
    #[serde(default)]
    shallow_water: Vec<[i32; 2]>,
    #[serde(default)]
    trees: Vec<[i32; 2]>,
    #[serde(default)]
    bushes: Vec<[i32; 2]>,
    #[serde(default)]
    stumps: Vec<[i32; 2]>,
    #[serde(default)]
    natives: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CreatureSpec {
    key: String,
    rarity: i64,
    #[serde(default)]
    habitat: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpawnSpec {
    area: String,
    slots: Vec<String>,
}

/// One scripted action.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub(crate) enum Step {
    Connect {
        peer: u64,
        area: String,
        tile: [i32; 2],
    },
    Warp {
        peer: u64,
        area: String,
        #[serde(default)]
        tile: [i32; 2],
    },
    Disconnect {
        peer: u64,
    },
    Throw {
        tile: [i32; 2],
        #[serde(default)]
        variant: ThrowVariant,
    },
    Tick {
        #[serde(default = "one_tick")]
        count: u32,
    },
    Release {
        entity: u32,
    },
}

fn one_tick() -> u32 {
    1
}

/// Converts a `[x, y]` pair into a tile.
pub(crate) fn tile([x, y]: [i32; 2]) -> TileCoord {
    TileCoord::new(x, y)
}

/// Validates a scripted area name.
pub(crate) fn area_name(raw: &str) -> Result<AreaName> {
    AreaName::new(raw).with_context(|| format!("area name {raw:?} is empty"))
}

impl Scenario {
    /// Parses a TOML scenario.
    pub(crate) fn parse(source: &str) -> Result<Self> {
        toml::from_str(source).context("failed to parse scenario")
    }

    /// Reads and parses a TOML scenario file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::parse(&source).with_context(|| format!("in scenario {}", path.display()))
    }

    /// Scenario replayed without a file.
    pub(crate) fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_SCENARIO)
    }

    /// Builds the in-memory world the scenario runs in.
    pub(crate) fn build_world(&self, seed: u64) -> Result<World> {
        let mut world = World::with_seed(seed);

        let mut records = LocationalData::new();
        for creature in &self.creatures {
            if creature.key.is_empty() {
                bail!("creature keys must not be empty");
            }
            let _ = records.insert(creature.key.clone(), creature.record());
        }

        for spec in &self.areas {
            let name = area_name(&spec.name)?;
            let layout = AreaLayout::new(name.clone(), spec.columns, spec.rows)
                .with_open_water(spec.open_water.iter().copied().map(tile))
                .with_shallow_water(spec.shallow_water.iter().copied().map(tile))
                .with_trees(spec.trees.iter().copied().map(tile))
                .with_bushes(spec.bushes.iter().copied().map(tile))
                .with_stumps(spec.stumps.iter().copied().map(tile));
            world.add_area(layout);

            let natives = native_records(&records, &spec.natives)
                .with_context(|| format!("natives of area '{name}'"))?;
            world.set_native_creatures(name, natives);
        }

        world.set_catalog(
            records
                .iter()
                .map(|(key, record)| (key.clone(), record.clone()))
                .collect::<CreatureDataTable>(),
        );

        if let Some(spawn) = &self.spawn {
            let area = self
                .areas
                .iter()
                .find(|candidate| candidate.name == spawn.area)
                .with_context(|| format!("spawn profile names unknown area '{}'", spawn.area))?;
            let locational = native_records(&records, &area.natives)?;
            world.set_spawn_config(SpawnConfig::new(locational, spawn.slots.clone()));
        }

        log::debug!(
            "scenario world holds {} areas and {} creatures",
            self.areas.len(),
            records.len()
        );
        Ok(world)
    }
}

impl CreatureSpec {
    fn record(&self) -> CreatureRecord {
        let mut fields = vec![String::new(); HABITAT_FIELD_INDEX + 1];
        fields[RARITY_FIELD_INDEX] = self.rarity.to_string();
        if let Some(habitat) = &self.habitat {
            fields[HABITAT_FIELD_INDEX] = habitat.clone();
        }
        CreatureRecord::new(fields)
    }
}

fn native_records(records: &LocationalData, keys: &[String]) -> Result<LocationalData> {
    keys.iter()
        .map(|key| {
            records
                .get(key)
                .map(|record| (key.clone(), record.clone()))
                .with_context(|| format!("creature '{key}' is not declared"))
        })
        .collect()
}
