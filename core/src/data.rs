//! Read-only spawn data shared by the selection and bridge systems.
//!
//! The collaborator describes every creature it knows with an ordered field
//! list. Only a handful of positions matter here: rank 0 holds the rarity,
//! a fixed index holds the habitat code, and the two following indices hold
//! the terrarium and donation flags. Probabilities come from a separate,
//! externally loaded table keyed by fully-qualified creature key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AreaName, TileCoord};

/// Index of the rarity rank within a creature's field list.
pub const RARITY_FIELD_INDEX: usize = 0;
/// Index of the habitat code within a creature's field list.
pub const HABITAT_FIELD_INDEX: usize = 17;
/// Index of the terrarium-eligible flag within a creature's field list.
pub const TERRARIUM_FIELD_INDEX: usize = 18;
/// Index of the donation-eligible flag within a creature's field list.
pub const DONATION_FIELD_INDEX: usize = 19;

/// Namespace prepended to bare creature keys when none is configured.
pub const DEFAULT_KEY_NAMESPACE: &str = "Creature.";

/// Probability clamped into `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Probability(f64);

impl Probability {
    /// Probability that never succeeds.
    pub const ZERO: Probability = Probability(0.0);

    /// Creates a probability, clamping out-of-range values and mapping NaN to zero.
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Numeric value inside `[0, 1]`.
    #[must_use]
    pub const fn get(&self) -> f64 {
        self.0
    }

    /// Reports whether a trial at this probability can succeed.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > 0.0
    }
}

/// One of the five weighted rarity tiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RarityBucket(u8);

impl RarityBucket {
    /// Highest rarity rank.
    pub const MAX: u8 = 4;

    /// Every bucket in ascending rank order.
    pub const ALL: [RarityBucket; 5] = [
        RarityBucket(0),
        RarityBucket(1),
        RarityBucket(2),
        RarityBucket(3),
        RarityBucket(4),
    ];

    /// Creates a bucket, clamping the rank into `[0, 4]`.
    #[must_use]
    pub fn new(rank: i64) -> Self {
        Self(rank.clamp(0, i64::from(Self::MAX)) as u8)
    }

    /// Numeric rank of the bucket.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Position of the bucket inside [`RarityBucket::ALL`].
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Terrain classification restricting where a creature may appear.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HabitatCode {
    /// One of the ground codes (`0`, `1`, `2`, `4`).
    Ground(u8),
    /// Explicit water code (`3`).
    Water,
    /// Missing or unrecognised code.
    Unspecified,
}

impl HabitatCode {
    /// Parses the raw habitat field.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("3") => Self::Water,
            Some(code @ ("0" | "1" | "2" | "4")) => Self::Ground(code.as_bytes()[0] - b'0'),
            _ => Self::Unspecified,
        }
    }

    /// Whether a creature with this code may spawn on water.
    ///
    /// Unrecognised codes are not ground codes, so they count as water.
    #[must_use]
    pub const fn accepts_water(&self) -> bool {
        !matches!(self, Self::Ground(_))
    }
}

/// Ordered field list describing one creature.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreatureRecord {
    fields: Vec<String>,
}

impl CreatureRecord {
    /// Wraps a raw field list.
    #[must_use]
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Raw field at `index`, if present.
    #[must_use]
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Rarity rank; unparsable or missing ranks fall back to the commonest bucket.
    #[must_use]
    pub fn rarity(&self) -> RarityBucket {
        self.field(RARITY_FIELD_INDEX)
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map_or(RarityBucket::default(), RarityBucket::new)
    }

    /// Habitat code stored at the fixed habitat index.
    #[must_use]
    pub fn habitat(&self) -> HabitatCode {
        HabitatCode::parse(self.field(HABITAT_FIELD_INDEX))
    }

    /// Whether the creature may be placed in a terrarium.
    #[must_use]
    pub fn terrarium_eligible(&self) -> bool {
        self.flag(TERRARIUM_FIELD_INDEX)
    }

    /// Whether the creature may be donated.
    #[must_use]
    pub fn donation_eligible(&self) -> bool {
        self.flag(DONATION_FIELD_INDEX)
    }

    fn flag(&self, index: usize) -> bool {
        self.field(index)
            .is_some_and(|raw| raw.trim().eq_ignore_ascii_case("true"))
    }
}

/// Creatures known to an area keyed by bare creature key.
pub type LocationalData = BTreeMap<String, CreatureRecord>;

/// Static catalogue of every creature, keyed by bare creature key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreatureDataTable {
    records: BTreeMap<String, CreatureRecord>,
}

impl CreatureDataTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record.
    pub fn insert(&mut self, key: impl Into<String>, record: CreatureRecord) {
        let _ = self.records.insert(key.into(), record);
    }

    /// Looks up a record.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CreatureRecord> {
        self.records.get(key)
    }

    /// Iterates over records in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CreatureRecord)> {
        self.records.iter().map(|(key, record)| (key.as_str(), record))
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Reports whether the table holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<(String, CreatureRecord)> for CreatureDataTable {
    fn from_iter<T: IntoIterator<Item = (String, CreatureRecord)>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Externally supplied spawn probabilities keyed by fully-qualified key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityTable {
    #[serde(default = "default_namespace")]
    namespace: String,
    #[serde(default)]
    chances: BTreeMap<String, f64>,
}

fn default_namespace() -> String {
    DEFAULT_KEY_NAMESPACE.to_owned()
}

impl Default for ProbabilityTable {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_NAMESPACE)
    }
}

impl ProbabilityTable {
    /// Creates an empty table using the provided key namespace.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            chances: BTreeMap::new(),
        }
    }

    /// Inserts a raw chance for a fully-qualified key.
    pub fn insert(&mut self, full_key: impl Into<String>, chance: f64) {
        let _ = self.chances.insert(full_key.into(), chance);
    }

    /// Namespace prepended to bare keys.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Fully-qualified form of a bare key.
    #[must_use]
    pub fn qualify(&self, bare_key: &str) -> String {
        format!("{}{bare_key}", self.namespace)
    }

    /// Raw, unclamped chance for a bare key.
    #[must_use]
    pub fn raw_chance(&self, bare_key: &str) -> Option<f64> {
        self.chances.get(&self.qualify(bare_key)).copied()
    }

    /// Number of configured entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chances.len()
    }

    /// Reports whether no chances are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chances.is_empty()
    }
}

/// Candidate considered by the weighted selector.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnCandidate {
    /// Bare creature key.
    pub key: String,
    /// Rarity tier of the creature.
    pub rarity: RarityBucket,
    /// Chance used for independent trials.
    pub probability: Probability,
}

impl SpawnCandidate {
    /// Creates a candidate, clamping the probability.
    #[must_use]
    pub fn new(key: impl Into<String>, rarity: RarityBucket, probability: f64) -> Self {
        Self {
            key: key.into(),
            rarity,
            probability: Probability::new(probability),
        }
    }
}

/// The collaborator's working spawn configuration for one area.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpawnConfig {
    /// Creatures eligible to appear in the area.
    pub locational_data: LocationalData,
    /// Chosen spawn slots consumed by the collaborator's spawn pass.
    pub spawn_list: Vec<String>,
}

impl SpawnConfig {
    /// Creates a configuration from its two parts.
    #[must_use]
    pub fn new(locational_data: LocationalData, spawn_list: Vec<String>) -> Self {
        Self {
            locational_data,
            spawn_list,
        }
    }

    /// Number of eligible entries across both parts; empty slots do not count.
    #[must_use]
    pub fn eligible_entries(&self) -> usize {
        let slots = self.spawn_list.iter().filter(|key| !key.is_empty()).count();
        self.locational_data.len() + slots
    }

    /// Reports whether the configuration could never produce a spawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.eligible_entries() == 0
    }
}

/// Static terrain anchors computed for a single area.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvironmentAnchorSet {
    /// Area the anchors were computed from.
    pub area: AreaName,
    /// Tiles holding trees.
    pub trees: Vec<TileCoord>,
    /// Tiles holding bushes.
    pub bushes: Vec<TileCoord>,
    /// Tiles holding stumps.
    pub stumps: Vec<TileCoord>,
    /// Open-water tiles.
    pub water: Vec<TileCoord>,
}

impl EnvironmentAnchorSet {
    /// Anchor set with no anchors for the provided area.
    #[must_use]
    pub fn empty(area: AreaName) -> Self {
        Self {
            area,
            trees: Vec::new(),
            bushes: Vec::new(),
            stumps: Vec::new(),
            water: Vec::new(),
        }
    }

    /// Total number of anchors across every category.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.len() + self.bushes.len() + self.stumps.len() + self.water.len()
    }

    /// Reports whether no anchors were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(rarity: &str, habitat: Option<&str>) -> CreatureRecord {
        let mut fields = vec![String::new(); HABITAT_FIELD_INDEX];
        fields[RARITY_FIELD_INDEX] = rarity.to_owned();
        if let Some(code) = habitat {
            fields.push(code.to_owned());
        }
        CreatureRecord::new(fields)
    }

    #[test]
    fn probabilities_are_clamped() {
        assert_eq!(Probability::new(1.7).get(), 1.0);
        assert_eq!(Probability::new(-0.3).get(), 0.0);
        assert_eq!(Probability::new(f64::NAN).get(), 0.0);
        assert!(!Probability::new(0.0).is_positive());
    }

    #[test]
    fn rarity_ranks_are_clamped() {
        assert_eq!(RarityBucket::new(-2).get(), 0);
        assert_eq!(RarityBucket::new(9).get(), 4);
        assert_eq!(record("7", None).rarity().get(), 4);
        assert_eq!(record("rare", None).rarity().get(), 0);
    }

    #[test]
    fn habitat_codes_follow_ground_list() {
        assert!(record("0", Some("3")).habitat().accepts_water());
        assert!(!record("0", Some("1")).habitat().accepts_water());
        assert!(record("0", Some("9")).habitat().accepts_water());
        assert!(record("0", None).habitat().accepts_water());
        assert_eq!(record("0", Some("4")).habitat(), HabitatCode::Ground(4));
    }

    #[test]
    fn eligibility_flags_follow_habitat_index() {
        let mut fields = vec![String::new(); HABITAT_FIELD_INDEX + 1];
        fields.push("TRUE".to_owned());
        fields.push("false".to_owned());
        let record = CreatureRecord::new(fields);
        assert!(record.terrarium_eligible());
        assert!(!record.donation_eligible());
    }

    #[test]
    fn probability_table_loads_from_json_with_default_namespace() {
        let table: ProbabilityTable =
            serde_json::from_str(r#"{ "chances": { "Creature.Carp": 0.5 } }"#).expect("table");
        assert_eq!(table.namespace(), DEFAULT_KEY_NAMESPACE);
        assert_eq!(table.raw_chance("Carp"), Some(0.5));
        assert_eq!(table.raw_chance("Pike"), None);
    }

    #[test]
    fn spawn_config_counts_both_parts() {
        let mut config = SpawnConfig::default();
        assert!(config.is_empty());
        config.spawn_list.push("Carp".to_owned());
        assert_eq!(config.eligible_entries(), 1);
    }

    #[test]
    fn empty_slots_are_not_eligible() {
        let config = SpawnConfig::new(LocationalData::new(), vec![String::new(); 3]);
        assert!(config.is_empty());
    }
}
