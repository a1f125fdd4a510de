#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rarity-weighted probabilistic spawn selection.
//!
//! Rare candidates get their own first pass of independent trials so that
//! common creatures cannot crowd them out of every roll.

mod candidates;
mod filter;
mod rarity;
mod spawn_list;

use rand::Rng;
use wildlife_sync_core::{CreatureDataTable, LocationalData, ProbabilityTable, RarityBucket, SpawnCandidate};

pub use candidates::{is_shiny, table_candidates, table_probability, SHINY_MARKER};
pub use filter::{
    any_water_keys, eligible_water_keys, is_blacklisted, DEFAULT_BLACKLIST, TABLE_BLACKLIST,
};
pub use rarity::{bucket_for_roll, roll_bucket, RARITY_WEIGHTS, RARITY_WEIGHT_TOTAL};
pub use spawn_list::{SpawnListBuilder, SPAWN_SLOTS, TABLE_FIRST_INTERVAL};

/// Highest probability that still qualifies a candidate for the rare pass.
pub const RARE_THRESHOLD: f64 = 0.20;

/// Factor applied to the table chance of shiny variants.
pub const SHINY_DAMPENING: f64 = 0.1;

/// Upper bound on rarity bucket re-rolls.
pub const MAX_BUCKET_ROLLS: usize = 50;

/// Tunables of the weighted selector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectorConfig {
    rare_threshold: f64,
    shiny_dampening: f64,
    max_bucket_rolls: usize,
    blacklist: &'static [&'static str],
}

impl SelectorConfig {
    /// Creates a new selector configuration.
    #[must_use]
    pub const fn new(
        rare_threshold: f64,
        shiny_dampening: f64,
        max_bucket_rolls: usize,
        blacklist: &'static [&'static str],
    ) -> Self {
        Self {
            rare_threshold,
            shiny_dampening,
            max_bucket_rolls,
            blacklist,
        }
    }

    /// Highest probability considered during the rare pass.
    #[must_use]
    pub const fn rare_threshold(&self) -> f64 {
        self.rare_threshold
    }

    /// Factor applied to shiny table chances.
    #[must_use]
    pub const fn shiny_dampening(&self) -> f64 {
        self.shiny_dampening
    }

    /// Maximum number of bucket rolls before giving up.
    #[must_use]
    pub const fn max_bucket_rolls(&self) -> usize {
        self.max_bucket_rolls
    }

    /// Substrings excluding keys from bucket selection and trials.
    #[must_use]
    pub const fn blacklist(&self) -> &'static [&'static str] {
        self.blacklist
    }

    /// Same tunables with a different blacklist.
    #[must_use]
    pub const fn with_blacklist(self, blacklist: &'static [&'static str]) -> Self {
        Self { blacklist, ..self }
    }

    /// Default tunables for table-driven selection.
    #[must_use]
    pub fn for_table() -> Self {
        Self::default().with_blacklist(TABLE_BLACKLIST)
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self::new(RARE_THRESHOLD, SHINY_DAMPENING, MAX_BUCKET_ROLLS, DEFAULT_BLACKLIST)
    }
}

/// Selects spawn keys from weighted candidates.
#[derive(Debug, Default)]
pub struct WeightedSpawnSelector {
    config: SelectorConfig,
    successes: Vec<usize>,
}

impl WeightedSpawnSelector {
    /// Creates a selector with the provided configuration.
    #[must_use]
    pub fn new(config: SelectorConfig) -> Self {
        Self {
            config,
            successes: Vec::new(),
        }
    }

    /// Configuration the selector runs with.
    #[must_use]
    pub const fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Picks one candidate key, or `None` when every trial fails.
    ///
    /// The first pass only runs trials for rare candidates; the second pass,
    /// entered only when the first produced no success, runs them for every
    /// candidate. Winners are drawn uniformly among the successful trials.
    /// Candidates with an empty or blacklisted key, or a zero probability,
    /// never win.
    pub fn select_one<R>(&mut self, candidates: &[SpawnCandidate], rng: &mut R) -> Option<String>
    where
        R: Rng + ?Sized,
    {
        let threshold = self.config.rare_threshold;
        let winner = self
            .run_pass(candidates, rng, |probability| probability <= threshold)
            .or_else(|| self.run_pass(candidates, rng, |_| true))?;
        let key = candidates.get(winner).map(|candidate| candidate.key.clone());
        if let Some(key) = &key {
            log::trace!("selected '{key}' among {} candidates", candidates.len());
        }
        key
    }

    fn run_pass<R>(
        &mut self,
        candidates: &[SpawnCandidate],
        rng: &mut R,
        include: impl Fn(f64) -> bool,
    ) -> Option<usize>
    where
        R: Rng + ?Sized,
    {
        self.successes.clear();
        for (index, candidate) in candidates.iter().enumerate() {
            let probability = candidate.probability.get();
            if !candidate.probability.is_positive()
                || is_blacklisted(&candidate.key, self.config.blacklist)
            {
                continue;
            }
            if !include(probability) {
                continue;
            }
            let roll: f64 = rng.gen();
            log::trace!("trial '{}' rolled {roll:.4} against {probability:.4}", candidate.key);
            if roll <= probability {
                self.successes.push(index);
            }
        }

        if self.successes.is_empty() {
            return None;
        }
        let pick = rng.gen_range(0..self.successes.len());
        self.successes.get(pick).copied()
    }

    /// Candidates for the table-driven path, with shiny dampening applied.
    #[must_use]
    pub fn candidates_from_table(
        &self,
        locational: &LocationalData,
        table: &ProbabilityTable,
        water_only: bool,
    ) -> Vec<SpawnCandidate> {
        table_candidates(locational, table, self.config.shiny_dampening, water_only)
    }

    /// Reports whether any rarity bucket could yield a water key.
    #[must_use]
    pub fn has_water_keys(&self, catalog: &CreatureDataTable) -> bool {
        any_water_keys(catalog, self.config.blacklist)
    }

    /// Rolls rarity buckets until one holds eligible water keys.
    ///
    /// Gives up after the configured number of rolls, and immediately when
    /// no bucket holds any eligible key.
    pub fn roll_water_bucket<R>(
        &self,
        catalog: &CreatureDataTable,
        rng: &mut R,
    ) -> Option<(RarityBucket, Vec<String>)>
    where
        R: Rng + ?Sized,
    {
        if !self.has_water_keys(catalog) {
            return None;
        }

        for attempt in 0..self.config.max_bucket_rolls {
            let bucket = roll_bucket(rng);
            let keys = eligible_water_keys(catalog, bucket, self.config.blacklist);
            if !keys.is_empty() {
                log::trace!(
                    "bucket {} yielded {} keys after {} rolls",
                    bucket.get(),
                    keys.len(),
                    attempt + 1
                );
                return Some((bucket, keys));
            }
        }

        log::debug!(
            "no bucket yielded water keys within {} rolls",
            self.config.max_bucket_rolls
        );
        None
    }

    /// Picks a water key uniformly from a rolled bucket.
    pub fn choose_water_key<R>(&self, catalog: &CreatureDataTable, rng: &mut R) -> Option<String>
    where
        R: Rng + ?Sized,
    {
        let (_, keys) = self.roll_water_bucket(catalog, rng)?;
        let index = rng.gen_range(0..keys.len());
        keys.into_iter().nth(index)
    }
}
