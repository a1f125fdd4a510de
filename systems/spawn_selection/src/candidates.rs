//! Candidate construction from the external probability table.

use wildlife_sync_core::{LocationalData, Probability, ProbabilityTable, SpawnCandidate};

/// Marker identifying shiny variants, matched ignoring case.
pub const SHINY_MARKER: &str = "_Shiny";

/// Reports whether `key` names a shiny variant.
#[must_use]
pub fn is_shiny(key: &str) -> bool {
    key.to_ascii_lowercase()
        .contains(&SHINY_MARKER.to_ascii_lowercase())
}

/// Effective table probability of a bare key.
///
/// Shiny variants are multiplied by `shiny_dampening` before clamping. Keys
/// without an entry, or whose clamped chance is zero, yield `None`.
#[must_use]
pub fn table_probability(
    table: &ProbabilityTable,
    bare_key: &str,
    shiny_dampening: f64,
) -> Option<Probability> {
    let raw = table.raw_chance(bare_key)?;
    let adjusted = if is_shiny(bare_key) {
        raw * shiny_dampening
    } else {
        raw
    };
    let probability = Probability::new(adjusted);
    probability.is_positive().then_some(probability)
}

/// Builds candidates for every locational entry the table gives a chance.
///
/// With `water_only` set, entries whose habitat excludes water are dropped.
#[must_use]
pub fn table_candidates(
    locational: &LocationalData,
    table: &ProbabilityTable,
    shiny_dampening: f64,
    water_only: bool,
) -> Vec<SpawnCandidate> {
    locational
        .iter()
        .filter(|(key, record)| !key.is_empty() && (!water_only || record.habitat().accepts_water()))
        .filter_map(|(key, record)| {
            let probability = table_probability(table, key, shiny_dampening)?;
            Some(SpawnCandidate {
                key: key.clone(),
                rarity: record.rarity(),
                probability,
            })
        })
        .collect()
}
