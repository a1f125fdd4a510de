//! Habitat and name filtering over the creature catalogue.

use wildlife_sync_core::{CreatureDataTable, RarityBucket};

/// Substrings that exclude a catalogue key from consolation spawns.
pub const DEFAULT_BLACKLIST: &[&str] = &["Shiny", "Terrarium"];

/// Substrings that exclude a key from table-driven selection.
///
/// Shiny variants stay eligible here; their table chance is dampened instead.
pub const TABLE_BLACKLIST: &[&str] = &["Terrarium"];

/// Reports whether `key` contains any blacklisted substring, ignoring case.
///
/// An empty key is always blacklisted.
#[must_use]
pub fn is_blacklisted(key: &str, blacklist: &[&str]) -> bool {
    if key.is_empty() {
        return true;
    }
    let lowered = key.to_ascii_lowercase();
    blacklist
        .iter()
        .any(|needle| lowered.contains(&needle.to_ascii_lowercase()))
}

/// Water-compatible, non-blacklisted keys of the catalogue in the given bucket.
#[must_use]
pub fn eligible_water_keys(
    table: &CreatureDataTable,
    bucket: RarityBucket,
    blacklist: &[&str],
) -> Vec<String> {
    table
        .iter()
        .filter(|(key, record)| {
            record.rarity() == bucket
                && record.habitat().accepts_water()
                && !is_blacklisted(key, blacklist)
        })
        .map(|(key, _)| key.to_owned())
        .collect()
}

/// Reports whether any bucket holds at least one eligible water key.
#[must_use]
pub fn any_water_keys(table: &CreatureDataTable, blacklist: &[&str]) -> bool {
    table
        .iter()
        .any(|(key, record)| record.habitat().accepts_water() && !is_blacklisted(key, blacklist))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wildlife_sync_core::CreatureRecord;

    fn record(rarity: &str, habitat: &str) -> CreatureRecord {
        let mut fields = vec![String::new(); 18];
        fields[0] = rarity.to_owned();
        fields[17] = habitat.to_owned();
        CreatureRecord::new(fields)
    }

    #[test]
    fn blacklist_ignores_case_and_rejects_empty_keys() {
        assert!(is_blacklisted("", DEFAULT_BLACKLIST));
        assert!(is_blacklisted("Carp_SHINY", DEFAULT_BLACKLIST));
        assert!(is_blacklisted("terrariumFrog", DEFAULT_BLACKLIST));
        assert!(!is_blacklisted("Carp", DEFAULT_BLACKLIST));
        assert!(!is_blacklisted("Carp", &[]));
    }

    #[test]
    fn water_keys_respect_bucket_habitat_and_blacklist() {
        let table: CreatureDataTable = [
            ("Carp".to_owned(), record("1", "3")),
            ("Eel".to_owned(), record("1", "9")),
            ("Crow".to_owned(), record("1", "0")),
            ("Carp_Shiny".to_owned(), record("1", "3")),
            ("Pike".to_owned(), record("2", "3")),
        ]
        .into_iter()
        .collect();

        let keys = eligible_water_keys(&table, RarityBucket::new(1), DEFAULT_BLACKLIST);
        assert_eq!(keys, vec!["Carp".to_owned(), "Eel".to_owned()]);
        assert!(eligible_water_keys(&table, RarityBucket::new(4), DEFAULT_BLACKLIST).is_empty());
        assert!(any_water_keys(&table, DEFAULT_BLACKLIST));
    }

    #[test]
    fn ground_only_catalogue_has_no_water_keys() {
        let table: CreatureDataTable = [("Crow".to_owned(), record("0", "2"))]
            .into_iter()
            .collect();
        assert!(!any_water_keys(&table, DEFAULT_BLACKLIST));
    }
}
