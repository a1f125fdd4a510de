use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use wildlife_sync_core::{
    CreatureDataTable, CreatureRecord, LocationalData, ProbabilityTable, RarityBucket,
    SpawnCandidate, SpawnConfig,
};
use wildlife_sync_system_spawn_selection::{
    is_blacklisted, SpawnListBuilder, WeightedSpawnSelector, DEFAULT_BLACKLIST, SPAWN_SLOTS,
};
use wildlife_sync_world::World;

fn record(rarity: u8, habitat: &str) -> CreatureRecord {
    let mut fields = vec![String::new(); 18];
    fields[0] = rarity.to_string();
    fields[17] = habitat.to_owned();
    CreatureRecord::new(fields)
}

#[test]
fn selection_only_returns_keys_with_a_chance() {
    let keys = ["Carp", "", "Pike", "Koi", "Eel"];
    let mut selector = WeightedSpawnSelector::default();

    for seed in 0..128 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let candidates: Vec<SpawnCandidate> = keys
            .iter()
            .map(|key| {
                let probability = match rng.gen_range(0..4) {
                    0 => 0.0,
                    1 => -0.5,
                    2 => rng.gen_range(0.0..0.2),
                    _ => rng.gen_range(0.2..1.5),
                };
                SpawnCandidate::new(*key, RarityBucket::new(0), probability)
            })
            .collect();

        if let Some(key) = selector.select_one(&candidates, &mut rng) {
            let winner = candidates
                .iter()
                .find(|candidate| candidate.key == key)
                .expect("winner is a candidate");
            assert!(!winner.key.is_empty(), "seed {seed}");
            assert!(winner.probability.is_positive(), "seed {seed}");
        }
    }
}

#[test]
fn bucket_roll_gives_up_when_no_water_keys_exist() {
    let selector = WeightedSpawnSelector::default();
    let catalog: CreatureDataTable = [
        ("Crow".to_owned(), record(0, "1")),
        ("Carp_Shiny".to_owned(), record(1, "3")),
        ("TerrariumNewt".to_owned(), record(2, "3")),
    ]
    .into_iter()
    .collect();

    let mut rng = ChaCha8Rng::seed_from_u64(11);
    assert!(!selector.has_water_keys(&catalog));
    assert_eq!(selector.roll_water_bucket(&catalog, &mut rng), None);
    assert_eq!(selector.choose_water_key(&catalog, &mut rng), None);
}

#[test]
fn bucket_roll_finds_the_only_populated_bucket() {
    let selector = WeightedSpawnSelector::default();
    let catalog: CreatureDataTable = [
        ("Carp".to_owned(), record(0, "3")),
        ("Minnow".to_owned(), record(0, "")),
        ("Crow".to_owned(), record(0, "2")),
    ]
    .into_iter()
    .collect();

    for seed in 0..32 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let (bucket, keys) = selector
            .roll_water_bucket(&catalog, &mut rng)
            .expect("common bucket is rolled within the attempt limit");
        assert_eq!(bucket, RarityBucket::new(0));
        assert_eq!(keys, vec!["Carp".to_owned(), "Minnow".to_owned()]);
    }
}

#[test]
fn chosen_water_keys_are_never_blacklisted() {
    let selector = WeightedSpawnSelector::default();
    let catalog: CreatureDataTable = (0..5_u8)
        .flat_map(|rarity| {
            [
                (format!("Fish{rarity}"), record(rarity, "3")),
                (format!("Fish{rarity}_Shiny"), record(rarity, "3")),
                (format!("Terrarium{rarity}"), record(rarity, "3")),
            ]
        })
        .collect();

    for seed in 0..64 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        if let Some(key) = selector.choose_water_key(&catalog, &mut rng) {
            assert!(!is_blacklisted(&key, DEFAULT_BLACKLIST), "seed {seed}: {key}");
        }
    }
}

#[test]
fn builder_declines_without_table_candidates() {
    let builder = SpawnListBuilder::default();
    let mut selector = WeightedSpawnSelector::default();
    let mut world = World::new();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut locational = LocationalData::new();
    let _ = locational.insert("Crow".to_owned(), record(0, "1"));

    let list = builder.build(
        &mut selector,
        &locational,
        &ProbabilityTable::default(),
        &mut world,
        &mut rng,
    );
    assert_eq!(list, None);
}

#[test]
fn builder_interleaves_table_and_native_rolls() {
    let builder = SpawnListBuilder::default();
    let mut selector = WeightedSpawnSelector::default();
    let mut world = World::new();
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let mut table = ProbabilityTable::default();
    table.insert("Creature.Carp", 1.0);
    let mut locational = LocationalData::new();
    let _ = locational.insert("Carp".to_owned(), record(0, "3"));
    let _ = locational.insert("Crow".to_owned(), record(0, "1"));

    let list = builder
        .build(&mut selector, &locational, &table, &mut world, &mut rng)
        .expect("table candidates exist");

    assert_eq!(list.len(), SPAWN_SLOTS);
    for (slot, key) in list.iter().enumerate() {
        let expected = if slot % 3 == 0 { "Carp" } else { "Crow" };
        assert_eq!(key, expected, "slot {slot}");
    }
}

#[test]
fn builder_drops_failed_table_rolls() {
    let builder = SpawnListBuilder::new(40, 3);
    let mut selector = WeightedSpawnSelector::default();
    let mut world = World::new();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut table = ProbabilityTable::default();
    table.insert("Creature.Koi", 0.05);
    let mut locational = LocationalData::new();
    let _ = locational.insert("Koi".to_owned(), record(4, "3"));

    let list = builder
        .build(&mut selector, &locational, &table, &mut world, &mut rng)
        .expect("table candidates exist");

    assert!(list.len() < 40, "some of the 40 rolls at 5% should fail");
    assert!(list.iter().all(|key| key == "Koi"));
}

#[test]
fn builder_with_only_failed_rolls_yields_an_ineligible_list() {
    let builder = SpawnListBuilder::new(5, 3);
    let mut selector = WeightedSpawnSelector::default();
    let mut world = World::new();
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let mut table = ProbabilityTable::default();
    table.insert("Creature.Koi", 1e-9);
    let mut locational = LocationalData::new();
    let _ = locational.insert("Koi".to_owned(), record(4, "3"));

    let list = builder
        .build(&mut selector, &locational, &table, &mut world, &mut rng)
        .expect("table candidates exist");

    assert!(list.is_empty());
    assert!(SpawnConfig::new(LocationalData::new(), list).is_empty());
}

#[test]
fn selection_never_returns_blacklisted_keys() {
    let keys = [
        "Carp",
        "Carp_Shiny",
        "TerrariumNewt",
        "Koi",
        "shinyEel",
        "Pike",
    ];
    let mut selector = WeightedSpawnSelector::default();

    for seed in 0..128 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let candidates: Vec<SpawnCandidate> = keys
            .iter()
            .filter_map(|key| {
                rng.gen_bool(0.7)
                    .then(|| SpawnCandidate::new(*key, RarityBucket::new(0), rng.gen_range(0.0..1.2)))
            })
            .collect();

        if let Some(key) = selector.select_one(&candidates, &mut rng) {
            assert!(!is_blacklisted(&key, DEFAULT_BLACKLIST), "seed {seed}: {key}");
        }
    }
}
