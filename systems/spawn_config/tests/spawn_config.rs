use wildlife_sync_core::{AreaName, TileCoord};
use wildlife_sync_system_spawn_config::EnvironmentAnchorCache;
use wildlife_sync_world::{query, AreaLayout, FaultPlan, World};

fn area(name: &str) -> AreaName {
    AreaName::new(name).expect("area name")
}

fn two_area_world() -> World {
    let mut world = World::new();
    world.add_area(
        AreaLayout::new(area("Pond"), 8, 8)
            .with_open_water([TileCoord::new(3, 3), TileCoord::new(4, 3)])
            .with_trees([TileCoord::new(0, 0)]),
    );
    world.add_area(
        AreaLayout::new(area("Forest"), 8, 8)
            .with_trees([TileCoord::new(1, 1), TileCoord::new(2, 1)])
            .with_bushes([TileCoord::new(5, 5)])
            .with_stumps([TileCoord::new(6, 6)]),
    );
    world
}

#[test]
fn refresh_installs_anchors_of_the_requested_area() {
    let mut world = two_area_world();
    let mut cache = EnvironmentAnchorCache::new();

    let pond = cache.refresh(&area("Pond"), &mut world).expect("pond anchors");
    assert_eq!(pond.water.len(), 2);
    assert_eq!(pond.trees, vec![TileCoord::new(0, 0)]);

    let forest = cache
        .refresh(&area("Forest"), &mut world)
        .expect("forest anchors")
        .clone();
    let installed = query::anchors(&world).expect("installed anchors");
    assert_eq!(installed, &forest);
    assert_eq!(installed.area, area("Forest"));
    assert!(installed.water.is_empty());
    assert_eq!(installed.len(), 4);
}

#[test]
fn failed_query_leaves_workspace_untouched() {
    let mut world = two_area_world();
    let mut cache = EnvironmentAnchorCache::new();
    let _ = cache.refresh(&area("Pond"), &mut world).expect("pond anchors");

    world.set_faults(FaultPlan {
        fail_terrain: true,
        ..FaultPlan::default()
    });
    assert!(cache.refresh(&area("Forest"), &mut world).is_err());

    let installed = query::anchors(&world).expect("installed anchors");
    assert_eq!(installed.area, area("Pond"));
    assert_eq!(cache.last().map(|anchors| anchors.area.clone()), Some(area("Pond")));
}

#[test]
fn unknown_area_is_reported() {
    let mut world = two_area_world();
    let mut cache = EnvironmentAnchorCache::new();
    assert!(cache.refresh(&area("Cave"), &mut world).is_err());
    assert!(query::anchors(&world).is_none());
    assert!(cache.last().is_none());
}
