//! Static terrain of the areas loaded into the world.

use std::collections::BTreeSet;

use wildlife_sync_core::{AreaName, TileCoord};

/// Terrain description of a single area used to seed the world.
#[derive(Clone, Debug)]
pub struct AreaLayout {
    pub(crate) name: AreaName,
    pub(crate) columns: i32,
    pub(crate) rows: i32,
    pub(crate) water: BTreeSet<TileCoord>,
    pub(crate) open_water: BTreeSet<TileCoord>,
    pub(crate) trees: Vec<TileCoord>,
    pub(crate) bushes: Vec<TileCoord>,
    pub(crate) stumps: Vec<TileCoord>,
}

impl AreaLayout {
    /// Creates a dry area spanning `columns` by `rows` tiles.
    #[must_use]
    pub fn new(name: AreaName, columns: i32, rows: i32) -> Self {
        Self {
            name,
            columns: columns.max(0),
            rows: rows.max(0),
            water: BTreeSet::new(),
            open_water: BTreeSet::new(),
            trees: Vec::new(),
            bushes: Vec::new(),
            stumps: Vec::new(),
        }
    }

    /// Adds open water tiles that creatures may spawn on.
    #[must_use]
    pub fn with_open_water(mut self, tiles: impl IntoIterator<Item = TileCoord>) -> Self {
        for tile in tiles {
            if self.contains(tile) {
                let _ = self.water.insert(tile);
                let _ = self.open_water.insert(tile);
            }
        }
        self
    }

    /// Adds water tiles that are not suitable for spawning, such as shoreline.
    #[must_use]
    pub fn with_shallow_water(mut self, tiles: impl IntoIterator<Item = TileCoord>) -> Self {
        for tile in tiles {
            if self.contains(tile) {
                let _ = self.water.insert(tile);
            }
        }
        self
    }

    /// Adds tree tiles.
    #[must_use]
    pub fn with_trees(mut self, tiles: impl IntoIterator<Item = TileCoord>) -> Self {
        self.trees.extend(tiles);
        self
    }

    /// Adds bush tiles.
    #[must_use]
    pub fn with_bushes(mut self, tiles: impl IntoIterator<Item = TileCoord>) -> Self {
        self.bushes.extend(tiles);
        self
    }

    /// Adds stump tiles.
    #[must_use]
    pub fn with_stumps(mut self, tiles: impl IntoIterator<Item = TileCoord>) -> Self {
        self.stumps.extend(tiles);
        self
    }

    /// Name of the area.
    #[must_use]
    pub fn name(&self) -> &AreaName {
        &self.name
    }

    pub(crate) fn contains(&self, tile: TileCoord) -> bool {
        (0..self.columns).contains(&tile.x()) && (0..self.rows).contains(&tile.y())
    }
}
