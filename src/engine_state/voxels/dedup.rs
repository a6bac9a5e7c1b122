//! # Extraction Dedup Set
//!
//! Remembers every mesh tile whose extraction is in flight or delivered and not yet
//! invalidated, which is what guarantees at most one outstanding extraction per tile.
//!
//! The set belongs to the owning thread. Workers never see it: they only read the
//! world's cancellation flag, so every mutation here happens synchronously on the
//! thread that schedules.

use std::collections::HashSet;

use super::coords::MeshTileCoordinate;

#[derive(Debug, Default)]
pub struct ExtractionDedupSet {
    tiles: HashSet<MeshTileCoordinate>,
}

impl ExtractionDedupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `tile`; `false` if it was already present.
    pub fn try_insert(&mut self, tile: MeshTileCoordinate) -> bool {
        self.tiles.insert(tile)
    }

    /// Removes `tile`; `false` if it was not present.
    pub fn erase(&mut self, tile: &MeshTileCoordinate) -> bool {
        self.tiles.remove(tile)
    }

    pub fn contains(&self, tile: &MeshTileCoordinate) -> bool {
        self.tiles.contains(tile)
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MeshTileCoordinate> {
        self.tiles.iter()
    }
}
