//! # Coordinates Module
//!
//! The lattices the world is addressed in:
//!
//! * **Voxel space**: plain `Point3<i32>` world positions.
//! * **Chunk space**: [`ChunkCoordinate`], one per paged chunk.
//! * **Mesh tile space**: [`MeshTileCoordinate`], one per extracted mesh column.
//!
//! All conversions floor towards negative infinity, so `-1` belongs to the tile that
//! starts at `-size`, not to the tile at the origin.

use cgmath::Point3;

/// Integer lattice coordinate of a chunk (world position divided by the chunk side).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChunkCoordinate(pub Point3<i32>);

impl ChunkCoordinate {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        ChunkCoordinate(Point3::new(x, y, z))
    }

    /// The chunk that contains the world position `pos`.
    pub fn from_world(pos: Point3<i32>, side_length: i32) -> Self {
        ChunkCoordinate(Point3::new(
            pos.x.div_euclid(side_length),
            pos.y.div_euclid(side_length),
            pos.z.div_euclid(side_length),
        ))
    }

    /// World position of the chunk's lowest corner.
    pub fn origin(&self, side_length: i32) -> Point3<i32> {
        Point3::new(
            self.0.x * side_length,
            self.0.y * side_length,
            self.0.z * side_length,
        )
    }
}

/// World position of the lowest corner of a mesh tile.
///
/// Mesh tiles are full-height columns, so the `y` component is always zero: every
/// position inside the column maps to the identical coordinate and therefore to a
/// single dedup entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeshTileCoordinate(pub Point3<i32>);

impl MeshTileCoordinate {
    /// Cuts the given world position down to its mesh tile.
    pub fn from_world(pos: Point3<i32>, mesh_size: i32) -> Self {
        MeshTileCoordinate(Point3::new(
            pos.x.div_euclid(mesh_size) * mesh_size,
            0,
            pos.z.div_euclid(mesh_size) * mesh_size,
        ))
    }

    /// The extraction region of this tile: `mesh_size` wide and deep, full world height.
    pub fn region(&self, mesh_size: i32, max_height: i32) -> Region {
        Region::new(
            Point3::new(self.0.x, 0, self.0.z),
            Point3::new(
                self.0.x + mesh_size - 1,
                max_height - 1,
                self.0.z + mesh_size - 1,
            ),
        )
    }
}

/// Axis-aligned box of voxels, both corners inclusive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    pub mins: Point3<i32>,
    pub maxs: Point3<i32>,
}

impl Region {
    pub fn new(mins: Point3<i32>, maxs: Point3<i32>) -> Self {
        Region { mins, maxs }
    }

    pub fn width_in_voxels(&self) -> i32 {
        self.maxs.x - self.mins.x + 1
    }

    pub fn height_in_voxels(&self) -> i32 {
        self.maxs.y - self.mins.y + 1
    }

    pub fn depth_in_voxels(&self) -> i32 {
        self.maxs.z - self.mins.z + 1
    }

    pub fn contains(&self, pos: Point3<i32>) -> bool {
        (self.mins.x..=self.maxs.x).contains(&pos.x)
            && (self.mins.y..=self.maxs.y).contains(&pos.y)
            && (self.mins.z..=self.maxs.z).contains(&pos.z)
    }

    /// Iterates every voxel position in the region, `x` fastest, then `z`, then `y`.
    pub fn positions(&self) -> impl Iterator<Item = Point3<i32>> {
        let Region { mins, maxs } = *self;
        (mins.y..=maxs.y).flat_map(move |y| {
            (mins.z..=maxs.z).flat_map(move |z| (mins.x..=maxs.x).map(move |x| Point3::new(x, y, z)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_coordinates_floor_negative_positions() {
        assert_eq!(
            ChunkCoordinate::from_world(Point3::new(-1, 0, 31), 32),
            ChunkCoordinate::new(-1, 0, 0)
        );
        assert_eq!(
            ChunkCoordinate::from_world(Point3::new(32, -33, 64), 32),
            ChunkCoordinate::new(1, -2, 2)
        );
        assert_eq!(
            ChunkCoordinate::new(-1, 2, 0).origin(16),
            Point3::new(-16, 32, 0)
        );
    }

    #[test]
    fn positions_in_one_column_share_a_tile() {
        let a = MeshTileCoordinate::from_world(Point3::new(3, 0, 5), 16);
        let b = MeshTileCoordinate::from_world(Point3::new(15, 200, 0), 16);
        assert_eq!(a, b);
        assert_eq!(a.0, Point3::new(0, 0, 0));

        let negative = MeshTileCoordinate::from_world(Point3::new(-1, 7, -17), 16);
        assert_eq!(negative.0, Point3::new(-16, 0, -32));
    }

    #[test]
    fn tile_region_spans_full_height() {
        let region = MeshTileCoordinate(Point3::new(-16, 0, 32)).region(16, 64);
        assert_eq!(region.mins, Point3::new(-16, 0, 32));
        assert_eq!(region.maxs, Point3::new(-1, 63, 47));
        assert_eq!(region.width_in_voxels(), 16);
        assert_eq!(region.height_in_voxels(), 64);
        assert_eq!(region.depth_in_voxels(), 16);
        assert!(region.contains(Point3::new(-1, 63, 47)));
        assert!(!region.contains(Point3::new(0, 0, 32)));
    }

    #[test]
    fn region_positions_cover_every_voxel_once() {
        let region = Region::new(Point3::new(0, 0, 0), Point3::new(1, 2, 3));
        let positions: Vec<_> = region.positions().collect();
        assert_eq!(positions.len(), 2 * 3 * 4);
        assert_eq!(positions[0], Point3::new(0, 0, 0));
        assert_eq!(positions[1], Point3::new(1, 0, 0));
        assert_eq!(*positions.last().unwrap(), Point3::new(1, 2, 3));
    }
}
