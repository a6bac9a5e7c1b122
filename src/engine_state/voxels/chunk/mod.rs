//! # Chunk Module
//!
//! A `Chunk` is a dense cube of `side_length³` voxels and the paging unit of the
//! [`PagedVolume`](super::paged_volume::PagedVolume).
//!
//! ## Memory Layout
//!
//! - `voxels`: flat array, `x` fastest, then `y`, then `z`
//! - `occupancy`: one bit per voxel, set for every non-air voxel
//!
//! The occupancy mask lets samplers and the pager answer "is anything here" without
//! touching the voxel array, and keeps all-air chunks (the common case above the
//! terrain) cheap to recognise.

use bitvec::prelude::BitVec;
use cgmath::Point3;

use super::{coords::ChunkCoordinate, voxel::Voxel};

/// A cube of voxels at a fixed chunk coordinate.
#[derive(Clone, Debug)]
pub struct Chunk {
    /// Position in chunk coordinates.
    pub coordinate: ChunkCoordinate,
    side_length: i32,
    voxels: Vec<Voxel>,
    occupancy: BitVec,
    /// Set by edits; dirty chunks survive eviction when the volume persists.
    dirty: bool,
}

impl Chunk {
    /// Creates an all-air chunk.
    pub fn new(coordinate: ChunkCoordinate, side_length: i32) -> Self {
        let count = Self::voxel_count(side_length);
        Chunk {
            coordinate,
            side_length,
            voxels: vec![Voxel::air(); count],
            occupancy: BitVec::repeat(false, count),
            dirty: false,
        }
    }

    /// Number of voxels in a chunk of the given side length.
    pub fn voxel_count(side_length: i32) -> usize {
        let side = side_length.max(0) as usize;
        side * side * side
    }

    /// Bytes of voxel data held by a resident chunk of the given side length.
    pub fn byte_size(side_length: i32) -> usize {
        Self::voxel_count(side_length) * std::mem::size_of::<Voxel>()
    }

    pub fn side_length(&self) -> i32 {
        self.side_length
    }

    /// World position of the lowest corner.
    pub fn origin(&self) -> Point3<i32> {
        self.coordinate.origin(self.side_length)
    }

    fn index(&self, local: Point3<i32>) -> usize {
        let side = self.side_length as usize;
        local.x as usize + side * (local.y as usize + side * local.z as usize)
    }

    fn local(&self, world: Point3<i32>) -> Point3<i32> {
        Point3::new(
            world.x.rem_euclid(self.side_length),
            world.y.rem_euclid(self.side_length),
            world.z.rem_euclid(self.side_length),
        )
    }

    /// Reads the voxel at a world position inside this chunk.
    pub fn get_voxel(&self, world: Point3<i32>) -> Voxel {
        self.voxels[self.index(self.local(world))]
    }

    /// Writes the voxel at a world position inside this chunk and marks it dirty.
    pub fn set_voxel(&mut self, world: Point3<i32>, voxel: Voxel) {
        self.write(world, voxel);
        self.dirty = true;
    }

    /// Fills every voxel from a generator function of the world position.
    ///
    /// Used by pagers; generated content does not make the chunk dirty.
    pub fn fill_with(&mut self, mut generator: impl FnMut(Point3<i32>) -> Voxel) {
        let origin = self.origin();
        for z in 0..self.side_length {
            for y in 0..self.side_length {
                for x in 0..self.side_length {
                    let world = Point3::new(origin.x + x, origin.y + y, origin.z + z);
                    self.write(world, generator(world));
                }
            }
        }
    }

    fn write(&mut self, world: Point3<i32>, voxel: Voxel) {
        let index = self.index(self.local(world));
        self.voxels[index] = voxel;
        self.occupancy.set(index, !voxel.is_air());
    }

    /// `true` if every voxel is air.
    pub fn is_empty(&self) -> bool {
        self.occupancy.not_any()
    }

    /// Number of non-air voxels.
    pub fn solid_count(&self) -> usize {
        self.occupancy.count_ones()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Raw voxel bytes, for persistence collaborators.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.voxels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::voxel::voxel_type::VoxelType;

    #[test]
    fn new_chunk_is_empty_and_clean() {
        let chunk = Chunk::new(ChunkCoordinate::new(0, 0, 0), 8);
        assert!(chunk.is_empty());
        assert!(!chunk.is_dirty());
        assert_eq!(chunk.as_bytes().len(), Chunk::byte_size(8));
    }

    #[test]
    fn set_voxel_uses_world_positions() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(-1, 0, 2), 8);
        let pos = Point3::new(-3, 5, 17);
        chunk.set_voxel(pos, Voxel::from(VoxelType::Rock));

        assert_eq!(chunk.get_voxel(pos).material(), VoxelType::Rock);
        assert_eq!(chunk.solid_count(), 1);
        assert!(chunk.is_dirty());

        chunk.set_voxel(pos, Voxel::air());
        assert!(chunk.is_empty());
    }

    #[test]
    fn fill_with_visits_every_voxel_without_dirtying() {
        let mut chunk = Chunk::new(ChunkCoordinate::new(0, 1, 0), 4);
        let mut visited = 0;
        chunk.fill_with(|pos| {
            visited += 1;
            if pos.y == 4 {
                Voxel::from(VoxelType::Dirt)
            } else {
                Voxel::air()
            }
        });
        assert_eq!(visited, 64);
        assert_eq!(chunk.solid_count(), 16);
        assert!(!chunk.is_dirty());
        assert_eq!(chunk.origin(), Point3::new(0, 4, 0));
    }
}
