//! # Pager Module
//!
//! Pagers fill chunks when the [`PagedVolume`](super::paged_volume::PagedVolume) pages
//! them in and are told when a chunk leaves memory. Terrain synthesis lives behind this
//! trait; the pagers here are deliberately small: an empty world, a flat world for
//! tests and tools, and a Perlin heightmap for the demo.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use cgmath::Point3;
use noise::{NoiseFn, Perlin};

use super::{
    chunk::Chunk,
    voxel::{voxel_type::VoxelType, Voxel},
};

/// Controls which optional data a pager generates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct WorldGenFlags(u8);

impl WorldGenFlags {
    /// Gameplay-relevant data only.
    pub const SERVER: WorldGenFlags = WorldGenFlags(0);
    /// Additionally generate data that only matters for rendering.
    pub const CLIENT: WorldGenFlags = WorldGenFlags(1);

    pub fn contains(self, other: WorldGenFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn from_bits(bits: u8) -> Self {
        WorldGenFlags(bits)
    }
}

/// Supplies chunk contents on demand.
///
/// Pagers are shared by every thread that samples the volume, so configuration setters
/// take `&self`.
pub trait Pager: Send + Sync {
    /// Fills a freshly allocated all-air chunk.
    fn page_in(&self, chunk: &mut Chunk);

    /// Called when a chunk leaves memory.
    fn page_out(&self, _chunk: &Chunk) {}

    fn set_create_flags(&self, _flags: WorldGenFlags) {}

    fn set_seed(&self, _seed: u64) {}
}

/// Every chunk stays air.
#[derive(Debug, Default)]
pub struct EmptyPager;

impl Pager for EmptyPager {
    fn page_in(&self, _chunk: &mut Chunk) {}
}

/// Fills every voxel at or below `ground_height` (and at or above zero) with one material.
#[derive(Debug)]
pub struct FlatPager {
    pub ground_height: i32,
    pub material: VoxelType,
}

impl FlatPager {
    pub fn new(ground_height: i32, material: VoxelType) -> Self {
        FlatPager {
            ground_height,
            material,
        }
    }
}

impl Pager for FlatPager {
    fn page_in(&self, chunk: &mut Chunk) {
        let origin = chunk.origin();
        if origin.y > self.ground_height || origin.y + chunk.side_length() <= 0 {
            return;
        }
        let solid = Voxel::from(self.material);
        chunk.fill_with(|pos| {
            if (0..=self.ground_height).contains(&pos.y) {
                solid
            } else {
                Voxel::air()
            }
        });
    }
}

/// Scale applied to world coordinates before sampling the terrain noise.
pub const PERLIN_SCALE_FACTOR: f64 = 0.01;
/// Scale applied to world coordinates before sampling the cloud noise.
pub const CLOUD_SCALE_FACTOR: f64 = 0.03;
/// Noise value above which a cloud voxel is placed.
pub const CLOUD_THRESHOLD: f64 = 0.35;

/// Perlin heightmap terrain with water below sea level.
///
/// With [`WorldGenFlags::CLIENT`] a band of clouds is added below `max_height`.
#[derive(Debug)]
pub struct PerlinPager {
    max_height: i32,
    sea_level: i32,
    seed: AtomicU64,
    flags: AtomicU8,
}

impl PerlinPager {
    pub fn new(max_height: i32, seed: u64) -> Self {
        PerlinPager {
            max_height,
            sea_level: max_height / 4,
            seed: AtomicU64::new(seed),
            flags: AtomicU8::new(WorldGenFlags::SERVER.bits()),
        }
    }

    fn terrain_height(&self, perlin: &Perlin, x: i32, z: i32) -> i32 {
        let sample = perlin.get([
            x as f64 * PERLIN_SCALE_FACTOR,
            z as f64 * PERLIN_SCALE_FACTOR,
        ]);
        let base = self.max_height as f64 * 0.3;
        let amplitude = self.max_height as f64 * 0.15;
        (base + sample * amplitude) as i32
    }

    fn is_cloud(&self, perlin: &Perlin, pos: Point3<i32>) -> bool {
        let cloud_floor = self.max_height - self.max_height / 8;
        if pos.y < cloud_floor || pos.y >= self.max_height - 1 {
            return false;
        }
        perlin.get([
            pos.x as f64 * CLOUD_SCALE_FACTOR,
            pos.y as f64 * CLOUD_SCALE_FACTOR,
            pos.z as f64 * CLOUD_SCALE_FACTOR,
        ]) > CLOUD_THRESHOLD
    }
}

impl Pager for PerlinPager {
    fn page_in(&self, chunk: &mut Chunk) {
        let origin = chunk.origin();
        if origin.y >= self.max_height || origin.y + chunk.side_length() <= 0 {
            return;
        }
        let perlin = Perlin::new(self.seed.load(Ordering::Relaxed) as u32);
        let clouds = WorldGenFlags::from_bits(self.flags.load(Ordering::Relaxed))
            .contains(WorldGenFlags::CLIENT);

        chunk.fill_with(|pos| {
            if pos.y < 0 || pos.y >= self.max_height {
                return Voxel::air();
            }
            let height = self.terrain_height(&perlin, pos.x, pos.z);
            if pos.y < height - 3 {
                Voxel::from(VoxelType::Rock)
            } else if pos.y < height {
                Voxel::from(VoxelType::Dirt)
            } else if pos.y == height {
                if height <= self.sea_level {
                    Voxel::from(VoxelType::Sand)
                } else {
                    Voxel::from(VoxelType::Grass)
                }
            } else if pos.y <= self.sea_level {
                Voxel::from(VoxelType::Water)
            } else if clouds && self.is_cloud(&perlin, pos) {
                Voxel::from(VoxelType::Cloud)
            } else {
                Voxel::air()
            }
        });
    }

    fn set_create_flags(&self, flags: WorldGenFlags) {
        self.flags.store(flags.bits(), Ordering::Relaxed);
    }

    fn set_seed(&self, seed: u64) {
        self.seed.store(seed, Ordering::Relaxed);
    }
}
