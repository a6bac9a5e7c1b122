//! # World Module
//!
//! This module provides the `World` struct, which coordinates background mesh extraction
//! over a paged voxel volume and answers spatial queries against it.
//!
//! ## Architecture
//!
//! The world is owned by one thread (typically a frame or tick loop). That thread
//! schedules extractions, drains finished meshes and drives resets; a fixed pool of
//! workers does the extraction itself:
//!
//! 1. `schedule_extraction` snaps a position to its mesh tile and checks the dedup set
//! 2. A [`MeshExtractionTask`] for the tile's full-height region goes to the pool
//! 3. The worker meshes the region twice (opaque, water) and pushes the pair
//! 4. The owner calls `pop` once per tick to collect finished meshes
//!
//! A tile stays in the dedup set from scheduling until the owner calls
//! `allow_re_extraction` or a reset completes, so it is extracted at most once in that
//! window. Editing voxels does not invalidate anything on its own.
//!
//! ## Reset
//!
//! `reset` only raises the cancellation flag. Workers observe it at their checkpoints
//! and abandon; `on_tick` notices once no extraction is outstanding, flushes the volume,
//! clears the dedup set and the delivery queue and lowers the flag again. While the flag
//! is up every `schedule_extraction` call is refused.
//!
//! ## Queries
//!
//! Raycasts, floor searches and path queries read the volume directly and need no
//! extraction state. They run synchronously on the calling thread.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use cgmath::{Point3, Vector3};
use log::{debug, info, trace};

use crate::{
    config::{WorldConfig, MAX_MESH_SIZE},
    core::MtResource,
    engine_state::{
        meshing::{CubicMesher, ExtractedMeshSet, RegionMesher},
        task_management::{TaskHandle, WorkerPool},
    },
    error::{PathError, WorldError},
};

use super::{
    chunk::Chunk,
    coords::{ChunkCoordinate, MeshTileCoordinate},
    dedup::ExtractionDedupSet,
    delivery_queue::DeliveryQueue,
    paged_volume::PagedVolume,
    pager::{Pager, WorldGenFlags},
    pathfinder::AStarPathfinder,
    raycast::{self, PickResult},
    tasks::mesh_extraction_task::MeshExtractionTask,
    voxel::{voxel_type::VoxelType, Voxel},
};

/// Half-extent of the area `random_pos` samples from before any tile is extracted.
const RANDOM_POS_MIN_EXTENT: i32 = 100;

/// A snapshot of the world's extraction bookkeeping.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Tiles in the dedup set: scheduled or delivered, not yet released.
    pub extracted: usize,
    /// Extraction tasks that have not finished yet.
    pub pending: usize,
    /// Mesh sets waiting to be popped.
    pub meshes: usize,
}

/// Coordinates mesh extraction and answers queries over a paged voxel volume.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_world::{voxels::pager::FlatPager, voxels::voxel::voxel_type::VoxelType, World, WorldConfig};
///
/// let config = WorldConfig {
///     mesh_size: 16,
///     chunk_side_length: 16,
///     max_height: 32,
///     worker_threads: 2,
///     ..WorldConfig::default()
/// };
/// let mut world = World::new(config, Box::new(FlatPager::new(4, VoxelType::Grass))).unwrap();
///
/// assert!(world.schedule_extraction(Point3::new(3, 0, 3)));
/// // Same tile, already covered.
/// assert!(!world.schedule_extraction(Point3::new(9, 20, 9)));
///
/// assert_eq!(world.find_floor(0, 0, VoxelType::is_floor), Some(4));
/// world.shutdown();
/// ```
pub struct World {
    config: WorldConfig,
    volume: Arc<PagedVolume>,
    mesher: Arc<dyn RegionMesher>,
    pool: WorkerPool,
    dedup: ExtractionDedupSet,
    meshes: DeliveryQueue<ExtractedMeshSet>,
    /// Handles of extractions that may still be running.
    pending: Vec<TaskHandle>,
    cancel: Arc<AtomicBool>,
    rng: fastrand::Rng,
    shut_down: bool,
}

impl World {
    /// Creates a world over a new paged volume filled by `pager`.
    ///
    /// # Arguments
    /// * `config` - World parameters, validated before anything is allocated
    /// * `pager` - Supplies the contents of chunks as they are first accessed
    ///
    /// # Returns
    /// The world with its worker pool running, or why it could not be created
    pub fn new(config: WorldConfig, pager: Box<dyn Pager>) -> Result<Self, WorldError> {
        config.validate()?;

        let volume = PagedVolume::new(
            pager,
            config.volume_memory_bytes(),
            config.chunk_side_length,
        );
        volume.set_persist(config.persist);
        volume.set_create_flags(Self::create_flags(config.client_data));
        volume.set_seed(config.seed);

        let pool =
            WorkerPool::new(config.worker_threads, "world").map_err(WorldError::WorkerSpawn)?;

        info!(
            "world created: {}² mesh tiles, {}³ chunks, height {}, {} workers, seed {}",
            config.mesh_size,
            config.chunk_side_length,
            config.max_height,
            config.worker_threads,
            config.seed
        );

        Ok(World {
            rng: fastrand::Rng::with_seed(config.seed),
            config,
            volume: Arc::new(volume),
            mesher: Arc::new(CubicMesher),
            pool,
            dedup: ExtractionDedupSet::new(),
            meshes: DeliveryQueue::new(),
            pending: Vec::new(),
            cancel: Arc::new(AtomicBool::new(false)),
            shut_down: false,
        })
    }

    /// Replaces the extraction algorithm used for tiles scheduled from now on.
    pub fn with_mesher(mut self, mesher: Arc<dyn RegionMesher>) -> Self {
        self.mesher = mesher;
        self
    }

    fn create_flags(client_data: bool) -> WorldGenFlags {
        if client_data {
            WorldGenFlags::CLIENT
        } else {
            WorldGenFlags::SERVER
        }
    }

    /// Queues the mesh tile containing `pos` for extraction.
    ///
    /// # Returns
    /// `true` if a task was submitted; `false` if a reset is in progress, the world
    /// has been shut down, or the tile is already scheduled or delivered
    pub fn schedule_extraction(&mut self, pos: Point3<i32>) -> bool {
        if self.shut_down || self.is_reset() {
            trace!("refusing extraction for {:?}: world is resetting", pos);
            return false;
        }
        let tile = self.mesh_pos(pos);
        if !self.dedup.try_insert(tile) {
            trace!("mesh is already extracted for {:?} ({:?})", pos, tile.0);
            return false;
        }
        trace!("mesh extraction for {:?} ({:?})", pos, tile.0);

        let region = tile.region(self.config.mesh_size, self.config.max_height);
        let handle = self.pool.publish_task(Box::new(MeshExtractionTask::new(
            self.volume.clone(),
            self.mesher.clone(),
            region,
            self.cancel.clone(),
            self.meshes.sender(),
        )));
        self.pending.push(handle);
        true
    }

    /// Takes one finished mesh set, if any has been delivered.
    pub fn pop(&mut self) -> Option<ExtractedMeshSet> {
        self.meshes.pop()
    }

    /// Releases the tile containing `pos` so it can be scheduled again.
    ///
    /// An extraction of the tile that is still running is not cancelled and will still
    /// deliver its result.
    ///
    /// # Returns
    /// `true` if the tile was scheduled or delivered before this call
    pub fn allow_re_extraction(&mut self, pos: Point3<i32>) -> bool {
        let tile = self.mesh_pos(pos);
        self.dedup.erase(&tile)
    }

    /// Starts a reset. Outstanding extractions are abandoned and the world is emptied
    /// on the first `on_tick` after they have drained.
    pub fn reset(&mut self) {
        if !self.cancel.swap(true, Ordering::AcqRel) {
            info!("resetting the world, {} extractions outstanding", self.pending.len());
        }
    }

    /// Whether a reset is in progress.
    pub fn is_reset(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// Forgets finished extractions and completes a pending reset once none are left.
    ///
    /// Call once per frame or tick from the owning thread. Never blocks.
    pub fn on_tick(&mut self) {
        self.pending.retain(|handle| !handle.is_finished());
        if !self.is_reset() || !self.pending.is_empty() {
            return;
        }

        self.volume.flush_all();
        self.dedup.clear();
        let dropped = self.meshes.clear();
        self.cancel.store(false, Ordering::Release);
        info!("reset the world, dropped {} undelivered meshes", dropped);
    }

    pub fn stats(&self) -> WorldStats {
        WorldStats {
            extracted: self.dedup.len(),
            pending: self
                .pending
                .iter()
                .filter(|handle| !handle.is_finished())
                .count(),
            meshes: self.meshes.len(),
        }
    }

    /// Cancels all outstanding work, waits for the workers to exit and flushes the
    /// volume. The world refuses new extractions afterwards.
    ///
    /// Called automatically on drop.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.cancel.store(true, Ordering::Release);
        self.pool.shutdown();
        self.pending.clear();
        self.dedup.clear();
        self.meshes.clear();
        self.volume.flush_all();
        self.cancel.store(false, Ordering::Release);
        self.shut_down = true;

        let stats = self.pool.stats();
        info!(
            "world shut down: {} extractions completed, {} abandoned, {} panicked",
            stats.completed, stats.abandoned, stats.panicked
        );
    }

    /// Walks a ray of length `max_distance` from `origin` along `direction`, calling
    /// `visitor` with every voxel it passes through until the visitor returns `false`.
    ///
    /// # Returns
    /// `true` if the visitor stopped the ray (a hit), `false` if the ray ran its full
    /// length
    pub fn raycast<F>(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
        visitor: F,
    ) -> bool
    where
        F: FnMut(Point3<i32>, Voxel) -> bool,
    {
        raycast::raycast_with_direction(&self.volume, origin, direction, max_distance, visitor)
            .is_hit()
    }

    /// The first blocking voxel along the ray, with its position.
    pub fn raycast_hit(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<(Point3<i32>, Voxel)> {
        let mut hit = None;
        self.raycast(origin, direction, max_distance, |pos, voxel| {
            if voxel.material().is_blocked() {
                hit = Some((pos, voxel));
                return false;
            }
            true
        });
        hit
    }

    /// Finds the first voxel along `direction_and_length` that differs from `empty`,
    /// plus the voxel in front of it.
    pub fn pick_voxel(
        &self,
        origin: Point3<f32>,
        direction_and_length: Vector3<f32>,
        empty: Voxel,
    ) -> PickResult {
        raycast::pick_voxel(&self.volume, origin, direction_and_length, empty)
    }

    /// Searches the column at (`x`, `z`) from the top of the world down.
    ///
    /// # Returns
    /// The height of the highest voxel whose material satisfies `predicate`, or `None`
    /// if no voxel in `[0, max_height)` does
    pub fn find_floor<P>(&self, x: i32, z: i32, predicate: P) -> Option<i32>
    where
        P: Fn(VoxelType) -> bool,
    {
        // A vertical ray never leaves its column, so walk it on integers.
        let mut sampler = self.volume.sampler();
        (0..self.config.max_height)
            .rev()
            .find(|&y| predicate(sampler.get_voxel(Point3::new(x, y, z)).material()))
    }

    /// Finds a walkable route from `start` to `end` through non-blocking voxels.
    ///
    /// Runs to completion on the calling thread; the configured iteration cap bounds
    /// how long that takes.
    pub fn find_path(
        &self,
        start: Point3<i32>,
        end: Point3<i32>,
    ) -> Result<Vec<Point3<i32>>, PathError> {
        let max_height = self.config.max_height;
        let volume = &self.volume;
        let pathfinder = AStarPathfinder::new(
            |pos: Point3<i32>| {
                !(0..max_height).contains(&pos.y) || volume.get_voxel(pos).material().is_blocked()
            },
            self.config.path_iteration_cap,
        );
        let result = pathfinder.find_path(start, end);
        if let Err(error) = &result {
            debug!("no path from {:?} to {:?}: {}", start, end, error);
        }
        result
    }

    /// Writes a voxel. The affected tile is not re-extracted automatically; call
    /// [`allow_re_extraction`](Self::allow_re_extraction) and schedule it again.
    ///
    /// # Returns
    /// `false` if `pos` lies outside the world's height
    pub fn set_voxel(&self, pos: Point3<i32>, voxel: Voxel) -> bool {
        if !(0..self.config.max_height).contains(&pos.y) {
            return false;
        }
        self.volume.set_voxel(pos, voxel);
        true
    }

    pub fn get_voxel(&self, pos: Point3<i32>) -> Voxel {
        self.volume.get_voxel(pos)
    }

    pub fn get_material(&self, pos: Point3<i32>) -> VoxelType {
        self.volume.get_voxel(pos).material()
    }

    /// The chunk containing `pos`, paged in if necessary.
    pub fn get_chunk(&self, pos: Point3<i32>) -> MtResource<Chunk> {
        self.volume.get_chunk(self.chunk_pos(pos))
    }

    pub fn chunk_pos(&self, pos: Point3<i32>) -> ChunkCoordinate {
        self.volume.chunk_coordinate(pos)
    }

    pub fn mesh_pos(&self, pos: Point3<i32>) -> MeshTileCoordinate {
        MeshTileCoordinate::from_world(pos, self.config.mesh_size)
    }

    pub fn mesh_size(&self) -> i32 {
        self.config.mesh_size
    }

    /// Changes the mesh tile size for tiles scheduled from now on.
    ///
    /// Tiles already in the dedup set keep their old coordinates; reset the world after
    /// changing the size to start from a consistent state.
    pub fn set_mesh_size(&mut self, mesh_size: i32) -> Result<(), WorldError> {
        if !(1..=MAX_MESH_SIZE).contains(&mesh_size) {
            return Err(WorldError::InvalidMeshSize { size: mesh_size });
        }
        self.config.mesh_size = mesh_size;
        Ok(())
    }

    pub fn chunk_size(&self) -> i32 {
        self.volume.chunk_side_length()
    }

    pub fn max_height(&self) -> i32 {
        self.config.max_height
    }

    pub fn seed(&self) -> u64 {
        self.config.seed
    }

    /// Reseeds generation for chunks paged in from now on.
    pub fn set_seed(&mut self, seed: u64) {
        info!("seed: {}", seed);
        self.config.seed = seed;
        self.rng.seed(seed);
        self.volume.set_seed(seed);
    }

    /// Whether the world has been given a seed.
    pub fn is_created(&self) -> bool {
        self.config.seed != 0
    }

    /// Keep edited chunks when they are paged out.
    pub fn set_persist(&mut self, persist: bool) {
        self.config.persist = persist;
        self.volume.set_persist(persist);
    }

    /// Whether chunks paged in from now on include render-only data.
    pub fn set_client_data(&mut self, client_data: bool) {
        self.config.client_data = client_data;
        self.volume.set_create_flags(Self::create_flags(client_data));
    }

    /// Picks a random standing position inside the bounds of the extracted tiles,
    /// widened to at least ±100 voxels around the origin.
    ///
    /// # Returns
    /// A position on top of a floor voxel, or `None` if the sampled column has no floor
    pub fn random_pos(&mut self) -> Option<Point3<i32>> {
        let (mut lowest_x, mut lowest_z) = (-RANDOM_POS_MIN_EXTENT, -RANDOM_POS_MIN_EXTENT);
        let (mut highest_x, mut highest_z) = (RANDOM_POS_MIN_EXTENT, RANDOM_POS_MIN_EXTENT);
        for tile in self.dedup.iter() {
            lowest_x = lowest_x.min(tile.0.x);
            lowest_z = lowest_z.min(tile.0.z);
            highest_x = highest_x.max(tile.0.x + self.config.mesh_size - 1);
            highest_z = highest_z.max(tile.0.z + self.config.mesh_size - 1);
        }

        let x = self.rng.i32(lowest_x..=highest_x);
        let z = self.rng.i32(lowest_z..=highest_z);
        let y = self.find_floor(x, z, VoxelType::is_floor)?;
        Some(Point3::new(x, y, z))
    }
}

impl Drop for World {
    fn drop(&mut self) {
        self.shutdown();
    }
}
