//! # Paged Volume Module
//!
//! A bounded-memory, effectively infinite voxel container. Chunks are created on first
//! access by a [`Pager`] and evicted least-recently-used once the memory budget is
//! exhausted.
//!
//! ## Thread Safety
//!
//! The volume is shared by the owning thread, every extraction worker and the query
//! helpers:
//!
//! * the resident set sits behind a single mutex that is only held for map lookups;
//!   pagers run outside of it, so a slow page-in only blocks the thread that needs it
//! * each chunk has its own read-write lock, so concurrent readers never contend
//!
//! A chunk handle obtained before an eviction stays valid. Without persist, edits made
//! through it after the eviction are not seen by later page-ins.
//!
//! With persist on, an evicted chunk moves into the stash while the resident-set lock
//! is still held, and page-ins consult the stash under that same lock. A lookup racing
//! an eviction therefore always finds the edited chunk in one of the two places.

use std::{
    collections::HashMap,
    num::NonZeroUsize,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};

use cgmath::Point3;
use log::{debug, trace};
use lru::LruCache;

use crate::core::MtResource;

use super::{
    chunk::Chunk,
    coords::ChunkCoordinate,
    pager::{Pager, WorldGenFlags},
    voxel::Voxel,
};

pub struct PagedVolume {
    pager: Box<dyn Pager>,
    chunk_side_length: i32,
    chunks: Mutex<LruCache<ChunkCoordinate, MtResource<Chunk>>>,
    /// Chunks evicted while `persist` is set. Clean ones are dropped again once their
    /// page-out has checked them; edited ones stay until paged back in.
    stash: Mutex<HashMap<ChunkCoordinate, MtResource<Chunk>>>,
    persist: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PagedVolume {
    /// Creates a volume that keeps at most `memory_bytes` of voxel data resident.
    ///
    /// The budget always allows at least one resident chunk.
    pub fn new(pager: Box<dyn Pager>, memory_bytes: usize, chunk_side_length: u16) -> Self {
        let chunk_side_length = chunk_side_length.max(1) as i32;
        let capacity = (memory_bytes / Chunk::byte_size(chunk_side_length)).max(1);
        debug!(
            "paged volume: {} byte budget, {}³ chunks, {} resident at most",
            memory_bytes, chunk_side_length, capacity
        );
        PagedVolume {
            pager,
            chunk_side_length,
            chunks: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
            stash: Mutex::new(HashMap::new()),
            persist: AtomicBool::new(false),
        }
    }

    pub fn chunk_side_length(&self) -> i32 {
        self.chunk_side_length
    }

    /// Maximum number of chunks kept in memory.
    pub fn chunk_capacity(&self) -> usize {
        lock(&self.chunks).cap().get()
    }

    /// Number of chunks currently in memory.
    pub fn resident_chunks(&self) -> usize {
        lock(&self.chunks).len()
    }

    pub fn set_persist(&self, persist: bool) {
        self.persist.store(persist, Ordering::Relaxed);
    }

    pub fn set_create_flags(&self, flags: WorldGenFlags) {
        self.pager.set_create_flags(flags);
    }

    pub fn set_seed(&self, seed: u64) {
        self.pager.set_seed(seed);
    }

    /// Whether the chunk at `coordinate` is in memory right now.
    pub fn is_resident(&self, coordinate: ChunkCoordinate) -> bool {
        lock(&self.chunks).contains(&coordinate)
    }

    /// Returns the chunk at `coordinate`, paging it in if necessary.
    pub fn get_chunk(&self, coordinate: ChunkCoordinate) -> MtResource<Chunk> {
        let evicted = {
            let mut chunks = lock(&self.chunks);
            if let Some(chunk) = chunks.get(&coordinate) {
                return chunk.clone();
            }
            let restored = self.restore(&mut chunks, coordinate);
            match restored {
                Some(restored) => restored,
                None => {
                    drop(chunks);
                    return self.generate(coordinate);
                }
            }
        };
        self.finish_eviction(evicted)
    }

    /// Moves a stashed chunk back into the resident set. The caller holds `chunks`.
    fn restore(
        &self,
        chunks: &mut LruCache<ChunkCoordinate, MtResource<Chunk>>,
        coordinate: ChunkCoordinate,
    ) -> Option<(MtResource<Chunk>, Option<(ChunkCoordinate, MtResource<Chunk>)>)> {
        let stashed = lock(&self.stash).remove(&coordinate)?;
        trace!("restoring edited chunk {:?}", coordinate.0);
        let evicted = self.push(chunks, coordinate, stashed.clone());
        Some((stashed, evicted))
    }

    /// Runs the pager outside of any lock, then publishes the result unless another
    /// thread got there first.
    fn generate(&self, coordinate: ChunkCoordinate) -> MtResource<Chunk> {
        let mut chunk = Chunk::new(coordinate, self.chunk_side_length);
        self.pager.page_in(&mut chunk);
        let chunk = MtResource::new(chunk);

        let result = {
            let mut chunks = lock(&self.chunks);
            if let Some(existing) = chunks.get(&coordinate) {
                return existing.clone();
            }
            let restored = self.restore(&mut chunks, coordinate);
            match restored {
                Some(restored) => restored,
                None => {
                    let evicted = self.push(&mut chunks, coordinate, chunk.clone());
                    (chunk, evicted)
                }
            }
        };
        self.finish_eviction(result)
    }

    /// Inserts into the resident set. The caller holds `chunks`.
    ///
    /// With persist on, the evicted chunk is stashed before `chunks` is released, so
    /// there is no moment at which it can be found in neither place.
    fn push(
        &self,
        chunks: &mut LruCache<ChunkCoordinate, MtResource<Chunk>>,
        coordinate: ChunkCoordinate,
        chunk: MtResource<Chunk>,
    ) -> Option<(ChunkCoordinate, MtResource<Chunk>)> {
        let evicted = chunks.push(coordinate, chunk)?;
        if self.persist.load(Ordering::Relaxed) {
            lock(&self.stash).insert(evicted.0, evicted.1.clone());
        }
        Some(evicted)
    }

    fn finish_eviction(
        &self,
        (chunk, evicted): (MtResource<Chunk>, Option<(ChunkCoordinate, MtResource<Chunk>)>),
    ) -> MtResource<Chunk> {
        if let Some((evicted_coordinate, evicted_chunk)) = evicted {
            self.page_out(evicted_coordinate, &evicted_chunk);
        }
        chunk
    }

    /// Hands an evicted chunk to the pager and drops it from the stash unless it was
    /// edited.
    fn page_out(&self, coordinate: ChunkCoordinate, chunk: &MtResource<Chunk>) {
        let data = chunk.get();
        if data.is_dirty() {
            trace!("stashed edited chunk {:?}", coordinate.0);
        } else {
            let mut stash = lock(&self.stash);
            if stash.get(&coordinate).is_some_and(|stashed| stashed.ptr_eq(chunk)) {
                stash.remove(&coordinate);
            }
        }
        self.pager.page_out(&data);
    }

    pub fn chunk_coordinate(&self, pos: Point3<i32>) -> ChunkCoordinate {
        ChunkCoordinate::from_world(pos, self.chunk_side_length)
    }

    pub fn get_voxel(&self, pos: Point3<i32>) -> Voxel {
        self.get_chunk(self.chunk_coordinate(pos)).get().get_voxel(pos)
    }

    pub fn set_voxel(&self, pos: Point3<i32>, voxel: Voxel) {
        self.get_chunk(self.chunk_coordinate(pos))
            .get_mut()
            .set_voxel(pos, voxel);
    }

    /// Pages every resident chunk out, releasing the memory they hold.
    pub fn flush_all(&self) {
        let drained: Vec<_> = {
            let mut chunks = lock(&self.chunks);
            let drained: Vec<_> = std::iter::from_fn(|| chunks.pop_lru()).collect();
            if self.persist.load(Ordering::Relaxed) {
                let mut stash = lock(&self.stash);
                for (coordinate, chunk) in &drained {
                    stash.insert(*coordinate, chunk.clone());
                }
            }
            drained
        };
        debug!("flushing {} resident chunks", drained.len());
        for (coordinate, chunk) in drained {
            self.page_out(coordinate, &chunk);
        }
    }

    /// A sampler that remembers the last chunk it touched.
    pub fn sampler(&self) -> VolumeSampler<'_> {
        VolumeSampler {
            volume: self,
            current: None,
        }
    }
}

/// Sequential voxel reader for sweeps that stay inside one chunk for long stretches.
///
/// Skips the resident-set lookup while consecutive reads hit the same chunk.
pub struct VolumeSampler<'a> {
    volume: &'a PagedVolume,
    current: Option<(ChunkCoordinate, MtResource<Chunk>)>,
}

impl VolumeSampler<'_> {
    pub fn get_voxel(&mut self, pos: Point3<i32>) -> Voxel {
        let coordinate = self.volume.chunk_coordinate(pos);
        match &self.current {
            Some((current, chunk)) if *current == coordinate => chunk.get().get_voxel(pos),
            _ => {
                let chunk = self.volume.get_chunk(coordinate);
                let voxel = chunk.get().get_voxel(pos);
                self.current = Some((coordinate, chunk));
                voxel
            }
        }
    }
}
