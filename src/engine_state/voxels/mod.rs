//! # Voxel World Core
//!
//! Everything needed to store a voxel world, keep its meshes up to date and query it.
//!
//! ## Architecture
//!
//! * **Voxel**: material and colour of a single cell, plus material predicates
//! * **Chunk**: fixed-size cube of voxels, the unit of paging
//! * **PagedVolume**: memory-bounded, effectively infinite store of chunks fed by a
//!   [`Pager`](pager::Pager)
//! * **World**: schedules mesh extraction over the volume and answers raycast, floor
//!   and path queries
//! * **Tasks**: the background work the world hands to its worker pool
//!
//! ## Data Flow
//!
//! 1. The owner asks the world to extract the tile around a position
//! 2. The dedup set makes sure each tile is in flight at most once
//! 3. A worker samples the volume, paging chunks in as needed, and meshes the tile
//! 4. The meshes arrive in the delivery queue and are popped by the owner
//!
//! ## Thread Safety
//!
//! * The volume is shared by the owner and all workers; chunk data sits behind
//!   per-chunk read-write locks
//! * Scheduling state (dedup set, outstanding handles) belongs to the owning thread
//! * Workers and the owner share nothing else but the delivery queue and the
//!   cancellation flag

pub mod chunk;
pub mod coords;
pub mod dedup;
pub mod delivery_queue;
pub mod paged_volume;
pub mod pager;
pub mod pathfinder;
pub mod raycast;
pub mod tasks;
pub mod voxel;
pub mod world;
