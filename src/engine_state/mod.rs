//! # Engine State Module
//!
//! The subsystems behind the voxel world.
//!
//! ## Key Components
//!
//! * `task_management` - Fixed pool of worker threads running background tasks
//! * `voxels` - Voxel storage, paging, the world coordinator and spatial queries
//! * `meshing` - Surface extraction from volume regions
//!
//! ## Performance Considerations
//!
//! * Extraction runs on worker threads so the owning thread never waits on meshing
//! * The volume keeps a bounded number of chunks resident and evicts the least
//!   recently used ones
//! * Region sweeps go through a sampler that caches the current chunk

pub mod meshing;
pub mod task_management;
pub mod voxels;
