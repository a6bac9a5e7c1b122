//! # Voxel Task System
//!
//! Background work the world hands to its worker pool. Tasks only ever read the
//! paged volume and report back through the delivery queue; the scheduling state
//! stays on the owning thread.

pub mod mesh_extraction_task;
