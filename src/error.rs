//! Error types surfaced by world initialization and configuration loading.
//!
//! Scheduling conflicts, empty delivery queues and missing floors are ordinary outcomes
//! and are reported through `bool`/`Option` by the coordinator, not through these types.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures that prevent a [`World`](crate::World) from being created.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error(
        "invalid mesh size {size}: mesh tiles must be 1 to {} voxels wide",
        crate::config::MAX_MESH_SIZE
    )]
    InvalidMeshSize { size: i32 },

    #[error("invalid chunk side length {length}: chunks must be at least one voxel wide")]
    InvalidChunkSideLength { length: u16 },

    #[error(
        "volume memory budget of {megabytes} MiB cannot hold a single chunk of {chunk_bytes} bytes"
    )]
    MemoryBudgetTooSmall { megabytes: u32, chunk_bytes: usize },

    #[error("invalid world height {height}: must be positive")]
    InvalidMaxHeight { height: i32 },

    #[error("the extraction pool needs at least one worker thread")]
    NoWorkerThreads,

    #[error("path iteration cap must be positive")]
    InvalidIterationCap,

    #[error("failed to spawn extraction worker: {0}")]
    WorkerSpawn(#[source] io::Error),

    #[error("failed to read world config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse world config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Why a path query produced no path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("the start position is blocked")]
    StartBlocked,

    #[error("the end position is blocked")]
    EndBlocked,

    #[error("gave up after {cap} expansions")]
    IterationCapExceeded { cap: usize },

    #[error("the end position is unreachable")]
    NoPath,
}
