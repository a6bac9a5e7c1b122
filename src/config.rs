//! # World Configuration
//!
//! Runtime parameters consumed by the world. Every field has a default so partial JSON
//! documents are accepted:
//!
//! ```
//! use voxel_world::WorldConfig;
//!
//! let config = WorldConfig::from_json_str(r#"{ "mesh_size": 32, "client_data": true }"#).unwrap();
//! assert_eq!(config.mesh_size, 32);
//! assert_eq!(config.chunk_side_length, 32);
//! ```

use std::{fs, path::Path, thread};

use serde::{Deserialize, Serialize};

use crate::{engine_state::voxels::chunk::Chunk, error::WorldError};

/// Default side length of a mesh tile in voxels.
pub const DEFAULT_MESH_SIZE: i32 = 64;
/// Largest accepted mesh tile side.
pub const MAX_MESH_SIZE: i32 = 4096;
/// Default side length of a paged chunk in voxels.
pub const DEFAULT_CHUNK_SIDE_LENGTH: u16 = 32;
/// Default memory budget of the paged volume.
pub const DEFAULT_VOLUME_MEMORY_MEGABYTES: u32 = 512;
/// Default height of the world; extraction regions span `[0, MAX_HEIGHT)`.
pub const DEFAULT_MAX_HEIGHT: i32 = 256;
/// Default number of A* expansions before a path query gives up.
pub const DEFAULT_PATH_ITERATION_CAP: usize = 10_000;

/// Parameters for a [`World`](crate::World).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Side length of a mesh tile. May be changed at runtime through
    /// [`World::set_mesh_size`](crate::World::set_mesh_size).
    pub mesh_size: i32,
    /// Side length of a paged chunk.
    pub chunk_side_length: u16,
    /// Memory budget of the paged volume.
    pub volume_memory_megabytes: u32,
    /// World height. Extraction regions always cover the full height.
    pub max_height: i32,
    /// Size of the extraction worker pool.
    pub worker_threads: usize,
    /// Expansion cap for path queries.
    pub path_iteration_cap: usize,
    /// Generate data that is only needed for rendering (clouds and the like).
    pub client_data: bool,
    /// Keep edited chunks when they are paged out.
    pub persist: bool,
    /// World seed. Zero means the world has not been created yet.
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            mesh_size: DEFAULT_MESH_SIZE,
            chunk_side_length: DEFAULT_CHUNK_SIDE_LENGTH,
            volume_memory_megabytes: DEFAULT_VOLUME_MEMORY_MEGABYTES,
            max_height: DEFAULT_MAX_HEIGHT,
            worker_threads: default_worker_threads(),
            path_iteration_cap: DEFAULT_PATH_ITERATION_CAP,
            client_data: false,
            persist: false,
            seed: 0,
        }
    }
}

/// Half of the available cores, leaving the rest for the owning thread and the renderer.
pub fn default_worker_threads() -> usize {
    thread::available_parallelism()
        .map(|n| (n.get() / 2).max(1))
        .unwrap_or(1)
}

impl WorldConfig {
    /// Parses a config from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, WorldError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| WorldError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Memory budget of the paged volume in bytes.
    pub fn volume_memory_bytes(&self) -> usize {
        self.volume_memory_megabytes as usize * 1024 * 1024
    }

    /// Checks that the parameters describe a usable world.
    pub fn validate(&self) -> Result<(), WorldError> {
        if !(1..=MAX_MESH_SIZE).contains(&self.mesh_size) {
            return Err(WorldError::InvalidMeshSize {
                size: self.mesh_size,
            });
        }
        if self.chunk_side_length == 0 {
            return Err(WorldError::InvalidChunkSideLength {
                length: self.chunk_side_length,
            });
        }
        let chunk_bytes = Chunk::byte_size(self.chunk_side_length as i32);
        if self.volume_memory_bytes() < chunk_bytes {
            return Err(WorldError::MemoryBudgetTooSmall {
                megabytes: self.volume_memory_megabytes,
                chunk_bytes,
            });
        }
        if self.max_height <= 0 {
            return Err(WorldError::InvalidMaxHeight {
                height: self.max_height,
            });
        }
        if self.worker_threads == 0 {
            return Err(WorldError::NoWorkerThreads);
        }
        if self.path_iteration_cap == 0 {
            return Err(WorldError::InvalidIterationCap);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = WorldConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.worker_threads >= 1);
        assert_eq!(config.seed, 0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = WorldConfig::from_json_str(r#"{ "max_height": 64, "persist": true }"#).unwrap();
        assert_eq!(config.max_height, 64);
        assert!(config.persist);
        assert_eq!(config.mesh_size, DEFAULT_MESH_SIZE);
        assert_eq!(config.path_iteration_cap, DEFAULT_PATH_ITERATION_CAP);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = WorldConfig::from_json_str("{ mesh_size: ").unwrap_err();
        assert!(matches!(err, WorldError::ConfigParse(_)));
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = WorldConfig::from_file("/definitely/not/here/world.json").unwrap_err();
        match err {
            WorldError::ConfigIo { path, .. } => assert!(path.ends_with("world.json")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rejects_unusable_parameters() {
        let mut config = WorldConfig {
            mesh_size: 0,
            ..WorldConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(WorldError::InvalidMeshSize { size: 0 })
        ));

        config.mesh_size = MAX_MESH_SIZE + 1;
        assert!(matches!(
            config.validate(),
            Err(WorldError::InvalidMeshSize { .. })
        ));

        config.mesh_size = 16;
        config.chunk_side_length = 0;
        assert!(matches!(
            config.validate(),
            Err(WorldError::InvalidChunkSideLength { .. })
        ));

        config.chunk_side_length = 1024;
        config.volume_memory_megabytes = 1;
        assert!(matches!(
            config.validate(),
            Err(WorldError::MemoryBudgetTooSmall { .. })
        ));

        config.chunk_side_length = 16;
        config.max_height = -4;
        assert!(matches!(
            config.validate(),
            Err(WorldError::InvalidMaxHeight { height: -4 })
        ));

        config.max_height = 32;
        config.worker_threads = 0;
        assert!(matches!(config.validate(), Err(WorldError::NoWorkerThreads)));
    }
}
