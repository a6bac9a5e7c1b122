#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! Streams meshes of an effectively infinite voxel world to a renderer or simulation
//! loop, and answers spatial queries against it.
//!
//! ## Key Modules
//!
//! * `core` - Shared-resource primitives used throughout the crate
//! * `voxels` - Voxel storage, paging, the [`World`] coordinator and spatial queries
//! * `meshing` - Surface extraction from volume regions
//! * `task_management` - The worker pool that runs extraction in the background
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Point3;
//! use voxel_world::{voxels::pager::FlatPager, voxels::voxel::voxel_type::VoxelType, World, WorldConfig};
//!
//! let config = WorldConfig { mesh_size: 16, chunk_side_length: 16, max_height: 32, ..WorldConfig::default() };
//! let mut world = World::new(config, Box::new(FlatPager::new(2, VoxelType::Rock))).unwrap();
//! world.schedule_extraction(Point3::new(0, 0, 0));
//!
//! // Once per frame:
//! world.on_tick();
//! while let Some(meshes) = world.pop() {
//!     let _ = meshes.translation();
//! }
//! ```
//!
//! ## Performance Considerations
//!
//! * Chunk-based voxel storage with a fixed memory budget
//! * Extraction runs on a worker pool; the owning thread never blocks on it
//! * Duplicate requests for the same tile are rejected before any work is queued

use std::{
    env,
    thread,
    time::{Duration, Instant},
};

use cgmath::Point3;
use log::{error, info};

pub mod config;
pub mod core;
pub mod error;
mod engine_state;

pub use config::WorldConfig;
pub use engine_state::{meshing, task_management, voxels};
pub use error::{PathError, WorldError};
pub use voxels::world::{World, WorldStats};

use voxels::pager::PerlinPager;

/// Ticks the demo runs for.
const DEMO_TICKS: u32 = 120;
/// Tiles scheduled in each direction around the viewer.
const VIEW_DISTANCE: i32 = 2;
/// Tick at which the demo resets the world once.
const DEMO_RESET_TICK: u32 = 60;
const TICK: Duration = Duration::from_millis(16);

/// Runs the headless demo: a viewer walks across a generated world while meshes are
/// streamed in around it.
///
/// The first command line argument, if present, is the path of a JSON [`WorldConfig`].
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    if let Err(error) = run_demo(env::args().nth(1)) {
        error!("{}", error);
        std::process::exit(1);
    }
}

fn run_demo(config_path: Option<String>) -> Result<(), WorldError> {
    let config = match config_path {
        Some(path) => WorldConfig::from_file(path)?,
        None => WorldConfig::default(),
    };
    let pager = PerlinPager::new(config.max_height, config.seed);
    let mut world = World::new(config, Box::new(pager))?;
    if !world.is_created() {
        world.set_seed(fastrand::u64(1..));
    }

    let started = Instant::now();
    let mut viewer = Point3::new(0, 0, 0);
    let mut delivered = 0usize;
    let mut faces = 0usize;

    for tick in 0..DEMO_TICKS {
        viewer.x += 4;
        let mesh_size = world.mesh_size();
        for dx in -VIEW_DISTANCE..=VIEW_DISTANCE {
            for dz in -VIEW_DISTANCE..=VIEW_DISTANCE {
                world.schedule_extraction(viewer + cgmath::Vector3::new(dx, 0, dz) * mesh_size);
            }
        }

        world.on_tick();
        while let Some(meshes) = world.pop() {
            delivered += 1;
            faces += meshes.opaque.num_faces() + meshes.water.num_faces();
        }

        if tick == DEMO_RESET_TICK {
            world.reset();
        }
        thread::sleep(TICK);
    }

    let stats = world.stats();
    info!(
        "{} mesh sets ({} faces) delivered in {:?}; {} tiles extracted, {} pending",
        delivered,
        faces,
        started.elapsed(),
        stats.extracted,
        stats.pending
    );

    if let (Some(from), Some(to)) = (world.random_pos(), world.random_pos()) {
        let from = from + cgmath::Vector3::unit_y();
        let to = to + cgmath::Vector3::unit_y();
        match world.find_path(from, to) {
            Ok(path) => info!("path from {:?} to {:?}: {} steps", from, to, path.len()),
            Err(error) => info!("no path from {:?} to {:?}: {}", from, to, error),
        }
    }

    world.shutdown();
    Ok(())
}
