//! # Voxel World Demo Entry Point
//!
//! Calls into the library's `run()` to stream a generated world around a moving viewer.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json]
//! ```

fn main() {
    voxel_world::run();
}
