//! # Meshing
//!
//! Turns regions of the paged volume into renderable triangle meshes.
//!
//! * [`RegionMesher`]: the extraction contract the world's workers call
//! * [`CubicMesher`]: blocky one-quad-per-face implementation
//! * [`QuadPredicate`]: selects which material class a pass extracts
//!   ([`IsQuadNeeded`] for opaque materials, [`IsWaterQuadNeeded`] for water)
//!
//! ```no_run
//! use cgmath::Point3;
//! use voxel_world::meshing::{CubicMesher, IsQuadNeeded, Mesh, RegionMesher};
//! # fn demo(volume: &voxel_world::voxels::paged_volume::PagedVolume, region: voxel_world::voxels::coords::Region) {
//! let mut mesh = Mesh::new(Point3::new(0, 0, 0));
//! CubicMesher.extract(volume, &region, &IsQuadNeeded, &mut mesh);
//! # }
//! ```

mod cubic;
mod face;
mod mesh;

pub use cubic::{CubicMesher, IsQuadNeeded, IsWaterQuadNeeded, QuadPredicate};
pub use face::Face;
pub use mesh::{ExtractedMeshSet, Mesh, Vertex};

use crate::engine_state::voxels::{coords::Region, paged_volume::PagedVolume};

/// Extracts the surface of `region` into `mesh`.
///
/// Implementations must be pure with respect to the volume: they only read voxels and
/// append to the mesh, so the same mesher can run on every worker at once.
pub trait RegionMesher: Send + Sync {
    fn extract(
        &self,
        volume: &PagedVolume,
        region: &Region,
        predicate: &dyn QuadPredicate,
        mesh: &mut Mesh,
    );
}
