//! # Cubic Surface Extraction
//!
//! Blocky meshing: every voxel face that separates a voxel from a neighbour the quad
//! predicate accepts becomes one quad. Faces on the region border are culled against
//! the voxels just outside the region, so adjacent tiles line up without seams.

use cgmath::Point3;

use crate::engine_state::voxels::{
    coords::Region,
    paged_volume::PagedVolume,
    voxel::{voxel_side::VoxelSide, Voxel},
};

use super::{face::Face, mesh::Mesh, RegionMesher};

/// Decides whether the face between `back` and its neighbour `front` is visible.
pub trait QuadPredicate: Send + Sync {
    fn is_quad_needed(&self, back: Voxel, front: Voxel) -> bool;
}

/// Opaque material faces that border air, water or anything else see-through.
#[derive(Debug, Default, Clone, Copy)]
pub struct IsQuadNeeded;

impl QuadPredicate for IsQuadNeeded {
    fn is_quad_needed(&self, back: Voxel, front: Voxel) -> bool {
        back.material().is_opaque() && !front.material().is_opaque()
    }
}

/// Water faces that border air.
#[derive(Debug, Default, Clone, Copy)]
pub struct IsWaterQuadNeeded;

impl QuadPredicate for IsWaterQuadNeeded {
    fn is_quad_needed(&self, back: Voxel, front: Voxel) -> bool {
        back.material().is_water() && front.material().is_air()
    }
}

/// One quad per visible voxel face, no merging.
#[derive(Debug, Default, Clone, Copy)]
pub struct CubicMesher;

impl RegionMesher for CubicMesher {
    fn extract(
        &self,
        volume: &PagedVolume,
        region: &Region,
        predicate: &dyn QuadPredicate,
        mesh: &mut Mesh,
    ) {
        mesh.set_offset(region.mins);
        let mut centre = volume.sampler();
        let mut neighbours = volume.sampler();

        for pos in region.positions() {
            let voxel = centre.get_voxel(pos);
            if voxel.is_air() {
                continue;
            }
            let relative = pos - region.mins;
            let local = Point3::new(relative.x, relative.y, relative.z);
            for side in VoxelSide::all() {
                let front = neighbours.get_voxel(pos + side.normal());
                if predicate.is_quad_needed(voxel, front) {
                    mesh.add_face(&Face::new(local, voxel, side));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{
        chunk::Chunk,
        pager::{EmptyPager, FlatPager},
        voxel::voxel_type::VoxelType,
    };

    fn volume(pager: impl crate::engine_state::voxels::pager::Pager + 'static) -> PagedVolume {
        PagedVolume::new(Box::new(pager), 64 * Chunk::byte_size(8), 8)
    }

    #[test]
    fn single_voxel_has_six_faces() {
        let volume = volume(EmptyPager);
        volume.set_voxel(Point3::new(3, 3, 3), Voxel::from(VoxelType::Rock));
        let region = Region::new(Point3::new(0, 0, 0), Point3::new(7, 7, 7));

        let mut mesh = Mesh::new(Point3::new(0, 0, 0));
        CubicMesher.extract(&volume, &region, &IsQuadNeeded, &mut mesh);
        assert_eq!(mesh.num_faces(), 6);
        assert_eq!(mesh.indices.len(), 36);

        let mut water = Mesh::new(Point3::new(0, 0, 0));
        CubicMesher.extract(&volume, &region, &IsWaterQuadNeeded, &mut water);
        assert!(water.is_empty());
    }

    #[test]
    fn flat_ground_only_shows_its_top() {
        let volume = volume(FlatPager::new(0, VoxelType::Grass));
        // The region sits inside the infinite plane, and y = -1 is air below the ground.
        let region = Region::new(Point3::new(8, 0, 8), Point3::new(11, 3, 11));
        let mut mesh = Mesh::new(Point3::new(0, 0, 0));
        CubicMesher.extract(&volume, &region, &IsQuadNeeded, &mut mesh);

        let tops = mesh
            .vertices
            .chunks(4)
            .filter(|quad| quad[0].side == VoxelSide::Top as u32)
            .count();
        let bottoms = mesh
            .vertices
            .chunks(4)
            .filter(|quad| quad[0].side == VoxelSide::Bottom as u32)
            .count();
        assert_eq!(tops, 16);
        assert_eq!(bottoms, 16);
        assert_eq!(mesh.num_faces(), 32);
        assert_eq!(mesh.offset(), Point3::new(8, 0, 8));
        assert!(mesh.vertices.iter().all(|v| (0..=4).contains(&v.x) && (0..=4).contains(&v.z)));
    }

    #[test]
    fn water_surface_is_meshed_separately() {
        let volume = volume(EmptyPager);
        for x in 0..2 {
            volume.set_voxel(Point3::new(x, 0, 0), Voxel::from(VoxelType::Water));
        }
        volume.set_voxel(Point3::new(0, 1, 0), Voxel::from(VoxelType::Rock));
        let region = Region::new(Point3::new(0, 0, 0), Point3::new(3, 3, 3));

        let mut water = Mesh::new(Point3::new(0, 0, 0));
        CubicMesher.extract(&volume, &region, &IsWaterQuadNeeded, &mut water);
        // Twelve water faces, minus the shared pair and the one under the rock.
        assert_eq!(water.num_faces(), 9);

        let mut opaque = Mesh::new(Point3::new(0, 0, 0));
        CubicMesher.extract(&volume, &region, &IsQuadNeeded, &mut opaque);
        assert_eq!(opaque.num_faces(), 6);
    }
}
