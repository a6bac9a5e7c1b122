use cgmath::Point3;

use crate::engine_state::voxels::voxel::{voxel_side::VoxelSide, Voxel};

/// A single quad on the surface of a voxel.
///
/// A face is defined by its four corners (lower-left, lower-right, upper-left,
/// upper-right) in mesh-local coordinates, wound so that the front of the quad faces
/// away from the voxel it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub ll: Point3<i32>,
    pub lr: Point3<i32>,
    pub ul: Point3<i32>,
    pub ur: Point3<i32>,
    pub voxel: Voxel,
    pub side: VoxelSide,
}

impl Face {
    /// Creates the face `side` of the voxel whose lowest corner is `(i, j, k)`.
    pub fn new(local: Point3<i32>, voxel: Voxel, side: VoxelSide) -> Self {
        let (i, j, k) = (local.x, local.y, local.z);
        let (ll, lr, ul, ur) = match side {
            VoxelSide::Front => (
                Point3::new(i, j, k),
                Point3::new(i, j, k + 1),
                Point3::new(i, j + 1, k),
                Point3::new(i, j + 1, k + 1),
            ),
            VoxelSide::Back => (
                Point3::new(i + 1, j, k + 1),
                Point3::new(i + 1, j, k),
                Point3::new(i + 1, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k),
            ),
            VoxelSide::Bottom => (
                Point3::new(i, j, k + 1),
                Point3::new(i, j, k),
                Point3::new(i + 1, j, k + 1),
                Point3::new(i + 1, j, k),
            ),
            VoxelSide::Top => (
                Point3::new(i, j + 1, k),
                Point3::new(i, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k),
                Point3::new(i + 1, j + 1, k + 1),
            ),
            VoxelSide::Left => (
                Point3::new(i + 1, j, k),
                Point3::new(i, j, k),
                Point3::new(i + 1, j + 1, k),
                Point3::new(i, j + 1, k),
            ),
            VoxelSide::Right => (
                Point3::new(i, j, k + 1),
                Point3::new(i + 1, j, k + 1),
                Point3::new(i, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k + 1),
            ),
        };
        Face {
            ll,
            lr,
            ul,
            ur,
            voxel,
            side,
        }
    }

    /// Corners in vertex order: lower-left, lower-right, upper-left, upper-right.
    pub fn corners(&self) -> [Point3<i32>; 4] {
        [self.ll, self.lr, self.ul, self.ur]
    }
}
