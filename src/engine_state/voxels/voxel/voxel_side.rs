//! # Voxel Side Module
//!
//! The six faces of a voxel, with the unit normal each face points along.

use cgmath::Vector3;

/// One of the six axis-aligned faces of a voxel.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum VoxelSide {
    /// The face on the `-x` plane.
    Front = 0,
    /// The face on the `+x` plane.
    Back = 1,
    /// The face on the `-y` plane.
    Bottom = 2,
    /// The face on the `+y` plane.
    Top = 3,
    /// The face on the `-z` plane.
    Left = 4,
    /// The face on the `+z` plane.
    Right = 5,
}

impl VoxelSide {
    /// All six faces, in discriminant order.
    pub fn all() -> [VoxelSide; 6] {
        [
            VoxelSide::Front,
            VoxelSide::Back,
            VoxelSide::Bottom,
            VoxelSide::Top,
            VoxelSide::Left,
            VoxelSide::Right,
        ]
    }

    /// Offset from a voxel to the neighbour that shares this face.
    pub fn normal(self) -> Vector3<i32> {
        match self {
            VoxelSide::Front => Vector3::new(-1, 0, 0),
            VoxelSide::Back => Vector3::new(1, 0, 0),
            VoxelSide::Bottom => Vector3::new(0, -1, 0),
            VoxelSide::Top => Vector3::new(0, 1, 0),
            VoxelSide::Left => Vector3::new(0, 0, -1),
            VoxelSide::Right => Vector3::new(0, 0, 1),
        }
    }
}
