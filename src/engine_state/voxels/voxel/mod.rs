//! # Voxel Module
//!
//! The single-voxel value type stored in chunks, plus its material table and faces.

use voxel_type::VoxelType;

pub mod voxel_side;
pub mod voxel_type;

/// The underlying integer type used to store a material inside a chunk.
pub type VoxelTypeSize = u8;

/// A single voxel of the world.
///
/// # Memory Layout
/// `#[repr(C)]` and `Pod` keep chunks a flat byte array: two bytes per voxel. The zeroed
/// value is air.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Voxel {
    /// The material, encoded as a `VoxelTypeSize`.
    pub material: VoxelTypeSize,
    /// Palette index used by the renderer to tint the material.
    pub colour: u8,
}

impl Voxel {
    pub fn new(material: VoxelType, colour: u8) -> Self {
        Voxel {
            material: material as VoxelTypeSize,
            colour,
        }
    }

    pub fn air() -> Self {
        Voxel::default()
    }

    pub fn material(&self) -> VoxelType {
        VoxelType::from_int(self.material)
    }

    pub fn is_air(&self) -> bool {
        self.material().is_air()
    }
}

impl From<VoxelType> for Voxel {
    fn from(material: VoxelType) -> Self {
        Voxel::new(material, 0)
    }
}
