//! # Voxel Type Module
//!
//! Enumerates the materials a voxel can be made of and the classification predicates
//! the meshers, raycasts and the pathfinder use to decide what is solid, walkable or
//! water.

use num_derive::FromPrimitive;

use super::VoxelTypeSize;

/// Every material a voxel can carry.
///
/// The discriminants are the on-chunk encoding, so new variants must be appended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum VoxelType {
    /// Empty space. Not rendered, never blocks.
    Air = 0,
    /// Translucent liquid, meshed separately from opaque materials.
    Water,
    /// Fallback solid material.
    Generic,
    Grass,
    Wood,
    Leaf,
    Rock,
    Sand,
    Dirt,
    /// Render-only decoration generated for clients. Opaque but never blocks.
    Cloud,
}

impl VoxelType {
    /// Converts the compact storage encoding back into a `VoxelType`.
    ///
    /// Unknown encodings decode as [`VoxelType::Generic`] so that data written by a
    /// newer material table still renders as something solid.
    pub fn from_int(material: VoxelTypeSize) -> Self {
        num::FromPrimitive::from_u8(material).unwrap_or(VoxelType::Generic)
    }

    pub fn is_air(self) -> bool {
        self == VoxelType::Air
    }

    pub fn is_water(self) -> bool {
        self == VoxelType::Water
    }

    /// Whether the material occludes its neighbours and ends up in the opaque mesh.
    pub fn is_opaque(self) -> bool {
        !matches!(self, VoxelType::Air | VoxelType::Water)
    }

    /// Whether the material stops movement and rays.
    pub fn is_blocked(self) -> bool {
        !matches!(self, VoxelType::Air | VoxelType::Water | VoxelType::Cloud)
    }

    /// Whether an entity may stand on top of the material.
    pub fn is_floor(self) -> bool {
        self.is_blocked() && self != VoxelType::Leaf
    }
}
