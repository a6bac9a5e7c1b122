//! Mesh buffers produced by region extraction.

use cgmath::Point3;

use super::face::Face;

/// A vertex of an extracted mesh.
///
/// # Memory Layout
/// - Position: 3x i32, local to the mesh offset (12 bytes)
/// - Side: u32, the `VoxelSide` the quad faces (4 bytes)
/// - Material: u32 (4 bytes)
/// - Colour: u32 (4 bytes)
///
/// Total size: 24 bytes, `Pod` so the buffers upload without conversion.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub side: u32,
    pub material: u32,
    pub colour: u32,
}

impl Vertex {
    pub fn position(&self) -> Point3<i32> {
        Point3::new(self.x, self.y, self.z)
    }
}

/// Indexed triangle mesh with positions relative to `offset`.
///
/// The buffers are ordinary growable vectors; the capacity passed to
/// [`Mesh::with_capacity`] is a hint to avoid reallocation, not a limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    offset: Point3<i32>,
}

impl Mesh {
    pub fn new(offset: Point3<i32>) -> Self {
        Self::with_capacity(0, 0, offset)
    }

    pub fn with_capacity(vertices: usize, indices: usize, offset: Point3<i32>) -> Self {
        Mesh {
            vertices: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
            offset,
        }
    }

    /// World position the vertex positions are relative to.
    pub fn offset(&self) -> Point3<i32> {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Point3<i32>) {
        self.offset = offset;
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn num_faces(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Appends the four corners of `face` and the two triangles covering it.
    pub fn add_face(&mut self, face: &Face) {
        let num_faces_generated = self.num_faces() as u32;
        for corner in face.corners() {
            self.vertices.push(Vertex {
                x: corner.x,
                y: corner.y,
                z: corner.z,
                side: face.side as u32,
                material: face.voxel.material as u32,
                colour: face.voxel.colour as u32,
            });
        }
        self.indices
            .extend_from_slice(&Self::generate_face_indices(num_faces_generated));
    }

    /// Indices of the two triangles of the `num_faces_generated`-th quad.
    pub fn generate_face_indices(num_faces_generated: u32) -> [u32; 6] {
        let base = num_faces_generated * 4;
        [base, base + 1, base + 3, base, base + 3, base + 2]
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }
}

/// The opaque and water meshes extracted for one tile.
///
/// Both meshes share the tile's lowest corner as their offset.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedMeshSet {
    pub opaque: Mesh,
    pub water: Mesh,
}

impl ExtractedMeshSet {
    /// World position the tile's meshes are placed at.
    pub fn translation(&self) -> Point3<i32> {
        self.opaque.offset()
    }

    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.water.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::voxel::{voxel_side::VoxelSide, voxel_type::VoxelType, Voxel};

    #[test]
    fn faces_append_four_vertices_and_two_triangles() {
        let mut mesh = Mesh::with_capacity(8, 12, Point3::new(16, 0, -16));
        let voxel = Voxel::new(VoxelType::Grass, 3);
        mesh.add_face(&Face::new(Point3::new(0, 0, 0), voxel, VoxelSide::Top));
        mesh.add_face(&Face::new(Point3::new(1, 0, 0), voxel, VoxelSide::Top));

        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(&mesh.indices[6..], &[4, 5, 7, 4, 7, 6]);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
        assert_eq!(mesh.vertices[0].material, VoxelType::Grass as u32);
        assert_eq!(mesh.vertices[0].colour, 3);
        assert_eq!(mesh.offset(), Point3::new(16, 0, -16));
    }

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        let mesh = Mesh::new(Point3::new(0, 0, 0));
        assert!(mesh.is_empty());
        let bytes: &[u8] = bytemuck::cast_slice(&mesh.vertices);
        assert!(bytes.is_empty());
    }
}
