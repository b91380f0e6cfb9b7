//! Mesh data structures for voxel rendering.
//!
//! A `Mesh` keeps one vertex/index buffer pair per block side, so a renderer
//! can cull whole sides that face away from the camera.

use std::ops::{Add, AddAssign};

use cgmath::Point3;

use crate::engine_state::{
    rendering::Vertex,
    voxels::block::{block_side::BlockSide, block_type::BlockType},
};

use super::face::Face;

/// Represents a single side of a mesh with its associated vertices and indices.
///
/// Each `MeshSide` corresponds to one of the six possible block faces and contains
/// the vertex and index data needed to render that face, plus the faces it was
/// built from.
#[derive(Debug, Clone)]
pub struct MeshSide {
    /// The vertex data for this mesh side
    pub vertices: Vec<Vertex>,
    /// The index data for this mesh side
    pub indices: Vec<u32>,
    /// The quads that produced `vertices`, in emission order
    pub faces: Vec<Face>,
    /// Which block side this mesh represents
    pub side: BlockSide,
}

impl MeshSide {
    /// Creates a new, empty `MeshSide` for the specified block side.
    pub fn new(side: BlockSide) -> Self {
        Self::with_face_capacity(side, 0)
    }

    /// Creates an empty `MeshSide` with room for `faces` quads.
    pub fn with_face_capacity(side: BlockSide, faces: usize) -> Self {
        MeshSide {
            vertices: Vec::with_capacity(faces * 4),
            indices: Vec::with_capacity(faces * 6),
            faces: Vec::with_capacity(faces),
            side,
        }
    }
}

/// Vertex, index and quad totals of one or more meshes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshStats {
    /// Quads.
    pub faces: usize,
    /// Vertices, four per quad.
    pub vertices: usize,
    /// Indices, six per quad.
    pub indices: usize,
}

impl Add for MeshStats {
    type Output = MeshStats;

    fn add(self, rhs: MeshStats) -> MeshStats {
        MeshStats {
            faces: self.faces + rhs.faces,
            vertices: self.vertices + rhs.vertices,
            indices: self.indices + rhs.indices,
        }
    }
}

impl AddAssign for MeshStats {
    fn add_assign(&mut self, rhs: MeshStats) {
        *self = *self + rhs;
    }
}

/// Represents a complete mesh for a voxel chunk with all six possible sides.
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Array of mesh sides, indexed by `BlockSide` enum values.
    /// The order matches the `BlockSide` enum variant order.
    pub mesh: [MeshSide; 6],
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    /// Creates a new, empty mesh with all sides initialized.
    pub fn new() -> Self {
        Mesh {
            mesh: BlockSide::all().map(MeshSide::new),
        }
    }

    /// Creates an empty mesh with buffers pre-sized for the given per-side face counts.
    pub fn with_face_capacity(face_counts: [usize; 6]) -> Self {
        Mesh {
            mesh: BlockSide::all()
                .map(|side| MeshSide::with_face_capacity(side, face_counts[side as usize])),
        }
    }

    /// Appends a quad, converting it to world space at `origin`.
    ///
    /// # Arguments
    /// * `face` - The quad, in chunk-local coordinates
    /// * `origin` - World position of the chunk's (0, 0, 0) cell
    /// * `brightness` - Factor in `(0, 1]` applied to the block color
    pub fn push_face(&mut self, face: Face, origin: Point3<i32>, brightness: f32) {
        let side = &mut self.mesh[face.block_side as usize];
        let num_faces_generated = side.faces.len() as u32;
        side.vertices.extend(Self::generate_face_vertices(&face, origin, brightness));
        side.indices.extend(Self::generate_face_indices(num_faces_generated));
        side.faces.push(face);
    }

    /// Generates vertex data for a single face.
    ///
    /// # Returns
    /// The four corners in `ll, lr, ul, ur` order. Combined with the indices from
    /// `generate_face_indices` they form two counter-clockwise triangles.
    pub fn generate_face_vertices(
        face: &Face,
        origin: Point3<i32>,
        brightness: f32,
    ) -> [Vertex; 4] {
        let [r, g, b] = face.block_type.color();
        let color = [r * brightness, g * brightness, b * brightness];
        let to_world = |corner: Point3<i32>| {
            Point3::new(
                (origin.x + corner.x) as f32,
                (origin.y + corner.y) as f32,
                (origin.z + corner.z) as f32,
            )
        };

        [
            Vertex::new(to_world(face.ll), color),
            Vertex::new(to_world(face.lr), color),
            Vertex::new(to_world(face.ul), color),
            Vertex::new(to_world(face.ur), color),
        ]
    }

    /// Generates index data for a face, adjusted by the number of previously generated faces.
    pub fn generate_face_indices(num_faces_generated: u32) -> [u32; 6] {
        let base = num_faces_generated * 4;
        [base, base + 1, base + 3, base, base + 3, base + 2]
    }

    /// Gets the number of vertices for each side of the mesh.
    pub fn get_vertex_lens(&self) -> [u64; 6] {
        self.mesh.each_ref().map(|side| side.vertices.len() as u64)
    }

    /// Iterates over every quad of every side.
    pub fn faces(&self) -> impl Iterator<Item = &Face> {
        self.mesh.iter().flat_map(|side| side.faces.iter())
    }

    /// Total surface area per block type and side, in unit faces.
    pub fn surface_area(&self, block_type: BlockType, block_side: BlockSide) -> i32 {
        self.mesh[block_side as usize]
            .faces
            .iter()
            .filter(|face| face.block_type == block_type)
            .map(Face::area)
            .sum()
    }

    /// Quad, vertex and index counts over all six sides.
    pub fn stats(&self) -> MeshStats {
        self.mesh
            .iter()
            .map(|side| MeshStats {
                faces: side.faces.len(),
                vertices: side.vertices.len(),
                indices: side.indices.len(),
            })
            .fold(MeshStats::default(), <MeshStats as Add>::add)
    }

    /// `true` if no side has a face.
    pub fn is_empty(&self) -> bool {
        self.mesh.iter().all(|side| side.faces.is_empty())
    }

    /// All sides concatenated into a single vertex buffer and index buffer.
    pub fn flatten(&self) -> (Vec<Vertex>, Vec<u32>) {
        let stats = self.stats();
        let mut vertices = Vec::with_capacity(stats.vertices);
        let mut indices = Vec::with_capacity(stats.indices);
        for side in &self.mesh {
            let offset = vertices.len() as u32;
            vertices.extend_from_slice(&side.vertices);
            indices.extend(side.indices.iter().map(|index| index + offset));
        }
        (vertices, indices)
    }
}
