//! The hand-off point between chunk meshes and whatever draws them.

use std::collections::HashMap;

use cgmath::Point3;

use super::meshing::{Mesh, MeshStats};

/// Receives chunk meshes as chunks enter, change and leave the world.
///
/// The manager calls `add_chunk_mesh` once a chunk is generated, lit and
/// meshed, `update_chunk_mesh` after a relight, and `remove_chunk_mesh`
/// before the chunk is dropped.
pub trait SceneSink {
    /// Registers the mesh of a newly installed chunk.
    fn add_chunk_mesh(&mut self, position: Point3<i32>, mesh: &Mesh);

    /// Forgets the mesh of a chunk about to be dropped.
    fn remove_chunk_mesh(&mut self, position: Point3<i32>);

    /// Replaces the mesh of a resident chunk. Defaults to remove then add.
    fn update_chunk_mesh(&mut self, position: Point3<i32>, mesh: &Mesh) {
        self.remove_chunk_mesh(position);
        self.add_chunk_mesh(position, mesh);
    }
}

/// Discards every mesh.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullScene;

impl SceneSink for NullScene {
    fn add_chunk_mesh(&mut self, _position: Point3<i32>, _mesh: &Mesh) {}

    fn remove_chunk_mesh(&mut self, _position: Point3<i32>) {}
}

/// Per-chunk draw bookkeeping: what a renderer would upload.
#[derive(Debug, Default)]
pub struct DrawList {
    entries: HashMap<Point3<i32>, MeshStats>,
    uploads: usize,
}

impl DrawList {
    /// An empty draw list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no chunk is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` if the chunk at `position` has a mesh registered.
    pub fn contains(&self, position: Point3<i32>) -> bool {
        self.entries.contains_key(&position)
    }

    /// Statistics of the mesh registered for `position`.
    pub fn get(&self, position: Point3<i32>) -> Option<&MeshStats> {
        self.entries.get(&position)
    }

    /// Number of mesh uploads since creation, updates included.
    pub fn uploads(&self) -> usize {
        self.uploads
    }

    /// Sum over every registered chunk.
    pub fn totals(&self) -> MeshStats {
        self.entries
            .values()
            .fold(MeshStats::default(), |total, stats| total + *stats)
    }
}

impl SceneSink for DrawList {
    fn add_chunk_mesh(&mut self, position: Point3<i32>, mesh: &Mesh) {
        self.entries.insert(position, mesh.stats());
        self.uploads += 1;
    }

    fn remove_chunk_mesh(&mut self, position: Point3<i32>) {
        self.entries.remove(&position);
    }
}
