//! Chunk mesh generation.
//!
//! Turns a chunk's block and light buffers into a [`Mesh`] using one of two
//! surface extraction algorithms. The choice is a configuration value; both
//! produce the same visible surface.

use log::debug;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::engine_state::voxels::chunk::Chunk;

pub mod mesh;

pub use mesh::{Face, Mesh, MeshSide, MeshStats};

/// Surface extraction algorithm used for chunk meshes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshingStrategy {
    /// One quad per visible block face.
    Culled,
    /// Coplanar runs of identical faces merged into rectangles.
    #[default]
    Greedy,
}

/// Builds a mesh for `chunk` with the chosen strategy.
///
/// # Arguments
/// * `brightness` - Maps a cell's light level to the factor applied to its color
pub fn build_chunk_mesh(
    chunk: &Chunk,
    brightness: &dyn Fn(u8) -> f32,
    strategy: MeshingStrategy,
) -> Mesh {
    let start = Instant::now();
    let mesh = match strategy {
        MeshingStrategy::Culled => mesh::culled(chunk, brightness),
        MeshingStrategy::Greedy => mesh::greedy(chunk, brightness),
    };
    debug!(
        "{:?} mesh for chunk {:?}: {} faces in {:?}",
        strategy,
        chunk.position,
        mesh.stats().faces,
        start.elapsed()
    );
    mesh
}
