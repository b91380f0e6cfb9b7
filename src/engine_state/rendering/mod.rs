//! Rendering-facing output of the voxel engine.
//!
//! This module turns chunk data into GPU-ready geometry and defines the seam
//! through which a renderer receives it. It owns no GPU state itself:
//! - `meshing`: surface extraction from chunk block and light buffers
//! - `scene`: the `SceneSink` trait the chunk manager reports meshes to
//! - `Vertex`: the `bytemuck`-castable vertex format and its `wgpu` layout

pub mod meshing;
pub mod scene;
mod vertex;

// Re-export commonly used types
pub use scene::{DrawList, NullScene, SceneSink};
pub use vertex::Vertex;
