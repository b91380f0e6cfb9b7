//! Vertex data structures and layouts for voxel rendering.
//!
//! This module defines the vertex format produced by the meshers and the
//! buffer layout a renderer binds it with.

use cgmath::Point3;

/// A vertex of a chunk mesh.
///
/// # Memory Layout
/// - Position: [f32; 3] world space (12 bytes)
/// - Color: [f32; 3] linear RGB, already scaled by brightness (12 bytes)
///
/// Total size: 24 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in world space
    pub position: [f32; 3],
    /// Vertex color
    pub color: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `pos` - The position of the vertex in world space
    /// * `color` - The lit color of the vertex
    pub fn new(pos: Point3<f32>, color: [f32; 3]) -> Self {
        Vertex {
            position: [pos.x, pos.y, pos.z],
            color,
        }
    }

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: color (vec3<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
