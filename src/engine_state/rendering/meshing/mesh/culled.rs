//! Per-face culled meshing: one quad for every visible block face.

use crate::engine_state::voxels::{block::block_side::BlockSide, chunk::Chunk};

use super::{face::Face, face_visible, mesh::Mesh};

/// Builds a mesh with one unit quad per visible face.
///
/// A first pass counts visible faces per side so that the second pass writes
/// into buffers that never reallocate.
pub fn culled(chunk: &Chunk, brightness: &dyn Fn(u8) -> f32) -> Mesh {
    let mut face_counts = [0usize; 6];
    for (pos, block_type) in chunk.iter_blocks() {
        for side in BlockSide::all() {
            if face_visible(chunk, pos, block_type, side) {
                face_counts[side as usize] += 1;
            }
        }
    }

    let origin = chunk.origin();
    let mut mesh = Mesh::with_face_capacity(face_counts);
    for (pos, block_type) in chunk.iter_blocks() {
        let light = chunk.light_at(pos.x, pos.y, pos.z);
        for side in BlockSide::all() {
            if face_visible(chunk, pos, block_type, side) {
                let face = Face::new(pos.x, pos.y, pos.z, block_type, side, light);
                mesh.push_face(face, origin, brightness(light));
            }
        }
    }
    mesh
}
