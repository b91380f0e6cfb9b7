//! Mesh generation for voxel rendering.
//!
//! This module provides the core functionality for converting chunk data into
//! GPU-friendly mesh representations.
//!
//! # Architecture
//! - [`Mesh`]: A complete chunk mesh with per-side vertex and index buffers
//! - [`Face`]: A single quad with its corners, block type, side and light
//! - [`culled`]: One quad per visible block face
//! - [`greedy`]: Coplanar runs of identical faces merged into rectangles
//!
//! Both algorithms emit a face on side `S` of a cell exactly when
//! [`face_visible`] holds for it.

use cgmath::Point3;

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, block_type::BlockType},
    chunk::Chunk,
};

mod culled;
mod face;
mod greedy;
mod mesh;

pub use culled::culled;
pub use face::Face;
pub use greedy::greedy;
pub use mesh::*;

/// Whether the `side` face of the non-air cell at `pos` is visible.
///
/// The neighbour on that side must be non-opaque and of a different type.
/// Neighbours outside the chunk read as air, so border faces are always
/// emitted.
///
/// Transparent blocks are drawn too: a water cell shows every face that
/// borders air or another type, so a lone water cell in air has six faces.
/// Only a pair of cells that are both air, or both the same transparent
/// type, shares no face. This is stricter than an "exactly one side is
/// opaque" rule, which would leave water invisible.
#[inline]
pub fn face_visible(
    chunk: &Chunk,
    pos: Point3<i32>,
    block_type: BlockType,
    side: BlockSide,
) -> bool {
    let offset = side.normal();
    let neighbor = chunk.get(pos.x + offset.x, pos.y + offset.y, pos.z + offset.z);
    !neighbor.is_opaque() && neighbor != block_type
}
