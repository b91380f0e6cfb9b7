//! Greedy meshing implementation for voxel rendering.
//!
//! For each side and each slice along that side's axis, the visible faces of
//! the slice form a 16x16 mask keyed by block type and light level. Runs of
//! equal keys are expanded first along the slice's `u` axis, then along `v`
//! while every cell of the next row matches, and each rectangle becomes a
//! single quad. The result covers exactly the same faces as culled meshing.

use bitvec::prelude::*;
use cgmath::Point3;

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, block_type::BlockType},
    chunk::{Chunk, CHUNK_DIMENSION},
};

use super::{face::Face, face_visible, mesh::Mesh};

const DIM: usize = CHUNK_DIMENSION as usize;

/// Key a face must share with its neighbours to be merged into one quad.
type FaceKey = (BlockType, u8);

/// Point whose `axis` coordinate is `layer` and whose in-plane coordinates are `(a, b)`.
fn slice_point(axis: usize, layer: i32, a: i32, b: i32) -> Point3<i32> {
    let mut cell = Point3::new(0, 0, 0);
    cell[axis] = layer;
    cell[(axis + 1) % 3] = a;
    cell[(axis + 2) % 3] = b;
    cell
}

/// Collects the merged quads for one side of the chunk.
fn greedy_side(chunk: &Chunk, side: BlockSide, faces: &mut Vec<Face>) {
    let axis = side.axis();
    let mut keys: Vec<FaceKey> = vec![(BlockType::AIR, 0); DIM * DIM];
    let mut open: BitVec = bitvec![0; DIM * DIM];

    for layer in 0..CHUNK_DIMENSION {
        open.fill(false);
        for b in 0..DIM {
            for a in 0..DIM {
                let cell = slice_point(axis, layer, a as i32, b as i32);
                let block_type = chunk.get(cell.x, cell.y, cell.z);
                if !block_type.is_air() && face_visible(chunk, cell, block_type, side) {
                    keys[a + b * DIM] = (block_type, chunk.light_at(cell.x, cell.y, cell.z));
                    open.set(a + b * DIM, true);
                }
            }
        }

        for b in 0..DIM {
            let mut a = 0;
            while a < DIM {
                let start = a + b * DIM;
                if !open[start] {
                    a += 1;
                    continue;
                }
                let key = keys[start];
                let matches = |index: usize| open[index] && keys[index] == key;

                let mut width = 1;
                while a + width < DIM && matches(start + width) {
                    width += 1;
                }

                let mut height = 1;
                'grow: while b + height < DIM {
                    let row = start + height * DIM;
                    for offset in 0..width {
                        if !matches(row + offset) {
                            break 'grow;
                        }
                    }
                    height += 1;
                }

                for row in 0..height {
                    let row_start = start + row * DIM;
                    open[row_start..row_start + width].fill(false);
                }

                let lo = slice_point(axis, layer, a as i32, b as i32);
                let hi = slice_point(axis, layer + 1, (a + width) as i32, (b + height) as i32);
                let (block_type, light) = key;
                faces.push(Face::from_bounds(lo, hi, block_type, side, light));

                a += width;
            }
        }
    }
}

/// Builds a mesh in which coplanar runs of identical faces are merged into
/// rectangles.
pub fn greedy(chunk: &Chunk, brightness: &dyn Fn(u8) -> f32) -> Mesh {
    let mut per_side: [Vec<Face>; 6] = Default::default();
    for side in BlockSide::all() {
        greedy_side(chunk, side, &mut per_side[side as usize]);
    }

    let origin = chunk.origin();
    let mut mesh = Mesh::with_face_capacity(per_side.each_ref().map(Vec::len));
    for face in per_side.into_iter().flatten() {
        mesh.push_face(face, origin, brightness(face.light));
    }
    mesh
}
