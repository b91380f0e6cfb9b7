//! # Block Side Module
//!
//! This module defines the six axis-aligned faces of a voxel block and the
//! geometry helpers that meshing needs: the outward normal, the axis a face is
//! perpendicular to, and the direction along that axis.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// Each variant is assigned a unique integer value so it can index per-side
/// arrays. The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, PartialOrd, Ord)]
pub enum BlockSide {
    /// The front face (facing negative X)
    FRONT = 0,

    /// The back face (facing positive X)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative Z)
    LEFT = 4,

    /// The right face (facing positive Z)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// The outward unit normal of this face, which is also the offset to the
    /// neighbouring cell the face looks at.
    pub fn normal(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(-1, 0, 0),
            BlockSide::BACK => Vector3::new(1, 0, 0),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(0, 0, -1),
            BlockSide::RIGHT => Vector3::new(0, 0, 1),
        }
    }

    /// Index (0 = x, 1 = y, 2 = z) of the axis this face is perpendicular to.
    pub fn axis(self) -> usize {
        match self {
            BlockSide::FRONT | BlockSide::BACK => 0,
            BlockSide::BOTTOM | BlockSide::TOP => 1,
            BlockSide::LEFT | BlockSide::RIGHT => 2,
        }
    }

    /// Whether the normal points along the positive direction of its axis.
    pub fn is_positive(self) -> bool {
        matches!(self, BlockSide::BACK | BlockSide::TOP | BlockSide::RIGHT)
    }
}
