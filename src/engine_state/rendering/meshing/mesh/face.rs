use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::block::{block_side::BlockSide, block_type::BlockType};

/// Represents a single quad face in a chunk mesh.
///
/// A face is defined by four corner points (lower-left, lower-right, upper-left, upper-right)
/// in chunk-local block coordinates. Triangulated as `(ll, lr, ur)` and `(ll, ur, ul)` the
/// quad winds counter-clockwise when seen from outside the block, so its normal points
/// along `block_side`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    /// Lower-left corner of the face in chunk coordinates
    pub ll: Point3<i32>,
    /// Lower-right corner of the face in chunk coordinates
    pub lr: Point3<i32>,
    /// Upper-left corner of the face in chunk coordinates
    pub ul: Point3<i32>,
    /// Upper-right corner of the face in chunk coordinates
    pub ur: Point3<i32>,
    /// The block type the face belongs to
    pub block_type: BlockType,
    /// Which side of the block this face represents
    pub block_side: BlockSide,
    /// Light level shared by every cell the face covers
    pub light: u8,
}

impl Face {
    /// Creates a unit face for the voxel at the given chunk-local coordinates.
    pub fn new(
        i: i32,
        j: i32,
        k: i32,
        block_type: BlockType,
        block_side: BlockSide,
        light: u8,
    ) -> Self {
        Self::from_bounds(
            Point3::new(i, j, k),
            Point3::new(i + 1, j + 1, k + 1),
            block_type,
            block_side,
            light,
        )
    }

    /// Creates the face on `block_side` of the box spanning `lo..hi`.
    ///
    /// # Arguments
    /// * `lo`, `hi` - Opposite corners of a run of cells. `hi` is exclusive, so a
    ///   single cell at `(i, j, k)` is `lo = (i, j, k)`, `hi = (i + 1, j + 1, k + 1)`.
    pub fn from_bounds(
        lo: Point3<i32>,
        hi: Point3<i32>,
        block_type: BlockType,
        block_side: BlockSide,
        light: u8,
    ) -> Self {
        let p = Point3::new;
        let (ll, lr, ul, ur) = match block_side {
            BlockSide::FRONT => (
                p(lo.x, lo.y, lo.z),
                p(lo.x, lo.y, hi.z),
                p(lo.x, hi.y, lo.z),
                p(lo.x, hi.y, hi.z),
            ),
            BlockSide::BACK => (
                p(hi.x, lo.y, hi.z),
                p(hi.x, lo.y, lo.z),
                p(hi.x, hi.y, hi.z),
                p(hi.x, hi.y, lo.z),
            ),
            BlockSide::BOTTOM => (
                p(lo.x, lo.y, hi.z),
                p(lo.x, lo.y, lo.z),
                p(hi.x, lo.y, hi.z),
                p(hi.x, lo.y, lo.z),
            ),
            BlockSide::TOP => (
                p(lo.x, hi.y, lo.z),
                p(lo.x, hi.y, hi.z),
                p(hi.x, hi.y, lo.z),
                p(hi.x, hi.y, hi.z),
            ),
            BlockSide::LEFT => (
                p(hi.x, lo.y, lo.z),
                p(lo.x, lo.y, lo.z),
                p(hi.x, hi.y, lo.z),
                p(lo.x, hi.y, lo.z),
            ),
            BlockSide::RIGHT => (
                p(lo.x, lo.y, hi.z),
                p(hi.x, lo.y, hi.z),
                p(lo.x, hi.y, hi.z),
                p(hi.x, hi.y, hi.z),
            ),
        };

        Face {
            ll,
            lr,
            ul,
            ur,
            block_type,
            block_side,
            light,
        }
    }

    /// Width and height of the quad in blocks.
    pub fn extent(&self) -> (i32, i32) {
        let width = self.lr - self.ll;
        let height = self.ul - self.ll;
        (
            width.x.abs() + width.y.abs() + width.z.abs(),
            height.x.abs() + height.y.abs() + height.z.abs(),
        )
    }

    /// Surface area in unit faces.
    pub fn area(&self) -> i32 {
        let (width, height) = self.extent();
        width * height
    }

    /// Unnormalised geometric normal from the corner winding.
    pub fn winding_normal(&self) -> Vector3<i32> {
        (self.lr - self.ll).cross(self.ul - self.ll)
    }

    /// Chunk-local coordinates of every cell whose `block_side` this face covers.
    pub fn covered_cells(&self) -> Vec<Point3<i32>> {
        let corners = [self.ll, self.lr, self.ul, self.ur];
        let mut lo = self.ll;
        let mut hi = self.ll;
        for corner in corners {
            lo = Point3::new(lo.x.min(corner.x), lo.y.min(corner.y), lo.z.min(corner.z));
            hi = Point3::new(hi.x.max(corner.x), hi.y.max(corner.y), hi.z.max(corner.z));
        }

        // The face lies on a plane; the covered cell layer sits behind it.
        let axis = self.block_side.axis();
        if self.block_side.is_positive() {
            lo[axis] -= 1;
        } else {
            hi[axis] += 1;
        }

        let mut cells = Vec::with_capacity(self.area().max(0) as usize);
        for z in lo.z..hi.z {
            for y in lo.y..hi.y {
                for x in lo.x..hi.x {
                    cells.push(Point3::new(x, y, z));
                }
            }
        }
        cells
    }
}
