//! # Chunk Module
//!
//! This module provides the `Chunk` struct and related functionality for managing
//! 16x16x16 blocks of voxel data.
//!
//! ## Storage
//!
//! A chunk owns two flat byte buffers of `CHUNK_SIZE` cells each, laid out with
//! `index = x + y * CHUNK_DIMENSION + z * CHUNK_PLANE_SIZE`:
//! - `blocks`: one `BlockTypeSize` code per cell
//! - `light`: one light level (0..=15) per cell
//!
//! It may also own a derived `Mesh`. The mesh is a cache: any write to the block
//! or light buffers drops it, and `build_mesh` regenerates it.
//!
//! ## Boundary Safety
//!
//! `get` returns air for any coordinate outside `0..CHUNK_DIMENSION` and `set`
//! ignores such writes. Meshing and lighting rely on this instead of bounds
//! checks at every neighbour lookup.

use cgmath::Point3;

use crate::{
    engine_state::{
        lighting::{BlockSource, LightingEngine},
        rendering::meshing::{self, Mesh, MeshingStrategy},
    },
    error::ChunkError,
};

use super::block::{block_type::BlockType, BlockTypeSize};
use chunk_iteration::ChunkBlockIterator;

pub mod chunk_iteration;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;

/// Represents a 16x16x16 collection of voxel blocks in the world.
///
/// Chunks are the unit of generation, loading and meshing. Each chunk knows its
/// position in chunk coordinates; its world-space origin is that position
/// multiplied by `CHUNK_DIMENSION`.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: Point3<i32>,
    blocks: Vec<BlockTypeSize>,
    light: Vec<u8>,
    mesh: Option<Mesh>,
}

impl Chunk {
    /// Creates a new, completely empty chunk (all blocks are air, all light 0).
    pub fn empty(position: Point3<i32>) -> Self {
        Chunk {
            position,
            blocks: vec![BlockType::AIR as BlockTypeSize; CHUNK_SIZE as usize],
            light: vec![0; CHUNK_SIZE as usize],
            mesh: None,
        }
    }

    /// Rebuilds a chunk from a raw block buffer, as returned by a generation worker.
    ///
    /// # Errors
    /// Fails if the buffer is not exactly `CHUNK_SIZE` long or holds a byte that is
    /// not a known block code.
    pub fn from_raw(position: Point3<i32>, blocks: Vec<BlockTypeSize>) -> Result<Self, ChunkError> {
        if blocks.len() != CHUNK_SIZE as usize {
            return Err(ChunkError::WrongBufferLength {
                expected: CHUNK_SIZE as usize,
                actual: blocks.len(),
            });
        }
        if let Some((index, &code)) = blocks
            .iter()
            .enumerate()
            .find(|(_, &code)| BlockType::from_block_type_int(code).is_none())
        {
            return Err(ChunkError::UnknownBlockCode { code, index });
        }

        Ok(Chunk {
            position,
            blocks,
            light: vec![0; CHUNK_SIZE as usize],
            mesh: None,
        })
    }

    /// World-space coordinates of the chunk's (0, 0, 0) cell.
    pub fn origin(&self) -> Point3<i32> {
        Point3::new(
            self.position.x * CHUNK_DIMENSION,
            self.position.y * CHUNK_DIMENSION,
            self.position.z * CHUNK_DIMENSION,
        )
    }

    /// Flat buffer index of a local coordinate, or `None` when out of range.
    #[inline]
    pub fn index(x: i32, y: i32, z: i32) -> Option<usize> {
        let range = 0..CHUNK_DIMENSION;
        if range.contains(&x) && range.contains(&y) && range.contains(&z) {
            Some((x + y * CHUNK_DIMENSION + z * CHUNK_PLANE_SIZE) as usize)
        } else {
            None
        }
    }

    /// Local coordinate of a flat buffer index.
    #[inline]
    pub fn position_of_index(index: usize) -> Point3<i32> {
        let index = index as i32;
        Point3::new(
            index % CHUNK_DIMENSION,
            (index / CHUNK_DIMENSION) % CHUNK_DIMENSION,
            index / CHUNK_PLANE_SIZE,
        )
    }

    /// Gets the block at the specified chunk-relative coordinates.
    ///
    /// # Returns
    /// The block type, or `BlockType::AIR` for any coordinate outside the chunk.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> BlockType {
        match Self::index(x, y, z) {
            Some(index) => {
                BlockType::from_block_type_int(self.blocks[index]).unwrap_or(BlockType::AIR)
            }
            None => BlockType::AIR,
        }
    }

    /// Writes a block at the specified chunk-relative coordinates.
    ///
    /// Out-of-range coordinates are ignored. A write that changes the cell drops
    /// the cached mesh.
    pub fn set(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) {
        if let Some(index) = Self::index(x, y, z) {
            let code = block_type as BlockTypeSize;
            if self.blocks[index] != code {
                self.blocks[index] = code;
                self.mesh = None;
            }
        }
    }

    /// Sets every cell to `block_type`.
    pub fn fill(&mut self, block_type: BlockType) {
        self.blocks.fill(block_type as BlockTypeSize);
        self.mesh = None;
    }

    /// The raw block buffer.
    pub fn blocks(&self) -> &[BlockTypeSize] {
        &self.blocks
    }

    /// Light level at a local coordinate; 0 outside the chunk.
    #[inline]
    pub fn light_at(&self, x: i32, y: i32, z: i32) -> u8 {
        Self::index(x, y, z).map_or(0, |index| self.light[index])
    }

    /// The raw light buffer.
    pub fn light_buffer(&self) -> &[u8] {
        &self.light
    }

    /// Replaces the light buffer with a freshly computed one and drops the mesh.
    ///
    /// A buffer of the wrong length is ignored.
    pub fn set_light_buffer(&mut self, light: Vec<u8>) {
        if light.len() != CHUNK_SIZE as usize {
            log::warn!(
                "Ignoring light buffer of {} cells for chunk {:?}",
                light.len(),
                self.position
            );
            return;
        }
        self.light = light;
        self.mesh = None;
    }

    /// Iterates over every non-air block with its local position.
    pub fn iter_blocks(&self) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(self)
    }

    /// Number of cells holding `block_type`.
    pub fn count_blocks(&self, block_type: BlockType) -> usize {
        let code = block_type as BlockTypeSize;
        self.blocks.iter().filter(|&&cell| cell == code).count()
    }

    /// Builds (or rebuilds) the chunk's mesh and caches it.
    ///
    /// # Arguments
    /// * `lighting` - When given, vertex colors are scaled by the brightness of
    ///   the light buffer; otherwise every face is fully bright.
    /// * `strategy` - Per-face culling or greedy quad merging.
    pub fn build_mesh(
        &mut self,
        lighting: Option<&LightingEngine>,
        strategy: MeshingStrategy,
    ) -> &Mesh {
        let brightness = |level: u8| lighting.map_or(1.0, |engine| engine.brightness(level));
        let mesh = meshing::build_chunk_mesh(self, &brightness, strategy);
        self.mesh.insert(mesh)
    }

    /// The cached mesh, if one has been built since the last change.
    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    /// Releases the cached mesh. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        self.mesh = None;
    }
}

/// A lone chunk answers world-space block queries for its own cells and air
/// everywhere else.
impl BlockSource for Chunk {
    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockType {
        let origin = self.origin();
        self.get(x - origin.x, y - origin.y, z - origin.z)
    }
}
