//! # Chunk Iteration Module
//!
//! This module provides an iterator for traversing all non-air blocks in a chunk
//! along with their chunk-relative positions, in buffer order.

use cgmath::Point3;

use crate::engine_state::voxels::block::{block_type::BlockType, BlockTypeSize};

use super::Chunk;

/// An iterator over all non-air blocks in a chunk.
///
/// Cells are visited in storage order (x fastest, then y, then z), skipping air.
pub struct ChunkBlockIterator<'a> {
    /// Reference to the chunk being iterated over
    chunk_ref: &'a Chunk,
    /// Next flat buffer index to inspect
    current_offset: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` positioned before the first cell.
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkBlockIterator {
            chunk_ref,
            current_offset: 0,
        }
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<i32>, BlockType);

    fn next(&mut self) -> Option<Self::Item> {
        let blocks = self.chunk_ref.blocks();
        while self.current_offset < blocks.len() {
            let offset = self.current_offset;
            self.current_offset += 1;

            let code = blocks[offset];
            if code == BlockType::AIR as BlockTypeSize {
                continue;
            }
            if let Some(block_type) = BlockType::from_block_type_int(code) {
                return Some((Chunk::position_of_index(offset), block_type));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_only_non_air_blocks_in_storage_order() {
        let mut chunk = Chunk::empty(Point3::new(0, 0, 0));
        chunk.set(0, 0, 1, BlockType::STONE);
        chunk.set(3, 2, 0, BlockType::WATER);
        chunk.set(15, 15, 15, BlockType::GRASS);

        let blocks: Vec<_> = chunk.iter_blocks().collect();
        assert_eq!(
            blocks,
            vec![
                (Point3::new(3, 2, 0), BlockType::WATER),
                (Point3::new(0, 0, 1), BlockType::STONE),
                (Point3::new(15, 15, 15), BlockType::GRASS),
            ]
        );
    }

    #[test]
    fn empty_chunk_yields_nothing() {
        let chunk = Chunk::empty(Point3::new(0, 0, 0));
        assert_eq!(chunk.iter_blocks().count(), 0);
    }
}
