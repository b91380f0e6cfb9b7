//! # Terrain Generation
//!
//! Deterministic, seed-driven block fill for chunks.
//!
//! ## Height Field
//!
//! Each world column `(x, z)` has a surface height built from three octaves of
//! 2D noise at frequencies `scale`, `2·scale` and `4·scale` with weights
//! `1, 0.5, 0.25`, normalised by the weight sum, scaled by the terrain height
//! and offset by the sea level, then floored to an integer.
//!
//! ## Layering
//!
//! For a cell at world height `y` over a column of height `h`:
//!
//! | condition              | block                                   |
//! |------------------------|-----------------------------------------|
//! | `y <= floor_y`         | bedrock                                 |
//! | `y < h - 3`            | stone                                   |
//! | `y < h`                | dirt                                    |
//! | `y == h`               | sand if `h <= sea_level`, grass otherwise |
//! | `y > h`, `y <= sea`    | water                                   |
//! | otherwise              | air                                     |
//!
//! The output depends only on the configuration and the chunk position. A
//! per-generator LRU cache of column heights avoids recomputing the height
//! field for vertically stacked chunks without affecting the result.

use std::{num::NonZeroUsize, sync::Arc};

use cgmath::Point3;
use lru::LruCache;

pub use noise::NoiseSource;

use crate::config::WorldGenConfig;

use super::{
    block::{block_type::BlockType, BlockTypeSize},
    chunk::{Chunk, CHUNK_DIMENSION, CHUNK_PLANE_SIZE, CHUNK_SIZE},
};

pub mod noise;

/// Frequency multiplier and weight of each height octave.
const OCTAVES: [(f64, f64); 3] = [(1.0, 1.0), (2.0, 0.5), (4.0, 0.25)];

/// Number of chunk columns whose height field is kept per generator.
const HEIGHT_CACHE_COLUMNS: usize = 64;

/// Depth of the dirt layer below the surface block.
const DIRT_DEPTH: i32 = 3;

/// Surface heights for every column in one chunk column, indexed `x + z * 16`.
pub type ColumnHeights = Arc<[i32]>;

/// Generates chunks from a [`WorldGenConfig`].
///
/// Every worker thread owns its own generator. Generators built from equal
/// configurations produce identical chunks.
pub struct TerrainGenerator {
    config: WorldGenConfig,
    noise: NoiseSource,
    height_cache: LruCache<(i32, i32), ColumnHeights>,
}

impl TerrainGenerator {
    /// A generator with an empty height cache.
    pub fn new(config: WorldGenConfig) -> Self {
        TerrainGenerator {
            config,
            noise: NoiseSource::new(config.seed),
            height_cache: LruCache::new(
                NonZeroUsize::new(HEIGHT_CACHE_COLUMNS).unwrap_or(NonZeroUsize::MIN),
            ),
        }
    }

    /// The terrain parameters this generator was built with.
    pub fn config(&self) -> &WorldGenConfig {
        &self.config
    }

    /// Surface height of the world column at `(x, z)`.
    pub fn height_at(&self, x: i32, z: i32) -> i32 {
        let scale = self.config.terrain_scale;
        let mut sum = 0.0;
        let mut weight_sum = 0.0;
        for (frequency, weight) in OCTAVES {
            let f = scale * frequency;
            sum += weight * self.noise.sample_2d(x as f64 * f, z as f64 * f);
            weight_sum += weight;
        }
        let height = self.config.sea_level + self.config.terrain_height * sum / weight_sum;
        height.floor() as i32
    }

    /// The block at world height `y` in a column whose surface is at `height`.
    pub fn block_for(&self, y: i32, height: i32) -> BlockType {
        let sea_level = self.config.sea_level;
        if y <= self.config.floor_y {
            BlockType::BEDROCK
        } else if y < height - DIRT_DEPTH {
            BlockType::STONE
        } else if y < height {
            BlockType::DIRT
        } else if y == height {
            if height as f64 <= sea_level {
                BlockType::SAND
            } else {
                BlockType::GRASS
            }
        } else if y as f64 <= sea_level {
            BlockType::WATER
        } else {
            BlockType::AIR
        }
    }

    /// Heights for the 16x16 columns under chunk column `(chunk_x, chunk_z)`.
    pub fn column_heights(&mut self, chunk_x: i32, chunk_z: i32) -> ColumnHeights {
        if let Some(heights) = self.height_cache.get(&(chunk_x, chunk_z)) {
            return Arc::clone(heights);
        }

        let origin_x = chunk_x * CHUNK_DIMENSION;
        let origin_z = chunk_z * CHUNK_DIMENSION;
        let heights: ColumnHeights = (0..CHUNK_PLANE_SIZE)
            .map(|i| {
                let x = i % CHUNK_DIMENSION;
                let z = i / CHUNK_DIMENSION;
                self.height_at(origin_x + x, origin_z + z)
            })
            .collect();
        self.height_cache
            .put((chunk_x, chunk_z), Arc::clone(&heights));
        heights
    }

    /// Generates the raw block buffer for the chunk at `position`.
    pub fn generate_blocks(&mut self, position: Point3<i32>) -> Vec<BlockTypeSize> {
        let heights = self.column_heights(position.x, position.z);
        let origin_y = position.y * CHUNK_DIMENSION;

        let mut blocks = vec![BlockType::AIR as BlockTypeSize; CHUNK_SIZE as usize];
        for z in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                let height = heights[(x + z * CHUNK_DIMENSION) as usize];
                for y in 0..CHUNK_DIMENSION {
                    let block_type = self.block_for(origin_y + y, height);
                    if block_type != BlockType::AIR {
                        let index = x + y * CHUNK_DIMENSION + z * CHUNK_PLANE_SIZE;
                        blocks[index as usize] = block_type as BlockTypeSize;
                    }
                }
            }
        }
        blocks
    }

    /// Generates a complete chunk at `position`. Its light buffer is empty.
    pub fn generate(&mut self, position: Point3<i32>) -> Chunk {
        let blocks = self.generate_blocks(position);
        let mut chunk = Chunk::empty(position);
        for (index, code) in blocks.into_iter().enumerate() {
            if let Some(block_type) = BlockType::from_block_type_int(code) {
                let local = Chunk::position_of_index(index);
                chunk.set(local.x, local.y, local.z, block_type);
            }
        }
        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> TerrainGenerator {
        TerrainGenerator::new(WorldGenConfig::default())
    }

    #[test]
    fn generation_is_deterministic_across_instances() {
        let mut a = generator();
        let mut b = generator();
        for position in [
            Point3::new(0, 0, 0),
            Point3::new(-3, 1, 7),
            Point3::new(12, 0, -40),
        ] {
            assert_eq!(a.generate_blocks(position), b.generate_blocks(position));
        }
    }

    #[test]
    fn cache_does_not_change_output() {
        let mut warm = generator();
        // Warm the cache with the whole vertical stack first.
        for y in 0..3 {
            warm.generate_blocks(Point3::new(2, y, -1));
        }
        let mut cold = generator();
        assert_eq!(
            warm.generate_blocks(Point3::new(2, 1, -1)),
            cold.generate_blocks(Point3::new(2, 1, -1))
        );
    }

    #[test]
    fn layering_follows_the_column_height() {
        let gen = generator();
        let floor = gen.config().floor_y;
        assert_eq!(gen.block_for(floor, 12), BlockType::BEDROCK);
        assert_eq!(gen.block_for(floor - 5, 12), BlockType::BEDROCK);
        assert_eq!(gen.block_for(8, 12), BlockType::STONE);
        assert_eq!(gen.block_for(9, 12), BlockType::DIRT);
        assert_eq!(gen.block_for(11, 12), BlockType::DIRT);
        assert_eq!(gen.block_for(12, 12), BlockType::GRASS);
        assert_eq!(gen.block_for(13, 12), BlockType::AIR);
    }

    #[test]
    fn low_columns_get_sand_and_water() {
        let gen = generator();
        // Sea level is 5; a column at height 3 is underwater.
        assert_eq!(gen.block_for(3, 3), BlockType::SAND);
        assert_eq!(gen.block_for(4, 3), BlockType::WATER);
        assert_eq!(gen.block_for(5, 3), BlockType::WATER);
        assert_eq!(gen.block_for(6, 3), BlockType::AIR);
        assert_eq!(gen.block_for(5, 5), BlockType::SAND);
    }

    #[test]
    fn floor_layer_is_bedrock_everywhere() {
        let mut gen = generator();
        let chunk = gen.generate(Point3::new(4, 0, 4));
        for z in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                assert_eq!(chunk.get(x, 0, z), BlockType::BEDROCK);
            }
        }
    }

    #[test]
    fn deep_chunk_contains_no_air() {
        let mut gen = TerrainGenerator::new(WorldGenConfig {
            sea_level: 40.0,
            terrain_height: 4.0,
            floor_y: -100,
            ..Default::default()
        });
        // Heights lie in 36..=44; chunk y = 1 spans 16..=31, under every surface.
        let chunk = gen.generate(Point3::new(0, 1, 0));
        assert_eq!(chunk.count_blocks(BlockType::AIR), 0);
        assert_eq!(chunk.count_blocks(BlockType::STONE), CHUNK_SIZE as usize);
    }

    #[test]
    fn seed_12345_origin_chunk_has_a_surface() {
        let mut gen = generator();
        let chunk = gen.generate(Point3::new(0, 0, 0));
        let surface = chunk.count_blocks(BlockType::GRASS) + chunk.count_blocks(BlockType::SAND);
        assert!(surface > 0);
        assert!(chunk.count_blocks(BlockType::AIR) > 0);
        for z in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                let h = gen.height_at(x, z);
                assert!((-6..=16).contains(&h), "height {h} outside amplitude band");
            }
        }
    }

    #[test]
    fn generate_matches_generate_blocks() {
        let mut gen = generator();
        let position = Point3::new(-1, 0, 2);
        let chunk = gen.generate(position);
        assert_eq!(chunk.blocks(), gen.generate_blocks(position).as_slice());
    }
}
