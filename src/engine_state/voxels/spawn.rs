//! # Spawn Point Search
//!
//! Finds a standable surface near the world origin. Columns are visited on a
//! square spiral of growing radius around `(0, 0)`; the first column whose
//! topmost non-air block is solid with two air blocks above it wins. Chunks
//! the search touches are force-loaded over the whole vertical band.

use cgmath::Point3;
use log::{info, warn};

use crate::engine_state::{lighting::BlockSource, rendering::SceneSink};

use super::{
    block::block_type::BlockType,
    chunk::CHUNK_DIMENSION,
    world::{block_to_chunk, ChunkManager},
};

/// Air blocks required above the surface block.
const HEADROOM: i32 = 2;

/// Column offsets on a square spiral: `(0, 0)` first, then each ring of
/// Chebyshev radius 1, 2, ... up to `radius`, walked in a fixed order.
pub fn spiral_columns(radius: i32) -> impl Iterator<Item = (i32, i32)> {
    (0..=radius.max(0)).flat_map(|r| -> Box<dyn Iterator<Item = (i32, i32)>> {
        if r == 0 {
            return Box::new(std::iter::once((0, 0)));
        }
        let south = (-r..=r).map(move |x| (x, -r));
        let east = (-r + 1..=r).map(move |z| (r, z));
        let north = (-r..r).rev().map(move |x| (x, r));
        let west = (-r + 1..r).rev().map(move |z| (-r, z));
        Box::new(south.chain(east).chain(north).chain(west))
    })
}

/// World Y of the standable surface block of column `(x, z)`, if any.
fn standable_surface<S: SceneSink>(manager: &mut ChunkManager<S>, x: i32, z: i32) -> Option<i32> {
    let (min_chunk_y, max_chunk_y) = (manager.config().min_chunk_y, manager.config().max_chunk_y);
    let (chunk, _) = block_to_chunk(x, 0, z);
    for chunk_y in min_chunk_y..=max_chunk_y {
        manager.force_load(Point3::new(chunk.x, chunk_y, chunk.z));
    }

    let top = (max_chunk_y + 1) * CHUNK_DIMENSION - 1;
    let bottom = min_chunk_y * CHUNK_DIMENSION;
    let surface = (bottom..=top)
        .rev()
        .find(|&y| !manager.block_at(x, y, z).is_air())?;

    // Headroom must lie inside the loaded band.
    if surface + HEADROOM > top {
        return None;
    }
    let surface_block = manager.block_at(x, surface, z);
    let headroom = (1..=HEADROOM).all(|dy| manager.block_at(x, surface + dy, z).is_air());
    (surface_block.is_solid() && surface_block != BlockType::WATER && headroom).then_some(surface)
}

/// Searches for a spawn point and returns the position to stand at: the
/// centre of the top face of the chosen surface block.
///
/// Falls back to `(0.5, safe_spawn_height, 0.5)` when no column within
/// `spawn_search_radius` qualifies.
pub fn find_spawn_point<S: SceneSink>(manager: &mut ChunkManager<S>) -> Point3<f32> {
    let radius = manager.config().spawn_search_radius;
    for (x, z) in spiral_columns(radius) {
        if let Some(y) = standable_surface(manager, x, z) {
            let spawn = Point3::new(x as f32 + 0.5, (y + 1) as f32, z as f32 + 0.5);
            info!("Spawn point found at {:?}", spawn);
            return spawn;
        }
    }

    let fallback = Point3::new(0.5, manager.config().safe_spawn_height, 0.5);
    warn!(
        "No standable column within {} blocks of the origin, spawning at {:?}",
        radius, fallback
    );
    fallback
}
