//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which generates the block
//! buffer of one chunk on a worker thread. The manager publishes one task for
//! every chunk that enters the render window.

use cgmath::Point3;

use crate::{
    config::WorldGenConfig,
    engine_state::{
        task_management::task::Task,
        voxels::{block::BlockTypeSize, terrain::TerrainGenerator},
    },
};

/// A task that generates chunk data on a worker.
///
/// The task carries a snapshot of the world configuration, so a configuration
/// change only affects tasks published after it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkGenerationTask {
    /// The position of the chunk to generate (in chunk coordinates)
    pub position: Point3<i32>,
    /// Generator parameters at the time the request was made
    pub config: WorldGenConfig,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the chunk to generate
    /// * `config` - Generator parameters to use
    pub fn new(position: Point3<i32>, config: WorldGenConfig) -> Self {
        ChunkGenerationTask { position, config }
    }
}

impl Task for ChunkGenerationTask {
    /// Each worker keeps its own generator, replaced when a task arrives with
    /// a different configuration.
    type Context = Option<TerrainGenerator>;
    type Output = Vec<BlockTypeSize>;

    fn process(&self, generator: &mut Self::Context) -> Self::Output {
        let stale = generator
            .as_ref()
            .map_or(true, |generator| *generator.config() != self.config);
        if stale {
            *generator = Some(TerrainGenerator::new(self.config));
        }
        generator
            .get_or_insert_with(|| TerrainGenerator::new(self.config))
            .generate_blocks(self.position)
    }
}
