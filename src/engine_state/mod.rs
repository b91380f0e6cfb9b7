//! # Engine State Module
//!
//! The top-level state of the voxel world and the subsystems it coordinates.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns the chunk manager and the current viewpoint
//! * `lighting` - Sun and point-light computation, day cycle
//! * `rendering` - Meshing and the scene sink meshes are reported to
//! * `task_management` - The worker pool chunk generation runs on
//! * `voxels` - Blocks, chunks, terrain generation and chunk streaming
//!
//! ## Frame Flow
//!
//! Each frame the host calls `update` with the elapsed time and the new
//! viewpoint, then `process_tasks` to install finished chunks.

use std::time::Duration;

use cgmath::Point3;
use log::info;

use rendering::{meshing::MeshStats, DrawList, SceneSink};
use voxels::{spawn::find_spawn_point, world::ChunkManager};

use crate::{config::EngineConfig, error::EngineError};

pub mod lighting;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// The main state container for the voxel world.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use voxel_world::{config::EngineConfig, engine_state::EngineState};
///
/// let mut engine_state = EngineState::with_draw_list(EngineConfig::default()).unwrap();
/// let spawn = engine_state.spawn(Duration::from_secs(5));
///
/// // Main loop
/// loop {
///     engine_state.update(Duration::from_millis(16), spawn);
///     engine_state.process_tasks();
/// }
/// ```
pub struct EngineState<S: SceneSink = DrawList> {
    /// Every resident chunk, the worker pool and the lighting state
    pub chunk_manager: ChunkManager<S>,
    /// Last viewpoint handed to `update`
    viewpoint: Point3<f32>,
}

impl EngineState<DrawList> {
    /// Creates an engine that records meshes in a [`DrawList`].
    pub fn with_draw_list(config: EngineConfig) -> Result<Self, EngineError> {
        Self::new(config, DrawList::new())
    }
}

impl<S: SceneSink> EngineState<S> {
    /// Creates a new engine state reporting meshes to `scene`.
    ///
    /// # Errors
    /// Fails if the configuration is invalid or a worker cannot be spawned.
    pub fn new(config: EngineConfig, scene: S) -> Result<Self, EngineError> {
        Ok(Self {
            chunk_manager: ChunkManager::with_scene(config, scene)?,
            viewpoint: Point3::new(0.0, 0.0, 0.0),
        })
    }

    /// Finds a spawn point, moves the viewpoint there and waits up to
    /// `timeout` for the surrounding chunks.
    ///
    /// # Returns
    /// The spawn position.
    pub fn spawn(&mut self, timeout: Duration) -> Point3<f32> {
        let spawn = find_spawn_point(&mut self.chunk_manager);
        self.viewpoint = spawn;
        let loaded = self.chunk_manager.load_around_blocking(spawn, timeout);
        info!("Spawned at {:?} with {} chunks loaded around it", spawn, loaded);
        spawn
    }

    /// Advances the day cycle by `wait_duration` and streams chunks around `viewpoint`.
    pub fn update(&mut self, wait_duration: Duration, viewpoint: Point3<f32>) {
        self.chunk_manager.advance_time(wait_duration.as_secs_f32());
        self.viewpoint = viewpoint;
        self.chunk_manager.update_viewpoint(viewpoint);
    }

    /// Processes completed and queued tasks.
    ///
    /// # Returns
    /// Number of chunks that became resident.
    pub fn process_tasks(&mut self) -> usize {
        self.chunk_manager.process_completed()
    }

    /// The last viewpoint passed to `update`.
    pub fn viewpoint(&self) -> Point3<f32> {
        self.viewpoint
    }

    /// Geometry totals across every resident chunk.
    pub fn mesh_stats(&self) -> MeshStats {
        self.chunk_manager.mesh_stats()
    }
}
