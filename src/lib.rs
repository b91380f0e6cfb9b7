#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! The world subsystem of a block-based voxel engine: procedural terrain,
//! chunk streaming around a moving viewpoint, per-block lighting from a
//! moving sun and point lights, and surface meshing.
//!
//! ## Key Modules
//!
//! * `config` - Validated, serde-backed configuration with defaults
//! * `engine_state` - Chunks, terrain, lighting, meshing and the worker pool
//! * `error` - The error types surfaced by configuration and workers
//!
//! ## Architecture
//!
//! A single control thread owns every chunk. Terrain generation runs on a
//! pool of worker threads that only ever return raw block buffers; the
//! control thread installs them, computes lighting, builds meshes and
//! reports them to a [`SceneSink`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! fn main() {
//!     voxel_world::run();
//! }
//! ```

use std::time::Duration;

use cgmath::{Point3, Vector3};
use log::{error, info};

pub mod config;
pub mod engine_state;
pub mod error;

pub use config::EngineConfig;
pub use engine_state::{
    lighting::{BlockSource, LightSource},
    rendering::{meshing::MeshingStrategy, DrawList, NullScene, SceneSink},
    voxels::{block::block_type::BlockType, chunk::Chunk, world::ChunkManager},
    EngineState,
};
pub use error::EngineError;

/// How long `run` waits for the spawn area to load.
pub const SPAWN_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Simulated frames of the demo walk.
const DEMO_FRAMES: usize = 600;
/// Simulated frame duration.
const DEMO_FRAME_TIME: Duration = Duration::from_millis(16);
/// Blocks moved along +X per simulated frame.
const DEMO_WALK_SPEED: f32 = 0.25;

/// Runs a headless walk through the world.
///
/// Reads the config from the path given as the first argument, or uses the
/// defaults. Finds a spawn point, walks the viewpoint east while the day
/// advances and reports what was streamed.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match std::env::args().nth(1) {
        Some(path) => match EngineConfig::from_path(&path) {
            Ok(config) => config,
            Err(err) => {
                error!("Invalid config '{}': {}", path, err);
                return;
            }
        },
        None => EngineConfig::default(),
    };

    let mut state = match EngineState::with_draw_list(config) {
        Ok(state) => state,
        Err(err) => {
            error!("Failed to start the engine: {}", err);
            return;
        }
    };

    let spawn = state.spawn(SPAWN_LOAD_TIMEOUT);
    let step = Vector3::new(DEMO_WALK_SPEED, 0.0, 0.0);
    let mut viewpoint: Point3<f32> = spawn;
    for _ in 0..DEMO_FRAMES {
        viewpoint += step;
        state.update(DEMO_FRAME_TIME, viewpoint);
        state.process_tasks();
        std::thread::sleep(DEMO_FRAME_TIME);
    }

    let manager = &state.chunk_manager;
    let stats = state.mesh_stats();
    info!(
        "Walked to {:?} at {:.2}h: {} chunks resident, {} loading, {} faces, {} vertices",
        viewpoint,
        manager.time_of_day().time_hours,
        manager.chunk_count(),
        manager.loading_count(),
        stats.faces,
        stats.vertices
    );
    info!(
        "Scene holds {} chunk meshes after {} uploads",
        manager.scene().len(),
        manager.scene().uploads()
    );
}
