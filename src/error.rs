//! # Error Types
//!
//! Errors surfaced by the voxel world. Boundary lookups (out-of-range local
//! coordinates, unloaded chunks) have no error type: they resolve to air.

use std::path::PathBuf;

/// Errors raised while loading or validating an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The load radius is negative or not inside the unload radius.
    #[error(
        "render distance {render} must be non-negative and smaller than unload distance {unload}"
    )]
    InvalidRenderDistance {
        /// Configured `render_distance`.
        render: i32,
        /// Configured `unload_distance`.
        unload: i32,
    },

    /// `min_chunk_y` is above `max_chunk_y`.
    #[error("vertical chunk range {min}..={max} is empty")]
    InvalidVerticalRange {
        /// Lowest resident chunk layer.
        min: i32,
        /// Highest resident chunk layer.
        max: i32,
    },

    /// The brightness curve base is outside (0, 1).
    #[error("brightness base {0} must lie strictly between 0 and 1")]
    InvalidBrightnessBase(f32),

    /// A light level setting is above 15.
    #[error("light level '{name}' is {value}, expected 0..=15")]
    InvalidLightLevel {
        /// Name of the offending setting.
        name: &'static str,
        /// The rejected level.
        value: u8,
    },

    /// Night would be brighter than full sun.
    #[error("night floor {night_floor} exceeds sun intensity {sun_intensity}")]
    NightFloorAboveSun {
        /// Configured `night_floor`.
        night_floor: u8,
        /// Configured `sun_intensity`.
        sun_intensity: u8,
    },

    /// The shadow ray would never sample a cell.
    #[error(
        "shadow ray needs at least one step and a positive distance \
         (steps {steps}, distance {distance})"
    )]
    InvalidShadowRay {
        /// Configured `shadow_steps`.
        steps: u32,
        /// Configured `shadow_max_distance`.
        distance: f32,
    },

    /// The day length is not positive.
    #[error("day length must be positive, got {0}")]
    InvalidDayLength(f32),

    /// The config file could not be read.
    #[error("failed to read config file '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),

    /// The config text is not valid JSON for [`EngineConfig`](crate::config::EngineConfig).
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors that prevent the engine from starting.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The operating system refused to start a worker.
    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}

/// Errors produced while executing a task on a worker thread.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// The task panicked. The worker survives and keeps taking tasks.
    #[error("task panicked on worker {worker}: {message}")]
    Panicked {
        /// Index of the worker that ran the task.
        worker: usize,
        /// The panic payload, when it was a string.
        message: String,
    },

    /// No live worker could accept the task. Carries the last worker tried.
    #[error("worker {0} disconnected")]
    Disconnected(usize),
}

/// Errors raised when rebuilding a chunk from a raw block buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkError {
    /// The buffer does not hold exactly one code per cell.
    #[error("block buffer has {actual} cells, expected {expected}")]
    WrongBufferLength {
        /// Cells in a chunk.
        expected: usize,
        /// Codes in the buffer.
        actual: usize,
    },

    /// A byte does not name any block type.
    #[error("unknown block code {code} at cell {index}")]
    UnknownBlockCode {
        /// The unrecognized byte.
        code: u8,
        /// Its index in the buffer.
        index: usize,
    },
}
