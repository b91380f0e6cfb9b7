//! # Voxel Task System
//!
//! Tasks related to voxel world generation. They run on the worker pool so
//! that the control thread never generates terrain during streaming.

pub mod chunk_generation_task;
