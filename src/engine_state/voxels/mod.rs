//! # Voxel World
//!
//! Block data and the machinery that streams it in and out around a
//! viewpoint.
//!
//! ## Architecture
//!
//! * **Block**: block types, their static properties and the six face directions
//! * **Chunk**: a 16³ cube of blocks with its light buffer and cached mesh
//! * **Terrain**: deterministic noise-based generation of chunk contents
//! * **Tasks**: the generation task executed on the worker pool
//! * **World**: the `ChunkManager`, owner of every resident chunk
//! * **Spawn**: the spiral search for a safe starting position
//!
//! ## Data Flow
//!
//! 1. The viewpoint enters a new chunk and the manager requests missing chunks
//! 2. Workers generate raw block buffers from the terrain generator
//! 3. The control thread installs results, lights them and builds meshes
//! 4. Meshes are registered with the scene sink; evicted chunks are removed

pub mod block;
pub mod chunk;
pub mod spawn;
pub mod tasks;
pub mod terrain;
pub mod world;
