//! # Voxel World Entry Point
//!
//! Calls into the library's `run()` function, which streams the world
//! around a walking viewpoint without a window.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- world.json
//! ```

fn main() {
    voxel_world::run();
}
