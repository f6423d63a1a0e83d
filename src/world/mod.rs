//! World module - scene-based level data
//!
//! - Axis-aligned geometry and static bodies (platforms, obstacles)
//! - Scenes with boundaries, spawn points and transition zones
//! - The scene graph that owns the active-scene pointer
//! - RON level files (plain or brotli-compressed)

mod geometry;
mod level;
mod sample;
mod scene;

pub use geometry::*;
pub use level::*;
pub use sample::*;
pub use scene::*;
