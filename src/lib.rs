//! Sidescroll: a 2D side-scrolling platformer core with a live level editor
//!
//! - Frame-rate independent physics for AABB bodies
//! - One-sided platforms and solid obstacles
//! - Scenes connected by transition zones
//! - A tracking/free camera over a scaled viewport
//!
//! The host (window, input, drawing) lives in the binary and drives a
//! [`game::GameRuntime`] once per frame.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod game;
pub mod view;
pub mod world;
