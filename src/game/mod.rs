//! Game simulation
//!
//! Everything that moves: dynamic bodies, the collision resolvers, the
//! physics integrator, the mode gate and the runtime that sequences them
//! once per tick.
//!
//! Key concepts:
//! - DynamicBody: AABB with velocity, integrated by physics
//! - Command: the only way editor and input code mutate the simulation
//! - Event: what happened during a tick, read by the host afterwards
//! - TickContext: per-tick mode and presentation flags, never global

pub mod body;
pub mod collision;
pub mod command;
pub mod event;
pub mod mode;
pub mod physics;
pub mod runtime;

// Re-export main types
pub use body::{AnimationHint, BodySnapshot, ControlIntent, DynamicBody, Enemy, EnemyState, Facing};
pub use collision::{resolve_obstacles, resolve_platforms, CollisionResult, Side};
pub use command::{Command, CommandError};
pub use event::{BodyRef, EventQueue, Events};
pub use mode::{Mode, SessionKind, TickContext};
pub use physics::{PhysicsSettings, REFERENCE_FRAME_SECS};
pub use runtime::{AutoScrollTask, Effect, EffectSender, GameRuntime};
