//! Dynamic bodies
//!
//! The controlled character and enemies are plain AABBs with a velocity.
//! During simulation only the integrator and the resolvers write to them;
//! in edit mode editor commands move them directly.

use serde::{Serialize, Deserialize};
use crate::world::{Rect, Vec2};

/// Horizontal facing, kept for the animation collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// A moving AABB integrated by the physics step
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicBody {
    /// Top-left corner
    pub position: Vec2,
    pub size: Vec2,
    /// Pixels per reference frame
    pub velocity: Vec2,
    /// Resting on a platform, an obstacle top or the scene floor
    pub grounded: bool,
    /// Last position where the body was standing on something
    pub last_valid: Option<Vec2>,
    pub facing: Facing,
}

impl DynamicBody {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            velocity: Vec2::ZERO,
            grounded: false,
            last_valid: None,
            facing: Facing::default(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.position, self.size)
    }

    /// Reference point used for transition zones and camera tracking
    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.y
    }

    /// Teleport and stop (spawns, respawns, editor moves)
    pub fn place(&mut self, position: Vec2) {
        self.position = position;
        self.velocity = Vec2::ZERO;
        self.grounded = false;
    }

    pub fn snapshot(&self) -> BodySnapshot {
        BodySnapshot {
            position: self.position,
            velocity: self.velocity,
            grounded: self.grounded,
            facing: self.facing,
            animation: AnimationHint::from_body(self),
        }
    }
}

/// Coarse animation state derived from physics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationHint {
    Idle,
    Run,
    Jump,
    Fall,
}

impl AnimationHint {
    fn from_body(body: &DynamicBody) -> Self {
        if body.grounded {
            if body.velocity.x.abs() > 0.01 { AnimationHint::Run } else { AnimationHint::Idle }
        } else if body.velocity.y < 0.0 {
            AnimationHint::Jump
        } else {
            AnimationHint::Fall
        }
    }
}

/// Read-only view of a body for rendering/animation collaborators
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub position: Vec2,
    pub velocity: Vec2,
    pub grounded: bool,
    pub facing: Facing,
    pub animation: AnimationHint,
}

/// Player movement intent sampled once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlIntent {
    /// -1.0 (left) to 1.0 (right)
    pub move_x: f32,
    pub jump: bool,
}

/// AI state written by the enemy collaborator and read by the core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnemyState {
    /// Not simulated at all (off-screen, not yet triggered)
    #[default]
    Dormant,
    Idle,
    Patrol,
    Chase,
}

/// An enemy: a dynamic body plus the AI's latest decision
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: u32,
    pub body: DynamicBody,
    pub state: EnemyState,
    /// Horizontal velocity requested by the AI (pixels per reference frame)
    pub desired_vx: f32,
}

impl Enemy {
    pub fn new(id: u32, position: Vec2, size: Vec2) -> Self {
        Self {
            id,
            body: DynamicBody::new(position, size),
            state: EnemyState::default(),
            desired_vx: 0.0,
        }
    }

    /// Whether the physics step runs for this enemy
    pub fn is_simulated(&self) -> bool {
        self.state != EnemyState::Dormant
    }
}
