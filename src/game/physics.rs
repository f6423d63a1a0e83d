//! Physics integrator
//!
//! Tuning constants are authored per reference frame (px/frame, px/frame²).
//! Each tick converts the elapsed time into a frame scale
//! (`dt / reference_frame_secs`) and multiplies every velocity and position
//! delta by it, so motion speed does not depend on the host's frame rate.
//!
//! Per body and tick: gravity → position → displacement sanity check →
//! platforms → obstacles → scene boundary clamp. Transition checks and the
//! fall-out-of-world respawn are sequenced by the runtime.

use serde::{Serialize, Deserialize};
use tracing::{info, warn};

use crate::world::{Boundary, Scene, Vec2};
use super::body::{ControlIntent, DynamicBody, Facing};
use super::collision::{resolve_obstacles, resolve_platforms, CollisionResult};

/// Nominal frame duration the tuning constants were authored against
pub const REFERENCE_FRAME_SECS: f32 = 1.0 / 60.0;

/// Physics tuning, per reference frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Downward acceleration (px/frame²)
    pub gravity: f32,
    /// Maximum fall speed (px/frame)
    pub terminal_velocity: f32,
    /// Horizontal speed at full stick (px/frame)
    pub walk_speed: f32,
    /// Upward speed applied by a jump (px/frame)
    pub jump_velocity: f32,
    /// Frame duration the values above assume (seconds)
    pub reference_frame_secs: f32,
    /// Longest dt honoured in one tick; longer stalls are clamped
    pub max_frame_secs: f32,
    /// Single-tick displacement (px) that is reported as an anomaly
    pub large_displacement: f32,
    /// Bodies whose top goes below this Y are respawned
    pub fall_threshold: f32,
    /// Respawn point when a body has never stood anywhere
    pub default_respawn: Vec2,
    /// Size of the controlled body
    pub player_size: Vec2,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            terminal_velocity: 15.0,
            walk_speed: 4.0,
            jump_velocity: 11.0,
            reference_frame_secs: REFERENCE_FRAME_SECS,
            max_frame_secs: 0.25,
            large_displacement: 200.0,
            fall_threshold: 2000.0,
            default_respawn: Vec2::new(100.0, 100.0),
            player_size: Vec2::new(32.0, 48.0),
        }
    }
}

impl PhysicsSettings {
    /// Convert elapsed seconds into reference frames.
    ///
    /// Non-finite or negative durations count as zero; stalls are clamped
    /// to `max_frame_secs` so a hitch cannot tunnel bodies through floors.
    /// A non-positive or non-finite `max_frame_secs` disables the clamp.
    pub fn frame_scale(&self, dt: f32) -> f32 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0.0;
        }
        if !self.reference_frame_secs.is_finite() || self.reference_frame_secs <= 0.0 {
            return 0.0;
        }
        let dt = if self.max_frame_secs.is_finite() && self.max_frame_secs > 0.0 {
            dt.min(self.max_frame_secs)
        } else {
            dt
        };
        dt / self.reference_frame_secs
    }
}

/// What happened to a body during one step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    pub collision: CollisionResult,
    /// Integrated displacement before any correction
    pub displacement: Vec2,
    /// Displacement exceeded `large_displacement`
    pub large_displacement: bool,
    /// The scene boundary had to clamp the body
    pub clamped: bool,
}

/// Turn the player's intent into velocity. Jumping requires being grounded.
pub fn apply_intent(body: &mut DynamicBody, intent: ControlIntent, settings: &PhysicsSettings) {
    let move_x = if intent.move_x.is_finite() { intent.move_x.clamp(-1.0, 1.0) } else { 0.0 };
    body.velocity.x = move_x * settings.walk_speed;
    if move_x < 0.0 {
        body.facing = Facing::Left;
    } else if move_x > 0.0 {
        body.facing = Facing::Right;
    }

    if intent.jump && body.grounded {
        body.velocity.y = -settings.jump_velocity;
        body.grounded = false;
    }
}

/// Advance one body through a tick against the given scene
pub fn step_body(
    body: &mut DynamicBody,
    scene: &Scene,
    settings: &PhysicsSettings,
    frame_scale: f32,
) -> StepReport {
    let before = body.position;
    let previous_top = body.position.y;

    body.velocity.y = (body.velocity.y + settings.gravity * frame_scale).min(settings.terminal_velocity);
    body.position = body.position + body.velocity * frame_scale;

    let displacement = body.position - before;
    let large_displacement = displacement.len() > settings.large_displacement;
    if large_displacement {
        warn!(dx = displacement.x, dy = displacement.y, frame_scale, "large single-tick displacement");
    }

    body.grounded = false;

    let collision = resolve_platforms(body, previous_top, scene.platforms())
        .merge(resolve_obstacles(body, scene.obstacles()));

    let clamped = match scene.boundary {
        Some(boundary) => clamp_to_boundary(body, &boundary),
        None => false,
    };

    StepReport { collision, displacement, large_displacement, clamped }
}

/// Keep the body inside the scene rectangle.
///
/// Clamping an edge zeroes the velocity on that axis; clamping the bottom
/// edge also grounds the body (the boundary floor acts as ground).
pub fn clamp_to_boundary(body: &mut DynamicBody, boundary: &Boundary) -> bool {
    let mut clamped = false;
    let max_x = (boundary.right - body.size.x).max(boundary.left);
    let max_y = (boundary.bottom - body.size.y).max(boundary.top);

    if body.position.x < boundary.left {
        body.position.x = boundary.left;
        body.velocity.x = 0.0;
        clamped = true;
    } else if body.position.x > max_x {
        body.position.x = max_x;
        body.velocity.x = 0.0;
        clamped = true;
    }

    if body.position.y < boundary.top {
        body.position.y = boundary.top;
        body.velocity.y = 0.0;
        clamped = true;
    } else if body.position.y > max_y {
        body.position.y = max_y;
        body.velocity.y = 0.0;
        body.grounded = true;
        clamped = true;
    }

    clamped
}

/// Respawn a body that fell below the world.
///
/// Returns the respawn position if one happened.
pub fn respawn_if_fallen(body: &mut DynamicBody, settings: &PhysicsSettings) -> Option<Vec2> {
    if body.position.y <= settings.fall_threshold {
        return None;
    }
    let target = body.last_valid.unwrap_or(settings.default_respawn);
    info!(from_y = body.position.y, x = target.x, y = target.y, "body fell out of the world, respawning");
    body.place(target);
    Some(target)
}

/// Save the current position as the respawn point if the body is standing
pub fn remember_valid_position(body: &mut DynamicBody) {
    if body.grounded {
        body.last_valid = Some(body.position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Rect, StaticBody};

    fn no_gravity() -> PhysicsSettings {
        PhysicsSettings { gravity: 0.0, ..PhysicsSettings::default() }
    }

    fn body(x: f32, y: f32) -> DynamicBody {
        DynamicBody::new(Vec2::new(x, y), Vec2::new(20.0, 40.0))
    }

    #[test]
    fn test_frame_scale() {
        let settings = PhysicsSettings::default();
        assert!((settings.frame_scale(REFERENCE_FRAME_SECS) - 1.0).abs() < 1e-5);
        assert!((settings.frame_scale(2.0 * REFERENCE_FRAME_SECS) - 2.0).abs() < 1e-5);
        assert_eq!(settings.frame_scale(-1.0), 0.0);
        assert_eq!(settings.frame_scale(f32::NAN), 0.0);
        assert!((settings.frame_scale(10.0) - 15.0).abs() < 1e-3);
    }

    #[test]
    fn test_frame_scale_without_stall_clamp() {
        for max_frame_secs in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let settings = PhysicsSettings { max_frame_secs, ..PhysicsSettings::default() };
            assert!((settings.frame_scale(2.0 * REFERENCE_FRAME_SECS) - 2.0).abs() < 1e-4);
            assert!(settings.frame_scale(1.0) > 0.0);
        }

        let broken = PhysicsSettings { reference_frame_secs: f32::NAN, ..PhysicsSettings::default() };
        assert_eq!(broken.frame_scale(REFERENCE_FRAME_SECS), 0.0);
    }

    #[test]
    fn test_doubling_dt_doubles_displacement() {
        let scene = Scene::new("open");
        let settings = no_gravity();

        let mut a = body(0.0, 0.0);
        a.velocity = Vec2::new(3.0, -1.5);
        let mut b = a.clone();

        let da = step_body(&mut a, &scene, &settings, settings.frame_scale(1.0 / 60.0)).displacement;
        let db = step_body(&mut b, &scene, &settings, settings.frame_scale(2.0 / 60.0)).displacement;

        assert!((db.x - 2.0 * da.x).abs() < 1e-4);
        assert!((db.y - 2.0 * da.y).abs() < 1e-4);
    }

    #[test]
    fn test_horizontal_motion_is_frame_rate_independent_with_gravity() {
        let scene = Scene::new("open");
        let settings = PhysicsSettings::default();
        let mut a = body(0.0, 0.0);
        a.velocity.x = 4.0;
        let mut b = a.clone();

        step_body(&mut a, &scene, &settings, settings.frame_scale(1.0 / 30.0));
        step_body(&mut b, &scene, &settings, settings.frame_scale(1.0 / 60.0));
        step_body(&mut b, &scene, &settings, settings.frame_scale(1.0 / 60.0));

        assert!((a.position.x - b.position.x).abs() < 1e-4);
    }

    #[test]
    fn test_gravity_and_terminal_velocity() {
        let scene = Scene::new("open");
        let settings = PhysicsSettings::default();
        let mut b = body(0.0, 0.0);
        step_body(&mut b, &scene, &settings, 1.0);
        assert!((b.velocity.y - 0.5).abs() < 1e-6);
        assert!((b.position.y - 0.5).abs() < 1e-6);

        b.velocity.y = 14.9;
        step_body(&mut b, &scene, &settings, 1.0);
        assert_eq!(b.velocity.y, settings.terminal_velocity);
    }

    #[test]
    fn test_lands_on_platform_through_step() {
        let scene = Scene::new("s").with_body(StaticBody::platform(1, Rect::new(0.0, 100.0, 300.0, 10.0)));
        let settings = PhysicsSettings::default();
        let mut b = body(10.0, 58.0);
        b.velocity.y = 5.0;

        let report = step_body(&mut b, &scene, &settings, 1.0);
        assert!(report.collision.landed);
        assert!(b.grounded);
        assert_eq!(b.bottom(), 100.0);
    }

    #[test]
    fn test_obstacle_push_overrides_platform_landing() {
        let scene = Scene::new("s")
            .with_body(StaticBody::platform(1, Rect::new(0.0, 100.0, 300.0, 10.0)))
            .with_body(StaticBody::obstacle(2, Rect::new(100.0, 60.0, 50.0, 100.0)));
        let settings = PhysicsSettings::default();
        let mut b = body(82.0, 58.0);
        b.velocity = Vec2::new(3.0, 5.0);

        let report = step_body(&mut b, &scene, &settings, 1.0);

        // Landed on the platform, then shoved left out of the obstacle
        assert!(report.collision.landed);
        assert!(report.collision.hit_wall);
        assert_eq!(b.position, Vec2::new(80.0, 60.0));
        assert_eq!(b.velocity, Vec2::ZERO);
        assert!(b.grounded);
    }

    #[test]
    fn test_boundary_clamp_overrides_obstacle_push() {
        let scene = Scene::new("s")
            .with_boundary(Boundary::new(0.0, 0.0, 400.0, 300.0))
            .with_body(StaticBody::obstacle(1, Rect::new(5.0, 100.0, 100.0, 100.0)));
        let settings = no_gravity();
        let mut b = body(10.0, 150.0);
        b.velocity.x = -1.0;

        let report = step_body(&mut b, &scene, &settings, 1.0);

        // The obstacle pushes out to x = -15; the boundary has the last word
        assert!(report.collision.hit_wall);
        assert!(report.clamped);
        assert_eq!(b.position, Vec2::new(0.0, 150.0));
        assert_eq!(b.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_large_displacement_flagged_not_corrected() {
        let scene = Scene::new("open");
        let settings = no_gravity();
        let mut b = body(0.0, 0.0);
        b.velocity.x = 500.0;
        let report = step_body(&mut b, &scene, &settings, 1.0);
        assert!(report.large_displacement);
        assert_eq!(b.position.x, 500.0);
    }

    #[test]
    fn test_boundary_clamp() {
        let boundary = Boundary::new(0.0, 0.0, 400.0, 300.0);

        let mut b = body(-5.0, 280.0);
        b.velocity = Vec2::new(-2.0, 3.0);
        assert!(clamp_to_boundary(&mut b, &boundary));
        assert_eq!(b.position, Vec2::new(0.0, 260.0));
        assert_eq!(b.velocity, Vec2::ZERO);
        assert!(b.grounded);

        let mut b = body(390.0, -10.0);
        b.velocity = Vec2::new(2.0, -3.0);
        assert!(clamp_to_boundary(&mut b, &boundary));
        assert_eq!(b.position, Vec2::new(380.0, 0.0));
        assert!(!b.grounded);

        let mut b = body(100.0, 100.0);
        assert!(!clamp_to_boundary(&mut b, &boundary));
    }

    #[test]
    fn test_respawn_at_last_valid_position() {
        let settings = PhysicsSettings::default();
        let mut b = body(50.0, 2100.0);
        b.velocity = Vec2::new(3.0, 12.0);
        b.last_valid = Some(Vec2::new(40.0, 300.0));

        assert_eq!(respawn_if_fallen(&mut b, &settings), Some(Vec2::new(40.0, 300.0)));
        assert_eq!(b.position, Vec2::new(40.0, 300.0));
        assert_eq!(b.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_respawn_default_without_history() {
        let settings = PhysicsSettings::default();
        let mut b = body(50.0, 2100.0);
        assert_eq!(respawn_if_fallen(&mut b, &settings), Some(settings.default_respawn));

        let mut safe = body(50.0, 1999.0);
        assert_eq!(respawn_if_fallen(&mut safe, &settings), None);
    }

    #[test]
    fn test_jump_requires_ground() {
        let settings = PhysicsSettings::default();
        let mut b = body(0.0, 0.0);
        apply_intent(&mut b, ControlIntent { move_x: -1.0, jump: true }, &settings);
        assert_eq!(b.velocity, Vec2::new(-4.0, 0.0));
        assert_eq!(b.facing, Facing::Left);

        b.grounded = true;
        apply_intent(&mut b, ControlIntent { move_x: 0.0, jump: true }, &settings);
        assert_eq!(b.velocity.y, -11.0);
        assert!(!b.grounded);
    }
}
