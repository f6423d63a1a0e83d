//! 2D camera
//!
//! The camera position is the world coordinate shown at the top-left corner
//! of the design-space view. Two modes:
//!
//! - `Tracking`: blends toward a target every tick (the runtime feeds it the
//!   controlled body's center)
//! - `Free`: only moved by explicit input (drag, edge scroll, nudges) and
//!   kept inside the configured bounds
//!
//! World ↔ screen conversion combines the camera position with the active
//! viewport: `screen = (world - camera) * scale + offset`.

use super::viewport::Viewport;
use crate::world::Vec2;

/// Camera behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    /// Follow the target
    #[default]
    Tracking,
    /// User-driven
    Free,
}

impl CameraMode {
    pub fn toggled(self) -> Self {
        match self {
            CameraMode::Tracking => CameraMode::Free,
            CameraMode::Free => CameraMode::Tracking,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CameraMode::Tracking => "Tracking",
            CameraMode::Free => "Free",
        }
    }
}

/// Per-axis position limits. `None` leaves that side unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraBounds {
    pub min_x: Option<f32>,
    pub max_x: Option<f32>,
    pub min_y: Option<f32>,
    pub max_y: Option<f32>,
}

impl CameraBounds {
    pub const UNBOUNDED: CameraBounds = CameraBounds { min_x: None, max_x: None, min_y: None, max_y: None };

    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            clamp_axis(p.x, self.min_x, self.max_x),
            clamp_axis(p.y, self.min_y, self.max_y),
        )
    }
}

fn clamp_axis(v: f32, min: Option<f32>, max: Option<f32>) -> f32 {
    let mut v = v;
    if let Some(max) = max {
        v = v.min(max);
    }
    if let Some(min) = min {
        v = v.max(min);
    }
    v
}

/// Snapshot taken when a drag starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    /// Camera position at drag start
    pub initial_position: Vec2,
    /// Pointer position at drag start (presentation space)
    pub initial_pointer: Vec2,
    /// Viewport scale at drag start, so a resize mid-drag does not jump
    pub start_scale: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec2,
    target: Vec2,
    mode: CameraMode,
    /// Blend factor per reference frame (0 or ≥1 disables smoothing)
    smoothing: f32,
    bounds: CameraBounds,
    drag: Option<DragState>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Camera {
    pub fn new(smoothing: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            target: Vec2::ZERO,
            mode: CameraMode::default(),
            smoothing,
            bounds: CameraBounds::UNBOUNDED,
            drag: None,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn set_bounds(&mut self, bounds: CameraBounds) {
        self.bounds = bounds;
        if self.mode == CameraMode::Free {
            self.position = bounds.clamp(self.position);
        }
    }

    /// Switch mode. Any drag in progress is dropped.
    pub fn set_mode(&mut self, mode: CameraMode) {
        if self.mode != mode {
            self.mode = mode;
            self.drag = None;
        }
    }

    pub fn toggle_mode(&mut self) -> CameraMode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    /// Set the desired position.
    ///
    /// In free mode the camera moves there immediately, clamped to bounds.
    /// In tracking mode it is approached by [`Camera::update`].
    pub fn set_target(&mut self, target: Vec2) {
        self.target = target;
        if self.mode == CameraMode::Free {
            self.position = self.bounds.clamp(target);
            self.target = self.position;
        }
    }

    /// Advance tracking by `frame_scale` reference frames. No-op in free mode.
    pub fn update(&mut self, frame_scale: f32) {
        if self.mode != CameraMode::Tracking {
            return;
        }
        let goal = self.bounds.clamp(self.target);
        if self.smoothing <= 0.0 || self.smoothing >= 1.0 {
            self.position = goal;
            return;
        }
        let alpha = 1.0 - (1.0 - self.smoothing).powf(frame_scale.max(0.0));
        self.position = self.position + (goal - self.position) * alpha;
    }

    /// Jump straight to the target, skipping smoothing
    pub fn snap_to_target(&mut self) {
        self.position = self.bounds.clamp(self.target);
    }

    /// Back to the origin with no drag (scene load)
    pub fn reset(&mut self) {
        self.position = Vec2::ZERO;
        self.target = Vec2::ZERO;
        self.drag = None;
    }

    // ========================================================================
    // Free-mode input
    // ========================================================================

    /// Begin a drag at `pointer` (presentation space). Free mode only.
    pub fn start_drag(&mut self, pointer: Vec2, viewport: &Viewport) -> bool {
        if self.mode != CameraMode::Free {
            return false;
        }
        self.drag = Some(DragState {
            initial_position: self.position,
            initial_pointer: pointer,
            start_scale: viewport.scale(),
        });
        true
    }

    /// Move the camera opposite to the pointer so content follows the hand.
    /// The result is kept non-negative on both axes.
    pub fn update_drag(&mut self, pointer: Vec2) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        let delta = (pointer - drag.initial_pointer).div_each(drag.start_scale);
        let moved = drag.initial_position - delta;
        self.position = Vec2::new(moved.x.max(0.0), moved.y.max(0.0));
        self.target = self.position;
        true
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Offset the free camera by `delta` world units, respecting bounds
    pub fn nudge(&mut self, delta: Vec2) -> bool {
        if self.mode != CameraMode::Free || !delta.is_finite() {
            return false;
        }
        self.position = self.bounds.clamp(self.position + delta);
        self.target = self.position;
        true
    }

    /// Direction to scroll when the pointer is within `margin` of a surface edge
    pub fn edge_scroll_direction(pointer: Vec2, surface: Vec2, margin: f32) -> Vec2 {
        let axis = |p: f32, extent: f32| {
            if p < margin {
                -1.0
            } else if p > extent - margin {
                1.0
            } else {
                0.0
            }
        };
        Vec2::new(axis(pointer.x, surface.x), axis(pointer.y, surface.y))
    }

    // ========================================================================
    // Coordinate conversion
    // ========================================================================

    pub fn world_to_screen(&self, world: Vec2, viewport: &Viewport) -> Vec2 {
        world_to_screen(world, self.position, viewport)
    }

    pub fn screen_to_world(&self, screen: Vec2, viewport: &Viewport) -> Vec2 {
        screen_to_world(screen, self.position, viewport)
    }
}

/// `screen = (world - camera) * scale + offset`
pub fn world_to_screen(world: Vec2, camera: Vec2, viewport: &Viewport) -> Vec2 {
    viewport.to_screen(world - camera)
}

/// `world = (screen - offset) / scale + camera`
pub fn screen_to_world(screen: Vec2, camera: Vec2, viewport: &Viewport) -> Vec2 {
    viewport.to_design(screen) + camera
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ScalePolicy;

    fn viewport(policy: ScalePolicy) -> Viewport {
        Viewport::new(Vec2::new(320.0, 180.0), Vec2::new(1000.0, 700.0), policy)
    }

    fn free_camera() -> Camera {
        let mut camera = Camera::new(0.15);
        camera.set_mode(CameraMode::Free);
        camera
    }

    #[test]
    fn test_world_screen_roundtrip() {
        let positions = [Vec2::ZERO, Vec2::new(412.5, -88.0), Vec2::new(-1e4, 3e3)];
        let points = [Vec2::new(0.0, 0.0), Vec2::new(17.3, 940.1), Vec2::new(-250.0, 12.75)];
        for policy in ScalePolicy::ALL {
            let vp = viewport(policy);
            for cam in positions {
                for p in points {
                    let back = screen_to_world(world_to_screen(p, cam, &vp), cam, &vp);
                    let tolerance = 1e-3 * (1.0 + p.len() + cam.len());
                    assert!((back - p).len() < tolerance, "{:?} -> {:?}", p, back);
                }
            }
        }
    }

    #[test]
    fn test_world_to_screen_formula() {
        let vp = Viewport::new(Vec2::new(320.0, 180.0), Vec2::new(640.0, 400.0), ScalePolicy::Fit);
        let mut camera = free_camera();
        camera.set_target(Vec2::new(100.0, 50.0));
        // scale 2, offset (0, 20)
        assert_eq!(camera.world_to_screen(Vec2::new(110.0, 60.0), &vp), Vec2::new(20.0, 40.0));
    }

    #[test]
    fn test_free_mode_clamps_to_bounds() {
        let mut camera = free_camera();
        camera.set_bounds(CameraBounds { min_x: Some(0.0), max_x: Some(500.0), min_y: Some(0.0), max_y: Some(500.0) });

        camera.set_target(Vec2::new(750.0, 1200.0));
        assert_eq!(camera.position(), Vec2::new(500.0, 500.0));

        camera.set_target(Vec2::new(499.0, 20.0));
        assert_eq!(camera.position(), Vec2::new(499.0, 20.0));

        for _ in 0..10 {
            camera.nudge(Vec2::new(16.0, 0.0));
            assert!(camera.position().x <= 500.0);
        }
        assert_eq!(camera.position().x, 500.0);
    }

    #[test]
    fn test_unbounded_by_default() {
        let mut camera = free_camera();
        camera.set_target(Vec2::new(-40.0, 90000.0));
        assert_eq!(camera.position(), Vec2::new(-40.0, 90000.0));
    }

    #[test]
    fn test_tracking_converges_and_ignores_free_input() {
        let mut camera = Camera::new(0.5);
        camera.set_target(Vec2::new(100.0, 0.0));
        camera.update(1.0);
        assert!((camera.position().x - 50.0).abs() < 1e-4);
        camera.update(2.0);
        assert!((camera.position().x - 87.5).abs() < 1e-4);

        assert!(!camera.nudge(Vec2::new(10.0, 0.0)));
        assert!(!camera.start_drag(Vec2::ZERO, &viewport(ScalePolicy::Fit)));

        let mut snap = Camera::new(0.0);
        snap.set_target(Vec2::new(3.0, 4.0));
        snap.update(1.0);
        assert_eq!(snap.position(), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_free_mode_not_overwritten_by_update() {
        let mut camera = free_camera();
        camera.set_target(Vec2::new(30.0, 30.0));
        camera.update(1.0);
        assert_eq!(camera.position(), Vec2::new(30.0, 30.0));
    }

    #[test]
    fn test_drag_moves_opposite_pointer_and_stays_non_negative() {
        let vp = Viewport::new(Vec2::new(320.0, 180.0), Vec2::new(640.0, 360.0), ScalePolicy::Fit);
        let mut camera = free_camera();
        camera.set_target(Vec2::new(100.0, 40.0));

        assert!(camera.start_drag(Vec2::new(300.0, 200.0), &vp));
        // Pointer right 40px on screen = 20 world units at scale 2
        camera.update_drag(Vec2::new(340.0, 200.0));
        assert_eq!(camera.position(), Vec2::new(80.0, 40.0));

        // Dragging far right/down cannot push the camera negative
        camera.update_drag(Vec2::new(900.0, 900.0));
        assert_eq!(camera.position(), Vec2::new(0.0, 0.0));

        camera.end_drag();
        assert!(!camera.is_dragging());
        assert!(!camera.update_drag(Vec2::ZERO));
    }

    #[test]
    fn test_mode_toggle_cancels_drag() {
        let vp = viewport(ScalePolicy::Fit);
        let mut camera = free_camera();
        camera.start_drag(Vec2::new(10.0, 10.0), &vp);
        assert!(camera.is_dragging());
        assert_eq!(camera.toggle_mode(), CameraMode::Tracking);
        assert!(!camera.is_dragging());
    }

    #[test]
    fn test_edge_scroll_direction() {
        let surface = Vec2::new(800.0, 600.0);
        assert_eq!(Camera::edge_scroll_direction(Vec2::new(5.0, 300.0), surface, 24.0), Vec2::new(-1.0, 0.0));
        assert_eq!(Camera::edge_scroll_direction(Vec2::new(790.0, 590.0), surface, 24.0), Vec2::new(1.0, 1.0));
        assert_eq!(Camera::edge_scroll_direction(Vec2::new(400.0, 300.0), surface, 24.0), Vec2::ZERO);
    }

    #[test]
    fn test_reset() {
        let mut camera = free_camera();
        camera.set_target(Vec2::new(30.0, 30.0));
        camera.reset();
        assert_eq!(camera.position(), Vec2::ZERO);
        assert_eq!(camera.mode(), CameraMode::Free);
    }
}
