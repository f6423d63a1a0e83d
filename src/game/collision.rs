//! Collision System
//!
//! Two resolvers correct a dynamic body after it has been integrated:
//!
//! - Platforms are one-sided. Only a body falling onto the top face is
//!   stopped; bodies pass through from below and from the sides.
//! - Obstacles are solid on all four sides. An overlapping body is pushed
//!   out through the face with the smallest penetration (minimum
//!   translation), which keeps corner hits from snapping the body to
//!   whichever face happened to be tested first.
//!
//! The integrator always runs platforms first, then obstacles, so an
//! obstacle correction wins over a platform landing in the same tick.

use crate::world::{overlaps, Rect, StaticBody};
use super::body::DynamicBody;

/// Obstacle face a body was pushed out through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// Summary of what the resolvers did to a body this tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollisionResult {
    /// Landed on a platform or on top of an obstacle
    pub landed: bool,
    /// Pushed out sideways by an obstacle
    pub hit_wall: bool,
    /// Pushed down out of an obstacle's underside
    pub hit_ceiling: bool,
}

impl CollisionResult {
    pub fn merge(self, other: CollisionResult) -> CollisionResult {
        CollisionResult {
            landed: self.landed || other.landed,
            hit_wall: self.hit_wall || other.hit_wall,
            hit_ceiling: self.hit_ceiling || other.hit_ceiling,
        }
    }
}

/// Penetration depth of `body` into `obstacle` through each obstacle face.
///
/// Each value is how far the body must move to exit through that face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Penetration {
    pub fn between(body: &Rect, obstacle: &Rect) -> Self {
        Self {
            left: body.right() - obstacle.x,
            right: obstacle.right() - body.x,
            top: body.bottom() - obstacle.y,
            bottom: obstacle.bottom() - body.y,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left.min(self.right)
    }

    pub fn vertical(&self) -> f32 {
        self.top.min(self.bottom)
    }

    /// Face with the smallest exit distance. Vertical wins ties so bodies
    /// landing exactly on a corner end up standing on it.
    pub fn exit_side(&self) -> Side {
        if self.horizontal() < self.vertical() {
            if self.left <= self.right { Side::Left } else { Side::Right }
        } else if self.top <= self.bottom {
            Side::Top
        } else {
            Side::Bottom
        }
    }
}

/// Land the body on one-sided platforms.
///
/// A platform stops the body only if they overlap, the body is moving
/// down, and the body's top was above the platform's top before this tick
/// (`previous_top`). When several platforms qualify the body lands on the
/// highest top, which is the first one it crossed.
pub fn resolve_platforms<'a>(
    body: &mut DynamicBody,
    previous_top: f32,
    platforms: impl IntoIterator<Item = &'a StaticBody>,
) -> CollisionResult {
    let mut result = CollisionResult::default();
    if body.velocity.y <= 0.0 {
        return result;
    }

    let rect = body.rect();
    let landing = platforms
        .into_iter()
        .map(|platform| platform.footprint())
        .filter(|surface| overlaps(&rect, surface) && previous_top < surface.y)
        .map(|surface| surface.y)
        .reduce(f32::min);

    if let Some(top) = landing {
        body.position.y = top - body.size.y;
        body.velocity.y = 0.0;
        body.grounded = true;
        result.landed = true;
    }

    result
}

/// Push the body out of every overlapping solid obstacle
pub fn resolve_obstacles<'a>(
    body: &mut DynamicBody,
    obstacles: impl IntoIterator<Item = &'a StaticBody>,
) -> CollisionResult {
    let mut result = CollisionResult::default();

    for obstacle in obstacles {
        let solid = obstacle.footprint();
        let rect = body.rect();
        if !overlaps(&rect, &solid) {
            continue;
        }

        match Penetration::between(&rect, &solid).exit_side() {
            Side::Left => {
                body.position.x = solid.x - body.size.x;
                body.velocity.x = 0.0;
                result.hit_wall = true;
            }
            Side::Right => {
                body.position.x = solid.right();
                body.velocity.x = 0.0;
                result.hit_wall = true;
            }
            Side::Top => {
                body.position.y = solid.y - body.size.y;
                body.velocity.y = 0.0;
                body.grounded = true;
                result.landed = true;
            }
            Side::Bottom => {
                body.position.y = solid.bottom();
                body.velocity.y = 0.0;
                result.hit_ceiling = true;
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Vec2;

    fn body_at(x: f32, y: f32, vx: f32, vy: f32) -> DynamicBody {
        let mut body = DynamicBody::new(Vec2::new(x, y), Vec2::new(20.0, 40.0));
        body.velocity = Vec2::new(vx, vy);
        body
    }

    #[test]
    fn test_platform_landing_snaps_to_top() {
        let platform = StaticBody::platform(1, Rect::new(0.0, 100.0, 200.0, 10.0));
        // Was at y=55 (bottom 95), fell 10px to bottom 105
        let mut body = body_at(50.0, 65.0, 0.0, 10.0);
        let result = resolve_platforms(&mut body, 55.0, [&platform]);

        assert!(result.landed);
        assert_eq!(body.bottom(), 100.0);
        assert_eq!(body.velocity.y, 0.0);
        assert!(body.grounded);
    }

    #[test]
    fn test_stacked_platforms_land_on_highest_top() {
        // Authored lowest first; the body crosses both tops in one tick
        let ledge = StaticBody::platform(1, Rect::new(0.0, 110.0, 200.0, 10.0));
        let slab = StaticBody::platform(2, Rect::new(0.0, 100.0, 200.0, 30.0));
        let mut body = body_at(50.0, 75.0, 0.0, 20.0);
        let result = resolve_platforms(&mut body, 55.0, [&ledge, &slab]);

        assert!(result.landed);
        assert_eq!(body.bottom(), 100.0);
        assert!(!overlaps(&body.rect(), &slab.footprint()));
        assert!(!overlaps(&body.rect(), &ledge.footprint()));
    }

    #[test]
    fn test_platform_ignored_when_rising() {
        let platform = StaticBody::platform(1, Rect::new(0.0, 100.0, 200.0, 10.0));
        let mut body = body_at(50.0, 80.0, 0.0, -6.0);
        let result = resolve_platforms(&mut body, 86.0, [&platform]);

        assert!(!result.landed);
        assert_eq!(body.position.y, 80.0);
        assert!(!body.grounded);
    }

    #[test]
    fn test_platform_passable_from_below() {
        let platform = StaticBody::platform(1, Rect::new(0.0, 100.0, 200.0, 10.0));
        // Top was already below the platform top before the tick
        let mut body = body_at(50.0, 104.0, 0.0, 2.0);
        let result = resolve_platforms(&mut body, 102.0, [&platform]);

        assert!(!result.landed);
        assert_eq!(body.position.y, 104.0);
    }

    #[test]
    fn test_platform_uses_footprint() {
        let platform = StaticBody::platform(1, Rect::new(0.0, 100.0, 200.0, 10.0)).with_scale(0.1, 1.0);
        // Nominal rect would catch the body; the 20px-wide footprint at x=90 does not
        let mut body = body_at(10.0, 65.0, 0.0, 10.0);
        assert!(!resolve_platforms(&mut body, 55.0, [&platform]).landed);
    }

    #[test]
    fn test_obstacle_pushes_out_nearest_face() {
        let crate_box = StaticBody::obstacle(1, Rect::new(100.0, 100.0, 50.0, 50.0));

        // Moving right, 3px into the left face, deep vertically
        let mut body = body_at(83.0, 105.0, 5.0, 2.0);
        let result = resolve_obstacles(&mut body, [&crate_box]);
        assert!(result.hit_wall);
        assert_eq!(body.position.x, 80.0);
        assert_eq!(body.velocity.x, 0.0);
        assert_eq!(body.velocity.y, 2.0);
        assert!(!overlaps(&body.rect(), &crate_box.footprint()));

        // Falling 4px into the top face
        let mut body = body_at(110.0, 64.0, 1.0, 6.0);
        let result = resolve_obstacles(&mut body, [&crate_box]);
        assert!(result.landed);
        assert!(body.grounded);
        assert_eq!(body.bottom(), 100.0);
        assert_eq!(body.velocity, Vec2::new(1.0, 0.0));

        // Jumping 2px into the underside
        let mut body = body_at(110.0, 148.0, 0.0, -8.0);
        let result = resolve_obstacles(&mut body, [&crate_box]);
        assert!(result.hit_ceiling);
        assert_eq!(body.position.y, 150.0);
        assert_eq!(body.velocity.y, 0.0);
        assert!(!body.grounded);
    }

    #[test]
    fn test_obstacle_zeroes_exactly_one_axis() {
        let wall = StaticBody::obstacle(1, Rect::new(0.0, 0.0, 40.0, 40.0));
        let cases = [
            (-15.0, 10.0), (35.0, 5.0), (10.0, -35.0), (10.0, 38.0), (-18.0, -37.0), (37.0, 39.0),
        ];
        for (x, y) in cases {
            let mut body = body_at(x, y, 3.0, 3.0);
            let before = Penetration::between(&body.rect(), &wall.footprint());
            resolve_obstacles(&mut body, [&wall]);

            assert!(!overlaps(&body.rect(), &wall.footprint()), "still overlapping at ({}, {})", x, y);
            let zeroed = [body.velocity.x == 0.0, body.velocity.y == 0.0];
            assert_eq!(zeroed.iter().filter(|z| **z).count(), 1);
            let expect_horizontal = before.horizontal() < before.vertical();
            assert_eq!(zeroed[0], expect_horizontal);
        }
    }

    #[test]
    fn test_resting_body_is_untouched() {
        let floor = StaticBody::obstacle(1, Rect::new(0.0, 100.0, 200.0, 20.0));
        let mut body = body_at(10.0, 60.0, 2.0, 0.0);
        let result = resolve_obstacles(&mut body, [&floor]);
        assert_eq!(result, CollisionResult::default());
        assert_eq!(body.position, Vec2::new(10.0, 60.0));
    }
}
