//! Axis-aligned geometry shared by every collision pass
//!
//! All overlap tests in the engine go through [`overlaps`] so the platform
//! resolver, the obstacle resolver and the transition zones agree on what
//! "touching" means: strict interior overlap on both axes. Rectangles that
//! only share an edge do not overlap.
//!
//! Coordinates are design-space pixels with +Y pointing down.

use std::ops::{Add, Sub, Mul, Div};
use serde::{Serialize, Deserialize};

/// 2D vector (positions, sizes, velocities)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const ONE: Vec2 = Vec2 { x: 1.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn len(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Component-wise multiply
    pub fn mul_each(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x * other.x, self.y * other.y)
    }

    /// Component-wise divide
    pub fn div_each(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x / other.x, self.y / other.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f32) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    fn div(self, s: f32) -> Vec2 {
        Vec2::new(self.x / s, self.y / s)
    }
}

/// A rectangle defined by its top-left corner and size
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(position: Vec2, size: Vec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Check if point is inside (left/top inclusive, right/bottom exclusive)
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
    }
}

/// Strict AABB overlap test.
///
/// Edges that merely touch do not count, so a body resting exactly on a
/// surface (`body.bottom == surface.top`) is not overlapping it.
#[inline]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// Classification of a static body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// One-sided landing surface: only blocks bodies falling onto its top
    Platform,
    /// Solid on all four sides
    Obstacle,
}

/// A platform or obstacle placed in a scene.
///
/// `scale` shrinks or grows the collision footprint relative to the authored
/// size (props whose art is wider than their solid part). The footprint is
/// computed once when the body is authored or loaded and read directly by
/// the resolvers; it is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticBody {
    pub id: u32,
    pub position: Vec2,
    pub size: Vec2,
    pub kind: BodyKind,
    /// Non-uniform footprint scale (None = 1.0 on both axes)
    #[serde(default)]
    pub scale: Option<Vec2>,
    #[serde(skip)]
    footprint: Rect,
}

impl StaticBody {
    pub fn new(id: u32, rect: Rect, kind: BodyKind) -> Self {
        let mut body = Self {
            id,
            position: rect.position(),
            size: rect.size(),
            kind,
            scale: None,
            footprint: rect,
        };
        body.refresh_footprint();
        body
    }

    pub fn platform(id: u32, rect: Rect) -> Self {
        Self::new(id, rect, BodyKind::Platform)
    }

    pub fn obstacle(id: u32, rect: Rect) -> Self {
        Self::new(id, rect, BodyKind::Obstacle)
    }

    pub fn with_scale(mut self, sx: f32, sy: f32) -> Self {
        self.scale = Some(Vec2::new(sx, sy));
        self.refresh_footprint();
        self
    }

    /// The authored rectangle, before footprint scaling
    pub fn nominal_rect(&self) -> Rect {
        Rect::from_pos_size(self.position, self.size)
    }

    /// Collision rectangle used by the resolvers
    pub fn footprint(&self) -> Rect {
        self.footprint
    }

    /// Recompute the cached footprint. Call after editing position, size or scale.
    ///
    /// Scaling is anchored at the bottom-centre of the nominal rectangle, so a
    /// narrowed prop keeps standing on the same ground line.
    pub fn refresh_footprint(&mut self) {
        let nominal = self.nominal_rect();
        self.footprint = match self.scale {
            None => nominal,
            Some(scale) => {
                let w = nominal.w * scale.x.max(0.0);
                let h = nominal.h * scale.y.max(0.0);
                Rect::new(nominal.center().x - w * 0.5, nominal.bottom() - h, w, h)
            }
        };
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.refresh_footprint();
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
        self.refresh_footprint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_symmetric() {
        let rects = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(5.0, 5.0, 10.0, 10.0),
            Rect::new(10.0, 0.0, 10.0, 10.0),
            Rect::new(-3.0, 2.0, 4.0, 1.0),
            Rect::new(100.0, 100.0, 1.0, 1.0),
        ];
        for a in &rects {
            for b in &rects {
                assert_eq!(overlaps(a, b), overlaps(b, a));
            }
        }
    }

    #[test]
    fn test_overlap_self() {
        let r = Rect::new(3.0, -7.0, 0.5, 12.0);
        assert!(overlaps(&r, &r));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let floor = Rect::new(0.0, 100.0, 200.0, 20.0);
        let resting = Rect::new(10.0, 68.0, 32.0, 32.0);
        assert!(!overlaps(&floor, &resting));

        let sunk = Rect::new(10.0, 68.5, 32.0, 32.0);
        assert!(overlaps(&floor, &sunk));
    }

    #[test]
    fn test_contains_half_open() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert!(r.contains(Vec2::new(10.0, 20.0)));
        assert!(r.contains(Vec2::new(50.0, 40.0)));
        assert!(!r.contains(Vec2::new(110.0, 40.0)));
        assert!(!r.contains(Vec2::new(50.0, 70.0)));
    }

    #[test]
    fn test_footprint_unscaled_matches_nominal() {
        let body = StaticBody::obstacle(1, Rect::new(40.0, 60.0, 20.0, 30.0));
        assert_eq!(body.footprint(), body.nominal_rect());
    }

    #[test]
    fn test_footprint_scaled_from_bottom_centre() {
        let body = StaticBody::obstacle(1, Rect::new(0.0, 0.0, 100.0, 50.0)).with_scale(0.5, 0.4);
        let fp = body.footprint();
        assert!((fp.w - 50.0).abs() < 1e-4);
        assert!((fp.h - 20.0).abs() < 1e-4);
        assert!((fp.x - 25.0).abs() < 1e-4);
        assert!((fp.bottom() - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_footprint_follows_edits() {
        let mut body = StaticBody::platform(7, Rect::new(0.0, 0.0, 10.0, 10.0));
        body.set_position(Vec2::new(5.0, 6.0));
        body.set_size(Vec2::new(20.0, 4.0));
        assert_eq!(body.footprint(), Rect::new(5.0, 6.0, 20.0, 4.0));
    }
}
