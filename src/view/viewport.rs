//! Viewport transform
//!
//! Maps design-space coordinates (the resolution the game is authored at)
//! onto the presentation surface. The scale and letterbox offsets are
//! recomputed eagerly whenever the surface size, design size, policy or
//! dashboard visibility changes and are constant in between.

use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::world::Vec2;

/// Rule mapping design space onto the presentation surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScalePolicy {
    /// Uniform scale to fit entirely, letterboxed
    #[default]
    Fit,
    /// Independent X/Y scale filling the surface, aspect not preserved
    Stretch,
    /// Uniform scale to cover the surface, overflow cropped evenly
    Crop,
    /// Largest whole-number uniform scale that fits (at least 1)
    PixelPerfect,
}

impl ScalePolicy {
    pub const ALL: [ScalePolicy; 4] = [
        ScalePolicy::Fit,
        ScalePolicy::Stretch,
        ScalePolicy::Crop,
        ScalePolicy::PixelPerfect,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ScalePolicy::Fit => "Fit",
            ScalePolicy::Stretch => "Stretch",
            ScalePolicy::Crop => "Crop",
            ScalePolicy::PixelPerfect => "Pixel Perfect",
        }
    }

    /// Cycle to next value
    pub fn next(self) -> Self {
        match self {
            ScalePolicy::Fit => ScalePolicy::Stretch,
            ScalePolicy::Stretch => ScalePolicy::Crop,
            ScalePolicy::Crop => ScalePolicy::PixelPerfect,
            ScalePolicy::PixelPerfect => ScalePolicy::Fit,
        }
    }
}

/// Design → presentation mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    design: Vec2,
    surface: Vec2,
    policy: ScalePolicy,
    dashboard_visible: bool,
    scale: Vec2,
    offset: Vec2,
}

impl Viewport {
    pub fn new(design: Vec2, surface: Vec2, policy: ScalePolicy) -> Self {
        let mut viewport = Self {
            design,
            surface,
            policy,
            dashboard_visible: false,
            scale: Vec2::ONE,
            offset: Vec2::ZERO,
        };
        viewport.recompute();
        viewport
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn design_size(&self) -> Vec2 {
        self.design
    }

    pub fn surface_size(&self) -> Vec2 {
        self.surface
    }

    pub fn policy(&self) -> ScalePolicy {
        self.policy
    }

    pub fn dashboard_visible(&self) -> bool {
        self.dashboard_visible
    }

    pub fn set_surface(&mut self, surface: Vec2) {
        if self.surface != surface {
            self.surface = surface;
            self.recompute();
        }
    }

    pub fn set_design(&mut self, design: Vec2) {
        if self.design != design {
            self.design = design;
            self.recompute();
        }
    }

    pub fn set_policy(&mut self, policy: ScalePolicy) {
        if self.policy != policy {
            self.policy = policy;
            self.recompute();
        }
    }

    pub fn set_dashboard_visible(&mut self, visible: bool) {
        if self.dashboard_visible != visible {
            self.dashboard_visible = visible;
            self.recompute();
        }
    }

    /// Recompute scale and offset from the current inputs
    pub fn recompute(&mut self) {
        let valid = |v: Vec2| v.is_finite() && v.x > 0.0 && v.y > 0.0;
        if !valid(self.design) || !valid(self.surface) {
            warn!(design_w = self.design.x, design_h = self.design.y,
                surface_w = self.surface.x, surface_h = self.surface.y,
                "degenerate viewport, using identity transform");
            self.scale = Vec2::ONE;
            self.offset = Vec2::ZERO;
            return;
        }

        let sx = self.surface.x / self.design.x;
        let sy = self.surface.y / self.design.y;

        let (scale, offset) = match self.policy {
            ScalePolicy::Stretch => (Vec2::new(sx, sy), Vec2::ZERO),
            ScalePolicy::Fit => {
                let s = sx.min(sy);
                let mut offset = self.centered_offset(s);
                if self.dashboard_visible {
                    offset.x = 0.0;
                }
                (Vec2::new(s, s), offset)
            }
            ScalePolicy::Crop => {
                let s = sx.max(sy);
                (Vec2::new(s, s), self.centered_offset(s))
            }
            ScalePolicy::PixelPerfect => {
                let s = sx.min(sy).floor().max(1.0);
                (Vec2::new(s, s), self.centered_offset(s))
            }
        };

        self.scale = scale;
        self.offset = offset;
    }

    fn centered_offset(&self, s: f32) -> Vec2 {
        Vec2::new(
            (self.surface.x - self.design.x * s) * 0.5,
            (self.surface.y - self.design.y * s) * 0.5,
        )
    }

    /// Design-space point → presentation-space point
    pub fn to_screen(&self, p: Vec2) -> Vec2 {
        p.mul_each(self.scale) + self.offset
    }

    /// Presentation-space point → design-space point
    pub fn to_design(&self, p: Vec2) -> Vec2 {
        (p - self.offset).div_each(self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vp(surface: (f32, f32), policy: ScalePolicy) -> Viewport {
        Viewport::new(Vec2::new(320.0, 180.0), Vec2::new(surface.0, surface.1), policy)
    }

    #[test]
    fn test_fit_letterboxes_and_centers() {
        let v = vp((1280.0, 960.0), ScalePolicy::Fit);
        assert_eq!(v.scale(), Vec2::new(4.0, 4.0));
        assert_eq!(v.offset(), Vec2::new(0.0, 120.0));

        let v = vp((1000.0, 360.0), ScalePolicy::Fit);
        assert_eq!(v.scale(), Vec2::new(2.0, 2.0));
        assert_eq!(v.offset(), Vec2::new(180.0, 0.0));
    }

    #[test]
    fn test_fit_left_aligns_with_dashboard() {
        let mut v = vp((1000.0, 360.0), ScalePolicy::Fit);
        v.set_dashboard_visible(true);
        assert_eq!(v.offset(), Vec2::new(0.0, 0.0));
        v.set_dashboard_visible(false);
        assert_eq!(v.offset(), Vec2::new(180.0, 0.0));
    }

    #[test]
    fn test_stretch() {
        let v = vp((640.0, 540.0), ScalePolicy::Stretch);
        assert_eq!(v.scale(), Vec2::new(2.0, 3.0));
        assert_eq!(v.offset(), Vec2::ZERO);
    }

    #[test]
    fn test_crop_overflows_symmetrically() {
        let v = vp((1000.0, 360.0), ScalePolicy::Crop);
        assert!((v.scale().x - 3.125).abs() < 1e-5);
        assert!((v.offset().x - 0.0).abs() < 1e-4);
        assert!((v.offset().y - (360.0 - 562.5) * 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_pixel_perfect_floors_to_at_least_one() {
        let v = vp((1000.0, 600.0), ScalePolicy::PixelPerfect);
        assert_eq!(v.scale(), Vec2::new(3.0, 3.0));
        assert_eq!(v.offset(), Vec2::new(20.0, 30.0));

        let small = vp((200.0, 100.0), ScalePolicy::PixelPerfect);
        assert_eq!(small.scale(), Vec2::new(1.0, 1.0));
        assert_eq!(small.offset(), Vec2::new(-60.0, -40.0));
    }

    #[test]
    fn test_recompute_on_change() {
        let mut v = vp((320.0, 180.0), ScalePolicy::Fit);
        assert_eq!(v.scale(), Vec2::ONE);
        v.set_surface(Vec2::new(640.0, 360.0));
        assert_eq!(v.scale(), Vec2::new(2.0, 2.0));
        v.set_policy(ScalePolicy::Stretch);
        v.set_design(Vec2::new(640.0, 180.0));
        assert_eq!(v.scale(), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_degenerate_surface_is_identity() {
        let v = vp((0.0, 0.0), ScalePolicy::Fit);
        assert_eq!(v.scale(), Vec2::ONE);
        assert_eq!(v.offset(), Vec2::ZERO);
    }

    #[test]
    fn test_design_screen_roundtrip() {
        for policy in ScalePolicy::ALL {
            let v = vp((1366.0, 768.0), policy);
            let p = Vec2::new(123.25, -47.5);
            let back = v.to_design(v.to_screen(p));
            assert!((back.x - p.x).abs() < 1e-3 && (back.y - p.y).abs() < 1e-3);
        }
    }
}
