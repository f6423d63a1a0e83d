//! Built-in sample level
//!
//! Two connected scenes used by the binary when no level file is given,
//! by `cargo xtask sample-level`, and by runtime tests.

use super::geometry::{Rect, StaticBody, Vec2};
use super::level::Level;
use super::scene::{Boundary, Scene, TransitionZone};

pub const MEADOW: &str = "meadow";
pub const CAVE: &str = "cave";

/// A meadow with ground, ledges and a crate, connected to a cave
pub fn sample_level() -> Level {
    let mut meadow = Scene::new(MEADOW)
        .with_boundary(Boundary::new(0.0, 0.0, 1920.0, 540.0))
        .with_spawn(Vec2::new(64.0, 400.0))
        .with_body(StaticBody::platform(1, Rect::new(0.0, 480.0, 1920.0, 60.0)))
        .with_body(StaticBody::platform(2, Rect::new(300.0, 380.0, 160.0, 16.0)))
        .with_body(StaticBody::platform(3, Rect::new(540.0, 300.0, 160.0, 16.0)))
        .with_body(StaticBody::obstacle(10, Rect::new(820.0, 416.0, 64.0, 64.0)))
        // Tree prop: only the trunk is solid
        .with_body(StaticBody::obstacle(11, Rect::new(1100.0, 380.0, 120.0, 100.0)).with_scale(0.25, 1.0))
        .with_zone(TransitionZone::new("meadow_to_cave", Rect::new(1860.0, 380.0, 60.0, 100.0), Some(CAVE)));

    meadow.settings.display_name = Some("Meadow".to_string());

    let mut cave = Scene::new(CAVE)
        .with_boundary(Boundary::new(0.0, 0.0, 1280.0, 720.0))
        .with_spawn(Vec2::new(80.0, 560.0))
        .with_body(StaticBody::platform(1, Rect::new(0.0, 640.0, 1280.0, 80.0)))
        .with_body(StaticBody::obstacle(10, Rect::new(400.0, 560.0, 80.0, 80.0)))
        .with_body(StaticBody::obstacle(11, Rect::new(700.0, 540.0, 80.0, 100.0)))
        .with_body(StaticBody::platform(2, Rect::new(860.0, 500.0, 200.0, 16.0)))
        .with_zone(
            TransitionZone::new("cave_to_meadow", Rect::new(0.0, 540.0, 40.0, 100.0), Some(MEADOW))
                .with_spawn(Vec2::new(1780.0, 400.0)),
        );
    cave.settings.display_name = Some("Cave".to_string());

    Level::new(vec![meadow, cave], Some(MEADOW))
}
