//! Scenes and the scene transition state machine
//!
//! A level is a set of scenes (regions). Exactly one is active at a time.
//! Transition zones are the edges between them: when the controlled body's
//! centre enters a zone whose target resolves, the graph switches the active
//! scene and reports where the body should reappear.
//!
//! Authoring mistakes (dangling targets, missing boundary or spawn) never
//! fault. They show up as [`SceneDiagnostic`]s and the affected behaviour is
//! simply disabled.

use std::collections::HashSet;
use serde::{Serialize, Deserialize};
use tracing::{info, warn};

use super::geometry::{BodyKind, Rect, StaticBody, Vec2};
use super::level::LevelError;
use crate::game::SessionKind;

pub type SceneId = String;

/// Rectangle that clamps body movement inside a scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Boundary {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.right - self.left, self.bottom - self.top)
    }

    /// Point containment with all edges inclusive
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }
}

/// Rectangular trigger that moves the controlled body to another scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionZone {
    pub id: String,
    pub rect: Rect,
    /// Scene to load when entered (None = not wired up yet)
    #[serde(default)]
    pub target: Option<SceneId>,
    /// Overrides the target scene's spawn point
    #[serde(default)]
    pub target_spawn: Option<Vec2>,
}

impl TransitionZone {
    pub fn new(id: impl Into<String>, rect: Rect, target: Option<&str>) -> Self {
        Self {
            id: id.into(),
            rect,
            target: target.map(str::to_string),
            target_spawn: None,
        }
    }

    pub fn with_spawn(mut self, spawn: Vec2) -> Self {
        self.target_spawn = Some(spawn);
        self
    }
}

/// Per-scene settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSettings {
    /// Where the controlled body appears (top-left of its rectangle)
    #[serde(default)]
    pub spawn: Option<Vec2>,
    /// Label shown by the scene indicator
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A self-contained level area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    #[serde(default)]
    pub bodies: Vec<StaticBody>,
    #[serde(default)]
    pub boundary: Option<Boundary>,
    #[serde(default)]
    pub zones: Vec<TransitionZone>,
    #[serde(default)]
    pub settings: SceneSettings,
}

impl Scene {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            bodies: Vec::new(),
            boundary: None,
            zones: Vec::new(),
            settings: SceneSettings::default(),
        }
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = Some(boundary);
        self
    }

    pub fn with_spawn(mut self, spawn: Vec2) -> Self {
        self.settings.spawn = Some(spawn);
        self
    }

    pub fn with_body(mut self, body: StaticBody) -> Self {
        self.bodies.push(body);
        self
    }

    pub fn with_zone(mut self, zone: TransitionZone) -> Self {
        self.zones.push(zone);
        self
    }

    pub fn spawn(&self) -> Option<Vec2> {
        self.settings.spawn
    }

    /// Static bodies of one kind, in authored order
    pub fn bodies_of(&self, kind: BodyKind) -> impl Iterator<Item = &StaticBody> {
        self.bodies.iter().filter(move |b| b.kind == kind)
    }

    pub fn platforms(&self) -> impl Iterator<Item = &StaticBody> {
        self.bodies_of(BodyKind::Platform)
    }

    pub fn obstacles(&self) -> impl Iterator<Item = &StaticBody> {
        self.bodies_of(BodyKind::Obstacle)
    }

    pub fn body_mut(&mut self, id: u32) -> Option<&mut StaticBody> {
        self.bodies.iter_mut().find(|b| b.id == id)
    }

    pub fn zone(&self, id: &str) -> Option<&TransitionZone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn zone_mut(&mut self, id: &str) -> Option<&mut TransitionZone> {
        self.zones.iter_mut().find(|z| z.id == id)
    }

    /// Recalculate every body's collision footprint (not serialized)
    pub fn refresh_footprints(&mut self) {
        for body in &mut self.bodies {
            body.refresh_footprint();
        }
    }
}

/// Authoring problem found in a scene
#[derive(Debug, Clone, PartialEq)]
pub enum SceneDiagnostic {
    /// Zone points at a scene that does not exist (or at nothing)
    DanglingZoneTarget { scene: SceneId, zone: String, target: Option<SceneId> },
    /// Scene has no boundary; clamping and boundary rendering are skipped
    MissingBoundary { scene: SceneId },
    /// Scene has no spawn point and zones into it carry no override
    MissingSpawn { scene: SceneId },
    /// Spawn point lies outside the scene boundary
    SpawnOutsideBoundary { scene: SceneId, spawn: Vec2 },
}

impl std::fmt::Display for SceneDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneDiagnostic::DanglingZoneTarget { scene, zone, target: Some(t) } => {
                write!(f, "{}: zone '{}' targets unknown scene '{}'", scene, zone, t)
            }
            SceneDiagnostic::DanglingZoneTarget { scene, zone, target: None } => {
                write!(f, "{}: zone '{}' has no target scene", scene, zone)
            }
            SceneDiagnostic::MissingBoundary { scene } => write!(f, "{}: no boundary", scene),
            SceneDiagnostic::MissingSpawn { scene } => write!(f, "{}: no spawn point", scene),
            SceneDiagnostic::SpawnOutsideBoundary { scene, spawn } => {
                write!(f, "{}: spawn ({}, {}) lies outside the boundary", scene, spawn.x, spawn.y)
            }
        }
    }
}

/// A transition that is ready to be applied
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub zone: String,
    pub from: SceneId,
    pub to: SceneId,
    /// New top-left position of the controlled body
    pub spawn: Vec2,
}

/// Outcome of testing the body's reference point against the active zones
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneCheck {
    /// Not inside any zone, or still inside the zone it already fired for
    Idle,
    /// Inside a zone whose target cannot be resolved. `first_report` is true
    /// only the first time this zone is hit since the scene was activated.
    Blocked { zone: String, first_report: bool },
    /// Entered a live zone
    Fire(Transition),
}

/// The set of scenes plus the active-scene pointer
#[derive(Debug, Clone)]
pub struct SceneGraph {
    scenes: Vec<Scene>,
    active: usize,
    start_scene: Option<SceneId>,
    /// Zone the reference point is currently inside (edge-trigger latch)
    occupied_zone: Option<String>,
    /// Diagnostics for the active scene, computed on activation
    diagnostics: Vec<SceneDiagnostic>,
    /// Blocked zones already reported since activation
    reported_zones: HashSet<String>,
}

impl SceneGraph {
    pub fn new(scenes: Vec<Scene>, start_scene: Option<SceneId>) -> Result<Self, LevelError> {
        if scenes.is_empty() {
            return Err(LevelError::ValidationError("level has no scenes".to_string()));
        }
        let active = start_scene
            .as_deref()
            .and_then(|id| scenes.iter().position(|s| s.id == id))
            .unwrap_or(0);
        let mut graph = Self {
            scenes,
            active,
            start_scene,
            occupied_zone: None,
            diagnostics: Vec::new(),
            reported_zones: HashSet::new(),
        };
        graph.reset_ephemeral();
        Ok(graph)
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn active(&self) -> &Scene {
        &self.scenes[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Scene {
        &mut self.scenes[self.active]
    }

    pub fn active_id(&self) -> &str {
        &self.scenes[self.active].id
    }

    pub fn start_scene(&self) -> Option<&str> {
        self.start_scene.as_deref()
    }

    pub fn scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.scenes.iter().any(|s| s.id == id)
    }

    /// Cached diagnostics for the active scene
    pub fn diagnostics(&self) -> &[SceneDiagnostic] {
        &self.diagnostics
    }

    /// Pick the scene a session starts in.
    ///
    /// Production sessions always start in the designated start scene (or the
    /// first scene when none is designated or it does not resolve). Editing
    /// sessions keep whatever scene was last active. Returns true if the
    /// active scene changed.
    pub fn start_session(&mut self, kind: SessionKind) -> bool {
        match kind {
            SessionKind::Editing => false,
            SessionKind::Production => {
                let target = match self.start_scene.as_deref() {
                    Some(id) => match self.scenes.iter().position(|s| s.id == id) {
                        Some(idx) => idx,
                        None => {
                            warn!(start_scene = id, "start scene does not exist, using first scene");
                            0
                        }
                    },
                    None => 0,
                };
                let changed = target != self.active;
                self.active = target;
                if changed {
                    self.reset_ephemeral();
                } else {
                    self.occupied_zone = None;
                    self.reported_zones.clear();
                }
                changed
            }
        }
    }

    /// Make `id` the active scene. Returns false if it does not exist.
    pub fn activate(&mut self, id: &str) -> bool {
        match self.scenes.iter().position(|s| s.id == id) {
            Some(idx) => {
                self.active = idx;
                self.reset_ephemeral();
                true
            }
            None => false,
        }
    }

    /// Test the controlled body's reference point against the active scene's zones
    pub fn check_zones(&mut self, point: Vec2) -> ZoneCheck {
        let scene = &self.scenes[self.active];
        let Some(zone) = scene.zones.iter().find(|z| z.rect.contains(point)) else {
            self.occupied_zone = None;
            return ZoneCheck::Idle;
        };

        if self.occupied_zone.as_deref() == Some(zone.id.as_str()) {
            return ZoneCheck::Idle;
        }

        let spawn = self.resolve(zone);
        let zone_id = zone.id.clone();
        let scene_id = scene.id.clone();
        let target = zone.target.clone();

        match spawn {
            Some(spawn) => ZoneCheck::Fire(Transition {
                zone: zone_id,
                from: scene_id,
                to: target.unwrap_or_default(),
                spawn,
            }),
            None => {
                let first_report = self.reported_zones.insert(zone_id.clone());
                if first_report {
                    warn!(scene = %scene_id, zone = %zone_id, target = ?target, "transition zone has no valid target");
                }
                ZoneCheck::Blocked { zone: zone_id, first_report }
            }
        }
    }

    /// Where a zone would send the body, or None if the zone is inert
    fn resolve(&self, zone: &TransitionZone) -> Option<Vec2> {
        let target = self.scene(zone.target.as_deref()?)?;
        zone.target_spawn.or(target.spawn())
    }

    /// Switch to the transition's target scene.
    ///
    /// `reference_point` is the body's centre after it has been moved to the
    /// spawn; a zone already containing it is latched so it cannot fire until
    /// the body leaves it.
    pub fn apply_transition(&mut self, transition: &Transition, reference_point: Vec2) -> bool {
        if !self.activate(&transition.to) {
            return false;
        }
        self.latch_at(reference_point);
        info!(from = %transition.from, to = %transition.to, zone = %transition.zone,
            spawn_x = transition.spawn.x, spawn_y = transition.spawn.y, "scene transition");
        true
    }

    /// Latch the active scene's zone containing `point`, if any.
    ///
    /// Called after the body is placed without walking in (session start,
    /// scene activation, transition) so a zone under the spawn only fires
    /// once the body has left it and come back.
    pub fn latch_at(&mut self, point: Vec2) {
        self.occupied_zone = self.scenes[self.active]
            .zones
            .iter()
            .find(|z| z.rect.contains(point))
            .map(|z| z.id.clone());
    }

    /// Compute diagnostics for any scene (for editor overlays)
    pub fn diagnostics_for(&self, id: &str) -> Vec<SceneDiagnostic> {
        let Some(scene) = self.scene(id) else {
            return Vec::new();
        };
        let mut out = Vec::new();

        for zone in &scene.zones {
            let resolves = zone.target.as_deref().map(|t| self.contains(t)).unwrap_or(false);
            if !resolves {
                out.push(SceneDiagnostic::DanglingZoneTarget {
                    scene: scene.id.clone(),
                    zone: zone.id.clone(),
                    target: zone.target.clone(),
                });
            }
        }

        match (scene.boundary, scene.spawn()) {
            (None, _) => out.push(SceneDiagnostic::MissingBoundary { scene: scene.id.clone() }),
            (Some(boundary), Some(spawn)) if !boundary.contains(spawn) => {
                out.push(SceneDiagnostic::SpawnOutsideBoundary { scene: scene.id.clone(), spawn });
            }
            _ => {}
        }

        if scene.spawn().is_none() {
            // Only an error if some zone relies on the scene's own spawn
            let needed = self.scenes.iter()
                .flat_map(|s| s.zones.iter())
                .any(|z| z.target.as_deref() == Some(id) && z.target_spawn.is_none());
            let is_start = self.start_scene.as_deref() == Some(id);
            if needed || is_start {
                out.push(SceneDiagnostic::MissingSpawn { scene: scene.id.clone() });
            }
        }

        out
    }

    /// Clear per-scene state: zone latch, reported zones, cached diagnostics
    fn reset_ephemeral(&mut self) {
        self.occupied_zone = None;
        self.reported_zones.clear();
        let id = self.scenes[self.active].id.clone();
        self.diagnostics = self.diagnostics_for(&id);
        for diag in &self.diagnostics {
            warn!(%diag, "scene authoring problem");
        }
    }

    /// Recompute cached diagnostics after the editor changed the active scene
    pub fn refresh_diagnostics(&mut self) {
        let id = self.scenes[self.active].id.clone();
        self.diagnostics = self.diagnostics_for(&id);
        self.reported_zones.clear();
    }

    /// Recalculate footprints in every scene
    pub fn refresh_footprints(&mut self) {
        for scene in &mut self.scenes {
            scene.refresh_footprints();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_scene_graph() -> SceneGraph {
        let r1 = Scene::new("r1")
            .with_boundary(Boundary::new(0.0, 0.0, 1000.0, 600.0))
            .with_spawn(Vec2::new(10.0, 10.0))
            .with_zone(TransitionZone::new("to_r2", Rect::new(900.0, 0.0, 100.0, 600.0), Some("r2"))
                .with_spawn(Vec2::new(50.0, 50.0)))
            .with_zone(TransitionZone::new("broken", Rect::new(0.0, 500.0, 100.0, 100.0), Some("nowhere")));
        let r2 = Scene::new("r2")
            .with_boundary(Boundary::new(0.0, 0.0, 800.0, 600.0))
            .with_spawn(Vec2::new(20.0, 20.0))
            .with_zone(TransitionZone::new("back", Rect::new(0.0, 0.0, 120.0, 120.0), Some("r1")));
        SceneGraph::new(vec![r1, r2], Some("r1".to_string())).unwrap()
    }

    #[test]
    fn test_empty_graph_rejected() {
        assert!(SceneGraph::new(Vec::new(), None).is_err());
    }

    #[test]
    fn test_zone_fires_with_override_spawn() {
        let mut graph = two_scene_graph();
        match graph.check_zones(Vec2::new(950.0, 300.0)) {
            ZoneCheck::Fire(t) => {
                assert_eq!(t.from, "r1");
                assert_eq!(t.to, "r2");
                assert_eq!(t.spawn, Vec2::new(50.0, 50.0));
                assert!(graph.apply_transition(&t, Vec2::new(66.0, 66.0)));
            }
            other => panic!("expected transition, got {:?}", other),
        }
        assert_eq!(graph.active_id(), "r2");
    }

    #[test]
    fn test_dangling_target_is_inert() {
        let mut graph = two_scene_graph();
        let check = graph.check_zones(Vec2::new(50.0, 550.0));
        assert_eq!(check, ZoneCheck::Blocked { zone: "broken".to_string(), first_report: true });
        assert_eq!(graph.active_id(), "r1");

        // Reported once per activation
        let again = graph.check_zones(Vec2::new(50.0, 550.0));
        assert_eq!(again, ZoneCheck::Blocked { zone: "broken".to_string(), first_report: false });
    }

    #[test]
    fn test_spawn_inside_return_zone_does_not_ping_pong() {
        let mut graph = two_scene_graph();
        let ZoneCheck::Fire(t) = graph.check_zones(Vec2::new(950.0, 300.0)) else {
            panic!("expected transition");
        };
        // Body lands inside r2's "back" zone
        graph.apply_transition(&t, Vec2::new(66.0, 66.0));
        assert_eq!(graph.check_zones(Vec2::new(66.0, 66.0)), ZoneCheck::Idle);

        // Leaving and re-entering fires
        assert_eq!(graph.check_zones(Vec2::new(400.0, 300.0)), ZoneCheck::Idle);
        assert!(matches!(graph.check_zones(Vec2::new(60.0, 60.0)), ZoneCheck::Fire(_)));
    }

    #[test]
    fn test_production_start_uses_start_scene() {
        let mut graph = two_scene_graph();
        graph.activate("r2");
        assert!(graph.start_session(SessionKind::Production));
        assert_eq!(graph.active_id(), "r1");
    }

    #[test]
    fn test_editing_start_keeps_last_scene() {
        let mut graph = two_scene_graph();
        graph.activate("r2");
        assert!(!graph.start_session(SessionKind::Editing));
        assert_eq!(graph.active_id(), "r2");
    }

    #[test]
    fn test_diagnostics() {
        let graph = two_scene_graph();
        let diags = graph.diagnostics();
        assert_eq!(diags.len(), 1);
        assert!(matches!(&diags[0], SceneDiagnostic::DanglingZoneTarget { zone, .. } if zone == "broken"));

        let bare = SceneGraph::new(vec![Scene::new("a")], Some("a".to_string())).unwrap();
        let diags = bare.diagnostics();
        assert!(diags.contains(&SceneDiagnostic::MissingBoundary { scene: "a".to_string() }));
        assert!(diags.contains(&SceneDiagnostic::MissingSpawn { scene: "a".to_string() }));
    }

    #[test]
    fn test_spawn_outside_boundary_reported() {
        let scene = Scene::new("a")
            .with_boundary(Boundary::new(0.0, 0.0, 100.0, 100.0))
            .with_spawn(Vec2::new(500.0, 10.0));
        let graph = SceneGraph::new(vec![scene], None).unwrap();
        assert!(matches!(graph.diagnostics()[0], SceneDiagnostic::SpawnOutsideBoundary { .. }));
    }
}
