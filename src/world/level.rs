//! Level loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable level files.
//! Supports both compressed (brotli) and uncompressed RON files.
//! - Reading: Auto-detects format by checking for valid RON start
//! - Writing: `save_level` uses brotli, `save_level_plain` writes text
//!
//! Validation here only rejects files that would be unsafe to simulate
//! (absurd counts, non-finite coordinates). Authoring mistakes such as a
//! zone pointing at a missing scene load fine and are reported by the
//! scene graph as diagnostics.

use std::fs;
use std::io::Cursor;
use std::path::Path;
use serde::{Serialize, Deserialize};
use tracing::{debug, error};

use super::geometry::{Rect, Vec2};
use super::scene::{Scene, SceneGraph, SceneId};
use crate::game::PhysicsSettings;

/// Validation limits to prevent resource exhaustion from malicious files
pub mod limits {
    /// Maximum number of scenes in a level
    pub const MAX_SCENES: usize = 256;
    /// Maximum transition zones per scene
    pub const MAX_ZONES: usize = 256;
    /// Maximum static bodies per scene
    pub const MAX_BODIES: usize = 4096;
    /// Maximum length for scene and zone identifiers
    pub const MAX_ID_LEN: usize = 128;
    /// Maximum coordinate value (prevents overflow issues)
    pub const MAX_COORD: f32 = 1_000_000.0;
}

/// A complete level: every scene plus level-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub scenes: Vec<Scene>,
    /// Scene production sessions start in
    #[serde(default)]
    pub start_scene: Option<SceneId>,
    /// Per-level physics overrides (None = engine config)
    #[serde(default)]
    pub physics: Option<PhysicsSettings>,
}

impl Level {
    pub fn new(scenes: Vec<Scene>, start_scene: Option<&str>) -> Self {
        Self {
            scenes,
            start_scene: start_scene.map(str::to_string),
            physics: None,
        }
    }

    /// Build the runtime scene graph from this level
    pub fn into_scene_graph(self) -> Result<SceneGraph, LevelError> {
        SceneGraph::new(self.scenes, self.start_scene)
    }
}

/// Error type for level loading
#[derive(Debug)]
pub enum LevelError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    ValidationError(String),
}

impl From<std::io::Error> for LevelError {
    fn from(e: std::io::Error) -> Self {
        LevelError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for LevelError {
    fn from(e: ron::error::SpannedError) -> Self {
        LevelError::ParseError(e)
    }
}

impl From<ron::Error> for LevelError {
    fn from(e: ron::Error) -> Self {
        LevelError::SerializeError(e)
    }
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelError::IoError(e) => write!(f, "IO error: {}", e),
            LevelError::ParseError(e) => write!(f, "Parse error: {}", e),
            LevelError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            LevelError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::IoError(e) => Some(e),
            LevelError::ParseError(e) => Some(e),
            LevelError::SerializeError(e) => Some(e),
            LevelError::ValidationError(_) => None,
        }
    }
}

/// Check if a float is valid (not NaN or Inf)
fn is_valid_float(f: f32) -> bool {
    f.is_finite() && f.abs() <= limits::MAX_COORD
}

fn validate_vec(v: Vec2, context: &str) -> Result<(), String> {
    if !is_valid_float(v.x) || !is_valid_float(v.y) {
        return Err(format!("{}: invalid coordinates ({}, {})", context, v.x, v.y));
    }
    Ok(())
}

fn validate_rect(r: &Rect, context: &str) -> Result<(), String> {
    validate_vec(r.position(), context)?;
    validate_vec(r.size(), context)?;
    if r.w < 0.0 || r.h < 0.0 {
        return Err(format!("{}: negative size ({} x {})", context, r.w, r.h));
    }
    Ok(())
}

fn validate_id(id: &str, context: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err(format!("{}: empty identifier", context));
    }
    if id.len() > limits::MAX_ID_LEN {
        return Err(format!("{}: identifier too long ({} > {})", context, id.len(), limits::MAX_ID_LEN));
    }
    Ok(())
}

/// Validate a single scene
fn validate_scene(scene: &Scene, index: usize) -> Result<(), String> {
    let context = format!("scene[{}]", index);
    validate_id(&scene.id, &context)?;

    if scene.bodies.len() > limits::MAX_BODIES {
        return Err(format!("{}: too many bodies ({} > {})",
            context, scene.bodies.len(), limits::MAX_BODIES));
    }
    if scene.zones.len() > limits::MAX_ZONES {
        return Err(format!("{}: too many zones ({} > {})",
            context, scene.zones.len(), limits::MAX_ZONES));
    }

    for (i, body) in scene.bodies.iter().enumerate() {
        let ctx = format!("{} body[{}]", context, i);
        validate_rect(&body.nominal_rect(), &ctx)?;
        if let Some(scale) = body.scale {
            validate_vec(scale, &ctx)?;
        }
    }

    for (i, zone) in scene.zones.iter().enumerate() {
        let ctx = format!("{} zone[{}]", context, i);
        validate_id(&zone.id, &ctx)?;
        validate_rect(&zone.rect, &ctx)?;
        if let Some(spawn) = zone.target_spawn {
            validate_vec(spawn, &ctx)?;
        }
    }

    if let Some(b) = scene.boundary {
        validate_rect(&b.rect(), &format!("{} boundary", context))?;
    }
    if let Some(spawn) = scene.spawn() {
        validate_vec(spawn, &format!("{} spawn", context))?;
    }

    Ok(())
}

/// Validate an entire level
pub fn validate_level(level: &Level) -> Result<(), LevelError> {
    if level.scenes.is_empty() {
        return Err(LevelError::ValidationError("level has no scenes".to_string()));
    }
    if level.scenes.len() > limits::MAX_SCENES {
        return Err(LevelError::ValidationError(format!(
            "too many scenes ({} > {})", level.scenes.len(), limits::MAX_SCENES
        )));
    }

    for (i, scene) in level.scenes.iter().enumerate() {
        validate_scene(scene, i).map_err(LevelError::ValidationError)?;
        if level.scenes[..i].iter().any(|s| s.id == scene.id) {
            return Err(LevelError::ValidationError(format!("duplicate scene id '{}'", scene.id)));
        }
    }

    Ok(())
}

/// Decode raw file bytes to RON text, decompressing brotli if needed
fn decode_level_bytes(bytes: &[u8]) -> Result<String, LevelError> {
    // Detect format: RON files start with '(' or whitespace, brotli is binary
    let is_plain_ron = bytes.first().map(|&b| b == b'(' || b == b' ' || b == b'\n' || b == b'\r' || b == b'\t').unwrap_or(false);

    if is_plain_ron {
        return String::from_utf8(bytes.to_vec())
            .map_err(|e| LevelError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid UTF-8: {}", e)
            )));
    }

    let mut decompressed = Vec::new();
    brotli::BrotliDecompress(&mut Cursor::new(bytes), &mut decompressed)
        .map_err(|e| LevelError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("brotli decompression failed: {}", e)
        )))?;
    String::from_utf8(decompressed)
        .map_err(|e| LevelError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("invalid UTF-8 after decompression: {}", e)
        )))
}

/// Parse, validate and prepare a level from RON text
pub fn load_level_from_str(s: &str) -> Result<Level, LevelError> {
    let mut level: Level = ron::from_str(s)?;

    validate_level(&level)?;

    // Footprints are derived data, never serialized
    for scene in &mut level.scenes {
        scene.refresh_footprints();
    }

    Ok(level)
}

/// Parse level data from bytes (plain or compressed)
pub fn parse_level_data(bytes: &[u8]) -> Result<Level, LevelError> {
    let contents = decode_level_bytes(bytes)?;
    load_level_from_str(&contents)
}

/// Load a level from a RON file (supports both compressed and uncompressed)
pub fn load_level<P: AsRef<Path>>(path: P) -> Result<Level, LevelError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let contents = decode_level_bytes(&bytes)?;

    match load_level_from_str(&contents) {
        Ok(level) => {
            debug!(path = %path.display(), scenes = level.scenes.len(), "loaded level");
            Ok(level)
        }
        Err(LevelError::ParseError(e)) => {
            // Show the offending line for hand-edited files
            let line_idx = e.position.line.saturating_sub(1);
            let line = contents.lines().nth(line_idx).unwrap_or("");
            error!(path = %path.display(), line = e.position.line, col = e.position.col, context = line, "RON parse error: {}", e.code);
            Err(LevelError::ParseError(e))
        }
        Err(e) => Err(e),
    }
}

fn to_ron(level: &Level) -> Result<String, LevelError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(5)
        .indentor("  ".to_string());
    Ok(ron::ser::to_string_pretty(level, config)?)
}

/// Serialize a level to compressed bytes
pub fn serialize_level(level: &Level) -> Result<Vec<u8>, LevelError> {
    let ron_string = to_ron(level)?;

    // Compress with brotli (quality 6, window 22 - good balance of speed/ratio)
    let mut compressed = Vec::new();
    brotli::BrotliCompress(&mut Cursor::new(ron_string.as_bytes()), &mut compressed, &brotli::enc::BrotliEncoderParams {
        quality: 6,
        lgwin: 22,
        ..Default::default()
    }).map_err(|e| LevelError::IoError(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("brotli compression failed: {}", e)
    )))?;

    Ok(compressed)
}

/// Save a level to a compressed RON file (brotli)
pub fn save_level<P: AsRef<Path>>(level: &Level, path: P) -> Result<(), LevelError> {
    fs::write(path, serialize_level(level)?)?;
    Ok(())
}

/// Save a level as plain RON text (for hand editing and diffs)
pub fn save_level_plain<P: AsRef<Path>>(level: &Level, path: P) -> Result<(), LevelError> {
    fs::write(path, to_ron(level)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::geometry::StaticBody;
    use crate::world::scene::{Boundary, TransitionZone};

    fn small_level() -> Level {
        let scene = Scene::new("a")
            .with_boundary(Boundary::new(0.0, 0.0, 500.0, 300.0))
            .with_spawn(Vec2::new(10.0, 10.0))
            .with_body(StaticBody::obstacle(1, Rect::new(100.0, 200.0, 40.0, 40.0)).with_scale(0.5, 1.0))
            .with_zone(TransitionZone::new("exit", Rect::new(480.0, 0.0, 20.0, 300.0), Some("missing")));
        Level::new(vec![scene], Some("a"))
    }

    #[test]
    fn test_compressed_file_roundtrip_restores_footprints() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.ron");
        let level = small_level();

        save_level(&level, &path).unwrap();
        let loaded = load_level(&path).unwrap();

        assert_eq!(loaded.scenes[0].bodies[0].footprint().w, 20.0);
        assert_eq!(loaded.start_scene.as_deref(), Some("a"));
    }

    #[test]
    fn test_plain_file_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.ron");
        save_level_plain(&small_level(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with('('));
        assert_eq!(load_level(&path).unwrap().scenes.len(), 1);
    }

    #[test]
    fn test_dangling_zone_is_not_a_load_error() {
        let bytes = serialize_level(&small_level()).unwrap();
        let level = parse_level_data(&bytes).unwrap();
        let graph = level.into_scene_graph().unwrap();
        assert_eq!(graph.diagnostics().len(), 1);
    }

    #[test]
    fn test_rejects_non_finite_coordinates() {
        let mut level = small_level();
        level.scenes[0].settings.spawn = Some(Vec2::new(f32::NAN, 0.0));
        assert!(matches!(validate_level(&level), Err(LevelError::ValidationError(_))));
    }

    #[test]
    fn test_rejects_duplicate_scene_ids() {
        let mut level = small_level();
        level.scenes.push(Scene::new("a"));
        assert!(matches!(validate_level(&level), Err(LevelError::ValidationError(_))));
    }

    #[test]
    fn test_parse_error_reported() {
        assert!(matches!(load_level_from_str("(scenes: [oops"), Err(LevelError::ParseError(_))));
    }
}
