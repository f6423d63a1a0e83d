//! Commands
//!
//! Everything outside the simulation (editor tools, pointer and keyboard
//! handling, the window) talks to the runtime through [`Command`]s. The
//! runtime never reaches out into presentation objects; it applies a command
//! or rejects it with a [`CommandError`].

use crate::view::ScalePolicy;
use crate::world::{Boundary, SceneId, Vec2};
use super::event::BodyRef;
use super::mode::Mode;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Entity edits (edit mode only)
    MoveBody { body: BodyRef, position: Vec2 },
    SetBodyVelocity { body: BodyRef, velocity: Vec2 },
    MoveZone { zone: String, position: Vec2 },
    ResizeZone { zone: String, size: Vec2 },
    SetZoneTarget { zone: String, target: Option<SceneId>, spawn: Option<Vec2> },
    MoveStaticBody { id: u32, position: Vec2 },
    ResizeStaticBody { id: u32, size: Vec2 },
    SetSceneBoundary { boundary: Option<Boundary> },
    SetSpawn { spawn: Option<Vec2> },
    ActivateScene { scene: SceneId },

    // Camera
    ToggleCameraMode,
    /// Pointer positions are in presentation space
    StartDrag { pointer: Vec2 },
    UpdateDrag { pointer: Vec2 },
    EndDrag,
    /// Offset in world units
    Nudge { delta: Vec2 },
    /// Pointer hovering near a surface edge
    EdgeScroll { pointer: Vec2 },
    /// Repeating nudge in `direction` until stopped
    StartAutoScroll { direction: Vec2 },
    StopAutoScroll,

    // Surface
    ResizeSurface { size: Vec2 },
    SetPolicy { policy: ScalePolicy },
}

impl Command {
    /// Whether the command writes to bodies, zones or scenes
    pub fn edits_entities(&self) -> bool {
        matches!(
            self,
            Command::MoveBody { .. }
                | Command::SetBodyVelocity { .. }
                | Command::MoveZone { .. }
                | Command::ResizeZone { .. }
                | Command::SetZoneTarget { .. }
                | Command::MoveStaticBody { .. }
                | Command::ResizeStaticBody { .. }
                | Command::SetSceneBoundary { .. }
                | Command::SetSpawn { .. }
                | Command::ActivateScene { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::MoveBody { .. } => "MoveBody",
            Command::SetBodyVelocity { .. } => "SetBodyVelocity",
            Command::MoveZone { .. } => "MoveZone",
            Command::ResizeZone { .. } => "ResizeZone",
            Command::SetZoneTarget { .. } => "SetZoneTarget",
            Command::MoveStaticBody { .. } => "MoveStaticBody",
            Command::ResizeStaticBody { .. } => "ResizeStaticBody",
            Command::SetSceneBoundary { .. } => "SetSceneBoundary",
            Command::SetSpawn { .. } => "SetSpawn",
            Command::ActivateScene { .. } => "ActivateScene",
            Command::ToggleCameraMode => "ToggleCameraMode",
            Command::StartDrag { .. } => "StartDrag",
            Command::UpdateDrag { .. } => "UpdateDrag",
            Command::EndDrag => "EndDrag",
            Command::Nudge { .. } => "Nudge",
            Command::EdgeScroll { .. } => "EdgeScroll",
            Command::StartAutoScroll { .. } => "StartAutoScroll",
            Command::StopAutoScroll => "StopAutoScroll",
            Command::ResizeSurface { .. } => "ResizeSurface",
            Command::SetPolicy { .. } => "SetPolicy",
        }
    }
}

/// Why a command was not applied
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// Entity edits are refused while the simulation owns the entities
    WrongMode { command: &'static str, mode: Mode },
    UnknownZone(String),
    UnknownScene(SceneId),
    /// No static body with this id in the active scene
    UnknownBody(u32),
    UnknownEnemy(u32),
    /// NaN/infinite coordinates or a negative size
    InvalidValue { command: &'static str },
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::WrongMode { command, mode } => {
                write!(f, "{} is not allowed in {} mode", command, mode.label())
            }
            CommandError::UnknownZone(id) => write!(f, "unknown zone '{}'", id),
            CommandError::UnknownScene(id) => write!(f, "unknown scene '{}'", id),
            CommandError::UnknownBody(id) => write!(f, "unknown static body {}", id),
            CommandError::UnknownEnemy(id) => write!(f, "unknown enemy {}", id),
            CommandError::InvalidValue { command } => write!(f, "{}: invalid value", command),
        }
    }
}

impl std::error::Error for CommandError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_edits_are_classified() {
        assert!(Command::SetSpawn { spawn: None }.edits_entities());
        assert!(Command::ActivateScene { scene: "a".into() }.edits_entities());
        assert!(!Command::ToggleCameraMode.edits_entities());
        assert!(!Command::ResizeSurface { size: Vec2::new(1.0, 1.0) }.edits_entities());
    }

    #[test]
    fn test_error_display() {
        let err = CommandError::WrongMode { command: "MoveZone", mode: Mode::Play };
        assert_eq!(err.to_string(), "MoveZone is not allowed in Play mode");
    }
}
