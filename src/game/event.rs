//! Event System
//!
//! The runtime reports what happened during a tick through typed queues
//! instead of reaching out into the host. Dependent systems (camera reset,
//! scene indicator, editor overlays, regression tests) read them after the
//! tick and the host clears them before the next one.
//!
//! Example flow:
//! 1. Transition check fires → `scene_changed`
//! 2. Scene indicator reads it → shows the new scene name
//! 3. A test asserts `large_displacement` stayed empty for a whole run

use crate::world::{SceneDiagnostic, SceneId, Vec2};

/// A queue for events of a single type.
/// Events are collected during the tick and drained by the host.
#[derive(Debug)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Send an event (add to queue)
    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    /// Iterate over events without clearing
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }

    /// Drain all events (returns iterator and clears queue)
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.events.drain(..)
    }

    /// Check if there are any events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clear all events without processing
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Number of events in queue
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Which dynamic body an event is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRef {
    Player,
    Enemy(u32),
}

/// Container for all runtime events.
#[derive(Debug, Default)]
pub struct Events {
    /// Active scene changed
    pub scene_changed: EventQueue<SceneChangedEvent>,

    /// A body moved implausibly far in one tick
    pub large_displacement: EventQueue<LargeDisplacementEvent>,

    /// A body fell out of the world and was put back
    pub respawn: EventQueue<RespawnEvent>,

    /// A body touched down this tick
    pub landed: EventQueue<LandedEvent>,

    /// Body entered a zone that cannot fire (reported once per activation)
    pub invalid_zone: EventQueue<InvalidZoneEvent>,

    /// Authoring problems found when a scene was activated
    pub diagnostics: EventQueue<SceneDiagnostic>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all event queues. Call once the host has consumed a tick's events.
    pub fn clear_all(&mut self) {
        self.scene_changed.clear();
        self.large_displacement.clear();
        self.respawn.clear();
        self.landed.clear();
        self.invalid_zone.clear();
        self.diagnostics.clear();
    }
}

// =============================================================================
// Event Types
// =============================================================================

/// The active scene changed
#[derive(Debug, Clone, PartialEq)]
pub struct SceneChangedEvent {
    pub from: SceneId,
    pub to: SceneId,
    /// Zone that fired, None for editor/session activation
    pub zone: Option<String>,
    /// Where the controlled body was placed
    pub spawn: Vec2,
}

/// Single-tick displacement above the sanity threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LargeDisplacementEvent {
    pub body: BodyRef,
    pub displacement: Vec2,
    /// Frame scale used for the tick (large values point at a dt spike)
    pub frame_scale: f32,
}

/// Body fell below the world and was respawned
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RespawnEvent {
    pub body: BodyRef,
    pub position: Vec2,
}

/// Body became grounded after being airborne
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandedEvent {
    pub body: BodyRef,
    pub position: Vec2,
}

/// Body entered a zone whose target does not resolve
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidZoneEvent {
    pub scene: SceneId,
    pub zone: String,
}
