//! Mode gate
//!
//! Edit and play are mutually exclusive writers of the same entities: in
//! play mode the integrator owns bodies, in edit mode editor commands do.
//! The gate is not a global. The host builds a [`TickContext`] every tick
//! and every component reads the mode from there.

/// Whether the simulation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Physics, AI and transitions are frozen; editor commands are accepted
    #[default]
    Edit,
    /// Physics runs; entity-editing commands are rejected
    Play,
}

impl Mode {
    pub fn is_simulating(self) -> bool {
        self == Mode::Play
    }

    pub fn toggled(self) -> Self {
        match self {
            Mode::Edit => Mode::Play,
            Mode::Play => Mode::Edit,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Edit => "Edit",
            Mode::Play => "Play",
        }
    }
}

/// How a session was started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionKind {
    /// Shipping game: always begins in the designated start scene
    Production,
    /// Level editor: resumes in whatever scene was last active
    #[default]
    Editing,
}

/// Immutable per-tick configuration handed to the runtime by the host
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickContext {
    pub mode: Mode,
    /// The editor's side panel is visible (fit policy left-aligns content)
    pub dashboard_visible: bool,
}

impl TickContext {
    pub fn play() -> Self {
        Self { mode: Mode::Play, dashboard_visible: false }
    }

    pub fn edit() -> Self {
        Self { mode: Mode::Edit, dashboard_visible: true }
    }
}
