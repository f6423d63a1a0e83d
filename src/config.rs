//! Engine configuration
//!
//! Tuning lives in a RON file so designers can tweak feel without a rebuild.
//! Every group is `#[serde(default)]`: a file only needs to name the values
//! it changes.
//!
//! ```ron
//! (
//!     physics: (gravity: 0.6, jump_velocity: 12.0),
//!     viewport: (policy: PixelPerfect),
//! )
//! ```

use std::path::Path;
use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use crate::game::PhysicsSettings;
use crate::view::ScalePolicy;
use crate::world::Vec2;

/// File name looked up in the working directory and the config directory
pub const CONFIG_FILE_NAME: &str = "sidescroll.ron";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub physics: PhysicsSettings,
    pub camera: CameraSettings,
    pub viewport: ViewportSettings,
}

/// Camera feel and free-mode input tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Tracking blend per reference frame (0 or 1 snaps)
    pub smoothing: f32,
    /// Keyboard nudge distance (world px)
    pub nudge_step: f32,
    /// Pointer distance from the surface edge that triggers edge scroll (px)
    pub edge_scroll_margin: f32,
    /// Distance moved per edge-scroll or auto-scroll step (world px)
    pub edge_scroll_speed: f32,
    /// Period of the auto-scroll task (seconds)
    pub auto_scroll_interval_secs: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            smoothing: 0.15,
            nudge_step: 16.0,
            edge_scroll_margin: 24.0,
            edge_scroll_speed: 8.0,
            auto_scroll_interval_secs: 1.0 / 30.0,
        }
    }
}

/// Design resolution and scaling policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    pub design_width: f32,
    pub design_height: f32,
    pub policy: ScalePolicy,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            design_width: 960.0,
            design_height: 540.0,
            policy: ScalePolicy::Fit,
        }
    }
}

impl ViewportSettings {
    pub fn design_size(&self) -> Vec2 {
        Vec2::new(self.design_width, self.design_height)
    }
}

/// Error type for config loading
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            ConfigError::ParseError(e) => Some(e),
        }
    }
}

pub fn parse_config(s: &str) -> Result<EngineConfig, ConfigError> {
    Ok(ron::from_str(s)?)
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let config = parse_config(&contents)?;
    debug!(path = %path.as_ref().display(), "loaded engine config");
    Ok(config)
}

/// Load a config, falling back to defaults when the file is missing or bad
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> EngineConfig {
    match load_config(path.as_ref()) {
        Ok(config) => config,
        Err(ConfigError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.as_ref().display(), "no engine config, using defaults");
            EngineConfig::default()
        }
        Err(e) => {
            warn!(path = %path.as_ref().display(), error = %e, "could not load engine config, using defaults");
            EngineConfig::default()
        }
    }
}
