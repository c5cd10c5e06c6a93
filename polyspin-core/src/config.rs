/// Startup configuration, read once when a frontend starts and never
/// written back.
///
/// ```toml
/// [shape]
/// face_count = 12
/// size = 30
/// color = [127, 127, 255]
/// velocity = { x = 20, y = 20, z = 20 }
///
/// [animation]
/// start_paused = false
///
/// [panel]
/// expanded = true
/// ```
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::interaction::AnimationMode;
use crate::shape::ShapeConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub shape: ShapeConfig,
    pub animation: AnimationConfig,
    pub panel: PanelConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub start_paused: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub expanded: bool,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self { expanded: true }
    }
}

impl Config {
    /// Parse TOML. Invalid sizes and non-finite rates fall back to their
    /// defaults, the same values the shape setters would have ignored.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(content)?;
        config.shape = config.shape.sanitized();
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn initial_mode(&self) -> AnimationMode {
        AnimationMode::from_playing(!self.animation.start_paused)
    }
}
