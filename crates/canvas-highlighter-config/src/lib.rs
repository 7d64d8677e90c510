use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default fill of the highlight rectangle layer.
pub const DEFAULT_RECT_FILL: &str = "rgba(255, 170, 0, 0.2)";
/// Default stroke of the underline layer.
pub const DEFAULT_LINE_STROKE: &str = "rgba(255, 170, 0, 1)";
/// Default underline width in pixels.
pub const DEFAULT_STROKE_WIDTH: f32 = 2.0;
/// Default debounce window for resize and scroll reactions.
pub const DEFAULT_DELAY_MS: u64 = 300;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Positioning mode applied to the highlight container so the drawing
/// surface can be stacked on top of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerPosition {
    #[default]
    Relative,
    Absolute,
}

/// Flat options structure for a highlighter instance.
///
/// Every field has a default, so a config file only needs to list the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlighterConfig {
    pub position: ContainerPosition,
    /// Debounce delay for resize/scroll driven geometry refreshes.
    pub delay_ms: u64,
    pub rect_fill: String,
    pub line_stroke: String,
    pub stroke_width: f32,
    /// Pixel density multiplier for the drawing surface. `None` keeps the
    /// surface's own default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_ratio: Option<f32>,
}

impl Default for HighlighterConfig {
    fn default() -> Self {
        Self {
            position: ContainerPosition::Relative,
            delay_ms: DEFAULT_DELAY_MS,
            rect_fill: DEFAULT_RECT_FILL.to_string(),
            line_stroke: DEFAULT_LINE_STROKE.to_string(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            pixel_ratio: None,
        }
    }
}

impl HighlighterConfig {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: HighlighterConfig =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Loads the user config, falling back to defaults when there is none.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Ok(Self::load()?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/canvas-highlighter");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Debounce window as a `Duration`.
    pub fn delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.delay_ms)
    }
}
