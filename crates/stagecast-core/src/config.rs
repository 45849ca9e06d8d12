use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{StageError, StageResult};

/// Defaults for the interactive preview surface.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Ratio of rendered px to canvas px.
    pub scale: f64,
    pub show_border: bool,
    pub show_grid: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            scale: 0.5,
            show_border: true,
            show_grid: false,
        }
    }
}

/// Styling of the tiled broadcast view.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LiveConfig {
    /// Opacity of every tile except the main one.
    pub tile_opacity: f64,
    /// Draw the accent glow around the main tile.
    pub highlight_main: bool,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            tile_opacity: 0.7,
            highlight_main: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MediaConfig {
    /// Base directory for relative layer sources. `None` means the
    /// directory of the scene document.
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// `stagecast.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct StagecastConfig {
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub live: LiveConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StagecastConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn load_from_file(path: &Path) -> StageResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents).map_err(|e| StageError::config(e.to_string(), path))
    }

    pub fn save_to_file(&self, path: &Path) -> StageResult<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| StageError::config(e.to_string(), path))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
