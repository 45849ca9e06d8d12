use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stagecast_core::{Color, Size2D};

use crate::layer::{Layer, LayerId};

pub const DEFAULT_PROJECT_NAME: &str = "New Project";
pub const DEFAULT_PROJECT_VERSION: &str = "1.0.0";
pub const DEFAULT_BACKGROUND: &str = "#0a0a0f";

/// Logical stage size in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn to_size(&self) -> Size2D {
        Size2D::new(self.width as f64, self.height as f64)
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        CanvasSize::new(1920, 1080)
    }
}

impl std::fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A named canvas size offered by editors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasPreset {
    pub name: &'static str,
    pub size: CanvasSize,
}

pub const CANVAS_PRESETS: &[CanvasPreset] = &[
    CanvasPreset { name: "Full HD", size: CanvasSize::new(1920, 1080) },
    CanvasPreset { name: "4K", size: CanvasSize::new(3840, 2160) },
    CanvasPreset { name: "HD", size: CanvasSize::new(1280, 720) },
    CanvasPreset { name: "Square", size: CanvasSize::new(1080, 1080) },
    CanvasPreset { name: "Portrait", size: CanvasSize::new(1080, 1920) },
    CanvasPreset { name: "Twitch", size: CanvasSize::new(1920, 1080) },
    CanvasPreset { name: "YouTube", size: CanvasSize::new(1920, 1080) },
    CanvasPreset { name: "Instagram Story", size: CanvasSize::new(1080, 1920) },
];

/// Look up a preset by name, ignoring case.
pub fn find_preset(name: &str) -> Option<&'static CanvasPreset> {
    CANVAS_PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

fn default_name() -> String {
    DEFAULT_PROJECT_NAME.to_string()
}

fn default_version() -> String {
    DEFAULT_PROJECT_VERSION.to_string()
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}

/// The whole scene document: canvas, background and layer stack.
///
/// `layers` keeps insertion order; draw order comes from `z_index` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub canvas_size: CanvasSize,
    /// CSS color string, kept verbatim.
    #[serde(default = "default_background")]
    pub background_color: String,
    pub layers: Vec<Layer>,
    #[serde(default = "Utc::now")]
    pub last_modified: DateTime<Utc>,
}

impl ProjectConfig {
    /// An empty project on the default canvas.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            name: default_name(),
            version: default_version(),
            canvas_size: CanvasSize::default(),
            background_color: default_background(),
            layers: Vec::new(),
            last_modified: now,
        }
    }

    pub fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| &l.id == id)
    }

    pub fn layer_mut(&mut self, id: &LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| &l.id == id)
    }

    pub fn contains_layer(&self, id: &LayerId) -> bool {
        self.layer(id).is_some()
    }

    /// Highest z-index in use, or 0 for an empty stack.
    pub fn max_z_index(&self) -> i64 {
        self.layers.iter().map(|l| l.z_index).max().unwrap_or(0)
    }

    /// Layers bottom to top. Equal z-indices keep their array order.
    pub fn render_order(&self) -> Vec<&Layer> {
        let mut layers: Vec<&Layer> = self.layers.iter().collect();
        layers.sort_by_key(|l| l.z_index);
        layers
    }

    /// Layers top to bottom, the order a layer list shows them in.
    pub fn display_order(&self) -> Vec<&Layer> {
        let mut layers = self.render_order();
        layers.reverse();
        layers
    }

    /// Parsed background color. Unparseable values fall back to the
    /// default background.
    pub fn background(&self) -> Color {
        Color::parse_css(&self.background_color).unwrap_or_else(|e| {
            tracing::warn!(
                "unsupported background color '{}' ({}); using {}",
                self.background_color,
                e,
                DEFAULT_BACKGROUND
            );
            Color::rgb8(0x0a, 0x0a, 0x0f)
        })
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig::new(Utc::now())
    }
}
