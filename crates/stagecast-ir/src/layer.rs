use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::filters::LayerFilters;

/// Unique identifier for a layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh, collision-free id (`layer_<uuid>`).
    pub fn generate() -> Self {
        Self(format!("layer_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LayerId {
    fn from(id: &str) -> Self {
        LayerId::new(id)
    }
}

/// What kind of media a layer's `source` points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    /// Animated image; plays natively and loops.
    Gif,
    /// Plays muted and looped with autoplay.
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Gif => "gif",
            MediaType::Video => "video",
        }
    }

    /// Guess the media type from a file name or URL suffix.
    pub fn from_extension(source: &str) -> Option<MediaType> {
        let path = source.split(['?', '#']).next().unwrap_or(source);
        let ext = path.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "gif" => Some(MediaType::Gif),
            "png" | "jpg" | "jpeg" | "webp" | "bmp" | "svg" => Some(MediaType::Image),
            "mp4" | "webm" | "mov" | "ogg" | "mkv" => Some(MediaType::Video),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One visual element of the scene.
///
/// `source` is an opaque media reference: a URL, a file path or an inline
/// `data:` URI. Higher `z_index` draws on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: LayerId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub source: String,
    #[serde(default)]
    pub z_index: i64,
    #[serde(default)]
    pub filters: LayerFilters,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Layer {
    /// A layer with default filters, stamped at `now`.
    pub fn new(
        id: LayerId,
        name: impl Into<String>,
        media_type: MediaType,
        source: impl Into<String>,
        z_index: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            media_type,
            source: source.into(),
            z_index,
            filters: LayerFilters::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the layer takes part in rendering at all.
    pub fn is_visible(&self) -> bool {
        self.filters.visible
    }
}

/// A partial [`Layer`] update. `id` and `created_at` are never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,
    /// Replaces the whole filter record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<LayerFilters>,
}

impl LayerPatch {
    pub fn is_empty(&self) -> bool {
        self == &LayerPatch::default()
    }

    pub(crate) fn apply(self, layer: &mut Layer) {
        if let Some(name) = self.name {
            layer.name = name;
        }
        if let Some(media_type) = self.media_type {
            layer.media_type = media_type;
        }
        if let Some(source) = self.source {
            layer.source = source;
        }
        if let Some(z) = self.z_index {
            layer.z_index = z;
        }
        if let Some(filters) = self.filters {
            layer.filters = filters;
        }
    }
}
