//! Decoded media for the rasterizer.
//!
//! Layer sources are opaque strings. Inline `data:` URIs and local files are
//! decoded on demand; anything else (videos, remote URLs) has to be
//! registered up front with a decoded frame.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use base64::Engine;

use stagecast_core::{FrameBuffer, StageError, StageResult};
use stagecast_ir::{MediaType, ProjectConfig};

/// Load an image file into a frame buffer.
pub fn load_image(path: &Path) -> StageResult<FrameBuffer> {
    let img = image::open(path).map_err(|e| {
        StageError::media(
            format!("failed to load image: {}", e),
            path.display().to_string(),
        )
    })?;
    Ok(into_frame(img))
}

/// Decode encoded image bytes (PNG, JPEG, GIF first frame, WebP, ...).
pub fn load_image_from_bytes(data: &[u8], origin: &str) -> StageResult<FrameBuffer> {
    let img = image::load_from_memory(data)
        .map_err(|e| StageError::media(format!("failed to decode image: {}", e), origin))?;
    Ok(into_frame(img))
}

fn into_frame(img: image::DynamicImage) -> FrameBuffer {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    FrameBuffer {
        data: rgba.into_raw(),
        width,
        height,
    }
}

/// Decode a base64 `data:` URI.
pub fn decode_data_uri(uri: &str) -> StageResult<FrameBuffer> {
    let origin = truncate_for_log(uri);
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| StageError::media("not a data URI", origin.clone()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| StageError::media("data URI has no payload", origin.clone()))?;
    if !header.ends_with(";base64") {
        return Err(StageError::media("only base64 data URIs are supported", origin));
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| StageError::media(format!("invalid base64: {}", e), origin.clone()))?;
    load_image_from_bytes(&bytes, &origin)
}

fn truncate_for_log(source: &str) -> String {
    const MAX: usize = 48;
    match source.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &source[..idx]),
        None => source.to_string(),
    }
}

fn is_remote(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("blob:")
}

/// Decoded frames keyed by layer source.
#[derive(Debug, Default)]
pub struct MediaCache {
    root: Option<PathBuf>,
    frames: HashMap<String, FrameBuffer>,
}

impl MediaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative file sources resolve against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            frames: HashMap::new(),
        }
    }

    /// Provide the frame for a source directly (video poster frames,
    /// remote images fetched elsewhere, test fixtures).
    pub fn register(&mut self, source: impl Into<String>, frame: FrameBuffer) {
        self.frames.insert(source.into(), frame);
    }

    pub fn get(&self, source: &str) -> Option<&FrameBuffer> {
        self.frames.get(source)
    }

    pub fn contains(&self, source: &str) -> bool {
        self.frames.contains_key(source)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Decode and cache one source.
    pub fn load(&mut self, source: &str, media_type: MediaType) -> StageResult<&FrameBuffer> {
        if !self.frames.contains_key(source) {
            let frame = self.decode(source, media_type)?;
            self.frames.insert(source.to_string(), frame);
        }
        self.frames
            .get(source)
            .ok_or_else(|| StageError::media("frame missing after load", source))
    }

    fn decode(&self, source: &str, media_type: MediaType) -> StageResult<FrameBuffer> {
        if source.starts_with("data:") {
            return decode_data_uri(source);
        }
        if media_type == MediaType::Video {
            return Err(StageError::media(
                "video frames must be registered before rendering",
                source,
            ));
        }
        if is_remote(source) {
            return Err(StageError::media(
                "remote media must be registered before rendering",
                source,
            ));
        }
        let path = Path::new(source.strip_prefix("file://").unwrap_or(source));
        let path = match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        };
        load_image(&path)
    }

    /// Load every visible layer's media. Failures are logged and returned;
    /// those layers are skipped when rasterizing.
    pub fn preload(&mut self, scene: &ProjectConfig) -> Vec<StageError> {
        let mut errors = Vec::new();
        for layer in scene.layers.iter().filter(|l| l.is_visible()) {
            if let Err(e) = self.load(&layer.source, layer.media_type) {
                tracing::warn!("layer '{}' will be skipped: {}", layer.id, e);
                errors.push(e);
            }
        }
        errors
    }
}
