//! The one place raw scene documents become typed [`ProjectConfig`]s.
//!
//! Every load path (import, persisted state, CLI) goes through here, so
//! filter defaults are merged in exactly one way.

use chrono::{DateTime, Utc};
use serde_json::Value;

use stagecast_core::{StageError, StageResult};

use crate::filters::LayerFilters;
use crate::project::ProjectConfig;
use crate::validate::validate_project;

/// Overlay a raw filter object on [`LayerFilters::default`]. `null` or a
/// missing object yields the defaults.
pub fn normalize_filters(raw: &Value) -> StageResult<LayerFilters> {
    if raw.is_null() {
        return Ok(LayerFilters::default());
    }
    if !raw.is_object() {
        return Err(StageError::invalid_document("layer filters must be an object"));
    }
    Ok(serde_json::from_value(raw.clone())?)
}

/// Check the document shape and decode it.
///
/// A document must be an object with a `canvasSize` object and a `layers`
/// array. Other top-level fields fall back to the project defaults; every
/// layer's filters are merged over the filter defaults.
pub fn normalize_project(mut raw: Value) -> StageResult<ProjectConfig> {
    let obj = raw
        .as_object_mut()
        .ok_or_else(|| StageError::invalid_document("document root must be an object"))?;

    if !obj.get("canvasSize").is_some_and(Value::is_object) {
        return Err(StageError::invalid_document("missing 'canvasSize' object"));
    }
    let layers = obj
        .get_mut("layers")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| StageError::invalid_document("missing 'layers' array"))?;

    for (index, layer) in layers.iter_mut().enumerate() {
        let layer = layer.as_object_mut().ok_or_else(|| {
            StageError::invalid_document(format!("layer #{} is not an object", index))
        })?;
        let filters = normalize_filters(layer.get("filters").unwrap_or(&Value::Null))
            .map_err(|e| match e {
                StageError::InvalidDocument(message) => {
                    StageError::invalid_document(format!("layer #{}: {}", index, message))
                }
                other => other,
            })?;
        layer.insert("filters".to_string(), serde_json::to_value(&filters)?);
    }

    let config: ProjectConfig = serde_json::from_value(raw)?;
    if let Err(errors) = validate_project(&config) {
        let message = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(StageError::invalid_document(message));
    }
    Ok(config)
}

/// Parse and normalize an imported document, stamping `lastModified`.
pub fn import_document(json: &str, now: DateTime<Utc>) -> StageResult<ProjectConfig> {
    let raw: Value = serde_json::from_str(json)?;
    let mut config = normalize_project(raw)?;
    config.last_modified = now;
    tracing::info!(
        "imported project '{}' ({} layers, canvas {})",
        config.name,
        config.layers.len(),
        config.canvas_size
    );
    Ok(config)
}

/// Serialize a project as pretty-printed JSON.
pub fn export_document(config: &ProjectConfig) -> StageResult<String> {
    Ok(serde_json::to_string_pretty(config)?)
}
