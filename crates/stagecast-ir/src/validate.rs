use std::collections::HashSet;

use stagecast_core::StageError;

use crate::layer::MediaType;
use crate::project::ProjectConfig;

/// Structural checks a document must pass to be loaded.
pub fn validate_project(project: &ProjectConfig) -> Result<(), Vec<StageError>> {
    let mut errors = Vec::new();

    if !project.canvas_size.is_valid() {
        errors.push(StageError::invalid_document(format!(
            "canvas size must be non-zero, got {}",
            project.canvas_size
        )));
    }

    let mut layer_ids = HashSet::new();
    for layer in &project.layers {
        if layer.id.as_str().is_empty() {
            errors.push(StageError::invalid_document("layer id must not be empty"));
        } else if !layer_ids.insert(&layer.id) {
            errors.push(StageError::invalid_document(format!(
                "duplicate layer id '{}'",
                layer.id
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Filter values outside their nominal editor ranges. These are rendered
/// as-is; the list is informational.
pub fn lint_project(project: &ProjectConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    for layer in &project.layers {
        let f = &layer.filters;
        let mut check = |name: &str, value: f64, min: f64, max: f64| {
            if !(min..=max).contains(&value) {
                warnings.push(format!(
                    "layer '{}': {} = {} is outside [{}, {}]",
                    layer.id, name, value, min, max
                ));
            }
        };
        check("opacity", f.opacity, 0.0, 100.0);
        check("scale", f.scale, 0.1, 3.0);
        check("brightness", f.brightness, 0.0, 200.0);
        check("contrast", f.contrast, 0.0, 200.0);
        check("saturate", f.saturate, 0.0, 200.0);
        check("blur", f.blur, 0.0, 20.0);

        if let Some(guessed) = MediaType::from_extension(&layer.source) {
            if guessed != layer.media_type {
                warnings.push(format!(
                    "layer '{}': typed {} but source looks like {}",
                    layer.id, layer.media_type, guessed
                ));
            }
        }
    }
    warnings
}
