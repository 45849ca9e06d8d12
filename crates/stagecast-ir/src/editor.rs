//! The layer mutation API.
//!
//! [`SceneEditor`] owns the current scene. Every operation works on a
//! copy-on-write [`Arc<ProjectConfig>`], so snapshots handed to renderers
//! never change underneath them. Operations on ids that do not exist are
//! silent no-ops.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use stagecast_core::StageResult;

use crate::clock::{Clock, SystemClock};
use crate::filters::{FilterKind, FiltersPatch};
use crate::layer::{Layer, LayerId, LayerPatch, MediaType};
use crate::normalize::{export_document, import_document};
use crate::project::{CanvasSize, ProjectConfig};

const DUPLICATE_SUFFIX: &str = " (copy)";

pub struct SceneEditor {
    scene: Arc<ProjectConfig>,
    selected: Option<LayerId>,
    clock: Box<dyn Clock>,
    last_stamp: DateTime<Utc>,
}

impl SceneEditor {
    /// Edit `scene` using the system clock.
    pub fn new(scene: ProjectConfig) -> Self {
        Self::with_clock(scene, SystemClock)
    }

    pub fn with_clock(scene: ProjectConfig, clock: impl Clock + 'static) -> Self {
        let last_stamp = latest_stamp(&scene);
        Self {
            scene: Arc::new(scene),
            selected: None,
            clock: Box::new(clock),
            last_stamp,
        }
    }

    /// The current scene.
    pub fn scene(&self) -> &ProjectConfig {
        &self.scene
    }

    /// A shared handle to the current scene. It stays unchanged by later
    /// edits.
    pub fn snapshot(&self) -> Arc<ProjectConfig> {
        Arc::clone(&self.scene)
    }

    pub fn selected_layer_id(&self) -> Option<&LayerId> {
        self.selected.as_ref()
    }

    pub fn selected_layer(&self) -> Option<&Layer> {
        self.selected.as_ref().and_then(|id| self.scene.layer(id))
    }

    /// Select a layer, or clear the selection with `None`. Unknown ids
    /// clear it too.
    pub fn select_layer(&mut self, id: Option<LayerId>) {
        self.selected = id.filter(|id| self.scene.contains_layer(id));
    }

    /// Add a layer on top of the stack and select it.
    pub fn add_layer(
        &mut self,
        name: impl Into<String>,
        media_type: MediaType,
        source: impl Into<String>,
    ) -> LayerId {
        let id = LayerId::generate();
        let z_index = self.scene.max_z_index() + 1;
        let layer_id = id.clone();
        let name = name.into();
        let source = source.into();
        self.commit(move |scene, now| {
            scene
                .layers
                .push(Layer::new(layer_id, name, media_type, source, z_index, now));
        });
        tracing::debug!("added layer {} at z {}", id, z_index);
        self.selected = Some(id.clone());
        id
    }

    pub fn remove_layer(&mut self, id: &LayerId) {
        if !self.scene.contains_layer(id) {
            return;
        }
        self.commit(|scene, _| scene.layers.retain(|l| &l.id != id));
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
    }

    /// Apply a partial update. An empty patch still refreshes `updatedAt`.
    pub fn update_layer(&mut self, id: &LayerId, patch: LayerPatch) {
        self.edit_layer(id, |layer| patch.apply(layer));
    }

    /// Shallow-merge `patch` into the layer's filters.
    pub fn update_layer_filters(&mut self, id: &LayerId, patch: &FiltersPatch) {
        self.edit_layer(id, |layer| layer.filters.apply_patch(patch));
    }

    /// Reset filter parameters to defaults, keeping the attached effects.
    pub fn reset_filters(&mut self, id: &LayerId) {
        self.edit_layer(id, |layer| layer.filters.reset_parameters());
    }

    pub fn attach_filter(&mut self, id: &LayerId, kind: FilterKind) {
        self.edit_layer(id, |layer| layer.filters.toggles.attach(kind));
    }

    /// Detach an effect. Its parameter values are kept.
    pub fn remove_filter(&mut self, id: &LayerId, kind: FilterKind) {
        self.edit_layer(id, |layer| layer.filters.toggles.remove(kind));
    }

    pub fn set_filter_enabled(&mut self, id: &LayerId, kind: FilterKind, enabled: bool) {
        self.edit_layer(id, |layer| layer.filters.toggles.set_enabled(kind, enabled));
    }

    /// Move the layer at display position `from` to `to`. Display order is
    /// top-most first; afterwards z-indices are dense with the top-most at
    /// `n`.
    pub fn reorder_layers(&mut self, from: usize, to: usize) {
        let mut order: Vec<LayerId> = self
            .scene
            .display_order()
            .iter()
            .map(|l| l.id.clone())
            .collect();
        if from >= order.len() || to >= order.len() || from == to {
            return;
        }
        let moved = order.remove(from);
        order.insert(to, moved);
        self.assign_display_order(&order);
    }

    /// Re-stack layers to match `ids` (top-most first). Layers missing from
    /// `ids` keep their relative order below the listed ones; unknown ids
    /// are ignored.
    pub fn apply_display_order(&mut self, ids: &[LayerId]) {
        let mut seen = HashSet::new();
        let mut order: Vec<LayerId> = ids
            .iter()
            .filter(|id| self.scene.contains_layer(id) && seen.insert((*id).clone()))
            .cloned()
            .collect();
        if order.is_empty() {
            return;
        }
        for layer in self.scene.display_order() {
            if !seen.contains(&layer.id) {
                order.push(layer.id.clone());
            }
        }
        self.assign_display_order(&order);
    }

    /// Copy a layer under a new id, on top of the stack, and select it.
    pub fn duplicate_layer(&mut self, id: &LayerId) -> Option<LayerId> {
        let original = self.scene.layer(id)?.clone();
        let new_id = LayerId::generate();
        let z_index = self.scene.max_z_index() + 1;
        let copy_id = new_id.clone();
        self.commit(move |scene, now| {
            scene.layers.push(Layer {
                id: copy_id,
                name: format!("{}{}", original.name, DUPLICATE_SUFFIX),
                z_index,
                created_at: now,
                updated_at: now,
                ..original
            });
        });
        self.selected = Some(new_id.clone());
        Some(new_id)
    }

    /// Replace the whole layer list.
    pub fn set_layers(&mut self, layers: Vec<Layer>) {
        self.commit(|scene, _| scene.layers = layers);
        if let Some(id) = &self.selected {
            if !self.scene.contains_layer(id) {
                self.selected = None;
            }
        }
    }

    /// Zero-sized canvases are ignored.
    pub fn set_canvas_size(&mut self, size: CanvasSize) {
        if !size.is_valid() {
            tracing::warn!("ignoring invalid canvas size {}", size);
            return;
        }
        self.commit(|scene, _| scene.canvas_size = size);
    }

    pub fn set_background_color(&mut self, color: impl Into<String>) {
        let color = color.into();
        self.commit(|scene, _| scene.background_color = color);
    }

    pub fn set_project_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.commit(|scene, _| scene.name = name);
    }

    /// Start over with the default project.
    pub fn reset(&mut self) {
        let now = self.stamp();
        self.scene = Arc::new(ProjectConfig::new(now));
        self.selected = None;
    }

    /// Replace the scene with an imported document. On error the current
    /// scene is left untouched.
    pub fn import_json(&mut self, json: &str) -> StageResult<()> {
        let now = self.clock.now().max(self.last_stamp + Duration::milliseconds(1));
        let scene = import_document(json, now)?;
        self.last_stamp = latest_stamp(&scene);
        self.scene = Arc::new(scene);
        self.selected = None;
        Ok(())
    }

    pub fn export_json(&self) -> StageResult<String> {
        export_document(&self.scene)
    }

    fn assign_display_order(&mut self, order: &[LayerId]) {
        let n = order.len() as i64;
        self.commit(|scene, now| {
            for (pos, id) in order.iter().enumerate() {
                if let Some(layer) = scene.layer_mut(id) {
                    let z = n - pos as i64;
                    if layer.z_index != z {
                        layer.z_index = z;
                        layer.updated_at = now;
                    }
                }
            }
        });
    }

    fn edit_layer(&mut self, id: &LayerId, f: impl FnOnce(&mut Layer)) {
        if !self.scene.contains_layer(id) {
            return;
        }
        self.commit(|scene, now| {
            if let Some(layer) = scene.layer_mut(id) {
                f(layer);
                layer.updated_at = now;
            }
        });
    }

    fn commit(&mut self, f: impl FnOnce(&mut ProjectConfig, DateTime<Utc>)) {
        let now = self.stamp();
        let scene = Arc::make_mut(&mut self.scene);
        f(scene, now);
        scene.last_modified = now;
    }

    /// A timestamp strictly later than any previously issued one.
    fn stamp(&mut self) -> DateTime<Utc> {
        let now = self.clock.now();
        let stamp = if now > self.last_stamp {
            now
        } else {
            self.last_stamp + Duration::milliseconds(1)
        };
        self.last_stamp = stamp;
        stamp
    }
}

impl Default for SceneEditor {
    fn default() -> Self {
        SceneEditor::new(ProjectConfig::default())
    }
}

impl std::fmt::Debug for SceneEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneEditor")
            .field("scene", &self.scene.name)
            .field("layers", &self.scene.layers.len())
            .field("selected", &self.selected)
            .finish()
    }
}

fn latest_stamp(scene: &ProjectConfig) -> DateTime<Utc> {
    scene
        .layers
        .iter()
        .map(|l| l.updated_at)
        .fold(scene.last_modified, |a, b| a.max(b))
}
