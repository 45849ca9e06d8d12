//! # stagecast-ir
//!
//! The scene description shared by every Stagecast surface: the canvas,
//! its media layers and their filter sets, plus the single normalization
//! seam for scene documents and the [`SceneEditor`] mutation API.

pub mod clock;
pub mod editor;
pub mod filters;
pub mod layer;
pub mod normalize;
pub mod project;
pub mod validate;

pub use clock::{Clock, ManualClock, SystemClock};
pub use editor::SceneEditor;
pub use filters::{FilterKind, FilterState, FilterToggles, FiltersPatch, LayerFilters};
pub use layer::{Layer, LayerId, LayerPatch, MediaType};
pub use normalize::{export_document, import_document, normalize_filters, normalize_project};
pub use project::{CanvasPreset, CanvasSize, ProjectConfig, CANVAS_PRESETS};
