//! The editable preview surface.

use stagecast_core::{Color, PreviewConfig};
use stagecast_ir::{CanvasSize, LayerId, ProjectConfig};

use crate::composite::{compose_layers, CompositeLayer};
use crate::scroll::ScrollAnimators;

/// Options for one preview render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewOptions {
    /// Display pixels per canvas pixel.
    pub scale: f64,
    pub show_border: bool,
    pub show_grid: bool,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        PreviewConfig::default().into()
    }
}

impl From<PreviewConfig> for PreviewOptions {
    fn from(config: PreviewConfig) -> Self {
        Self {
            scale: config.scale,
            show_border: config.show_border,
            show_grid: config.show_grid,
        }
    }
}

/// A non-interactive outline drawn over the selected layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionOutline {
    pub layer_id: LayerId,
    /// Index into [`PreviewFrame::layers`].
    pub layer_index: usize,
}

/// Everything the preview shows for one scene state.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewFrame {
    pub canvas: CanvasSize,
    pub background: Color,
    pub layers: Vec<CompositeLayer>,
    pub outline: Option<SelectionOutline>,
    /// The scene has no layers at all (hidden ones count as layers).
    pub empty_state: bool,
    pub readout: String,
    pub options: PreviewOptions,
}

/// `"{w} x {h} • {percent}%"`.
pub fn readout(canvas: CanvasSize, scale: f64) -> String {
    format!(
        "{} x {} \u{2022} {}%",
        canvas.width,
        canvas.height,
        (scale * 100.0).round()
    )
}

/// Build the preview for `scene`. The scene is only read.
#[tracing::instrument(skip_all, fields(layers = scene.layers.len()))]
pub fn render_preview(
    scene: &ProjectConfig,
    selected: Option<&LayerId>,
    options: PreviewOptions,
    animators: Option<&ScrollAnimators>,
) -> PreviewFrame {
    let layers = compose_layers(scene, animators);
    let outline = selected.and_then(|id| {
        layers
            .iter()
            .position(|l| &l.id == id)
            .map(|layer_index| SelectionOutline {
                layer_id: id.clone(),
                layer_index,
            })
    });

    PreviewFrame {
        canvas: scene.canvas_size,
        background: scene.background(),
        layers,
        outline,
        empty_state: scene.layers.is_empty(),
        readout: readout(scene.canvas_size, options.scale),
        options,
    }
}
