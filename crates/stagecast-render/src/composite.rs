use stagecast_core::Point2D;
use stagecast_ir::{LayerId, MediaType, ProjectConfig};

use crate::resolve::{resolve_layer, LayerStyle};
use crate::scroll::ScrollAnimators;

/// One visible layer, resolved and ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeLayer {
    pub id: LayerId,
    pub name: String,
    pub media_type: MediaType,
    pub source: String,
    pub z_index: i64,
    pub style: LayerStyle,
    /// Tile grid translation for scrolling layers.
    pub scroll_offset: Option<Point2D>,
}

impl CompositeLayer {
    pub fn is_scrolling(&self) -> bool {
        self.scroll_offset.is_some()
    }
}

/// The layer loop both renderers share: visible layers, bottom to top.
///
/// Scrolling layers take their offset from `animators`; without one they
/// sit at the origin.
pub fn compose_layers(
    scene: &ProjectConfig,
    animators: Option<&ScrollAnimators>,
) -> Vec<CompositeLayer> {
    scene
        .render_order()
        .into_iter()
        .filter_map(|layer| {
            let style = resolve_layer(layer)?;
            let scroll_offset = style.scroll.map(|_| {
                animators
                    .and_then(|a| a.offset(&layer.id))
                    .unwrap_or_else(Point2D::zero)
            });
            Some(CompositeLayer {
                id: layer.id.clone(),
                name: layer.name.clone(),
                media_type: layer.media_type,
                source: layer.source.clone(),
                z_index: layer.z_index,
                style,
                scroll_offset,
            })
        })
        .collect()
}
