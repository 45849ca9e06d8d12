//! Filter resolution: turns a layer's [`LayerFilters`] into the concrete
//! effect list and transform a renderer applies.
//!
//! Resolution is total. Out-of-range values pass through unchanged.

use stagecast_core::{Affine2D, Point2D};
use stagecast_ir::{FilterKind, Layer, LayerFilters};

/// One appearance effect, in factor units (percentages already divided
/// by 100).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppearanceEffect {
    Opacity(f64),
    /// Degrees.
    HueRotate(f64),
    Brightness(f64),
    Contrast(f64),
    Saturate(f64),
    /// Standard deviation in pixels.
    Blur(f64),
}

impl AppearanceEffect {
    /// CSS `filter` function text.
    pub fn css(&self) -> String {
        match self {
            AppearanceEffect::Opacity(v) => format!("opacity({})", v),
            AppearanceEffect::HueRotate(deg) => format!("hue-rotate({}deg)", deg),
            AppearanceEffect::Brightness(v) => format!("brightness({})", v),
            AppearanceEffect::Contrast(v) => format!("contrast({})", v),
            AppearanceEffect::Saturate(v) => format!("saturate({})", v),
            AppearanceEffect::Blur(px) => format!("blur({}px)", px),
        }
    }
}

/// One step of the geometric transform, applied around the layer center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    Translate { x: f64, y: f64 },
    Scale(f64),
    /// Degrees, clockwise.
    Rotate(f64),
    FlipX,
    FlipY,
}

impl TransformOp {
    pub fn css(&self) -> String {
        match self {
            TransformOp::Translate { x, y } => format!("translate({}px, {}px)", x, y),
            TransformOp::Scale(s) => format!("scale({})", s),
            TransformOp::Rotate(deg) => format!("rotate({}deg)", deg),
            TransformOp::FlipX => "scaleX(-1)".to_string(),
            TransformOp::FlipY => "scaleY(-1)".to_string(),
        }
    }

    pub fn matrix(&self) -> Affine2D {
        match *self {
            TransformOp::Translate { x, y } => Affine2D::translate(x, y),
            TransformOp::Scale(s) => Affine2D::scale(s, s),
            TransformOp::Rotate(deg) => Affine2D::rotate_degrees(deg),
            TransformOp::FlipX => Affine2D::scale(-1.0, 1.0),
            TransformOp::FlipY => Affine2D::scale(1.0, -1.0),
        }
    }
}

/// Scroll velocity in units per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollVelocity {
    pub x: f64,
    pub y: f64,
}

impl ScrollVelocity {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Everything a renderer needs to draw one visible layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStyle {
    /// Opacity first, blur last.
    pub effects: Vec<AppearanceEffect>,
    /// Translate, scale, rotate, then the flips.
    pub transform: Vec<TransformOp>,
    /// Present when the uvScroll effect is in effect.
    pub scroll: Option<ScrollVelocity>,
}

impl LayerStyle {
    /// The CSS `filter` property value.
    pub fn css_filter(&self) -> String {
        join_css(self.effects.iter().map(AppearanceEffect::css))
    }

    /// The CSS `transform` property value (origin: center).
    pub fn css_transform(&self) -> String {
        join_css(self.transform.iter().map(TransformOp::css))
    }

    /// The combined transform, applied around `origin`.
    pub fn matrix_about(&self, origin: Point2D) -> Affine2D {
        let mut m = Affine2D::translate(origin.x, origin.y);
        for op in &self.transform {
            m = m.then(&op.matrix());
        }
        m.then(&Affine2D::translate(-origin.x, -origin.y))
    }

    pub fn opacity(&self) -> f64 {
        self.effects
            .iter()
            .find_map(|e| match e {
                AppearanceEffect::Opacity(v) => Some(*v),
                _ => None,
            })
            .unwrap_or(1.0)
    }
}

fn join_css(parts: impl Iterator<Item = String>) -> String {
    parts.collect::<Vec<_>>().join(" ")
}

/// Resolve a filter set. Hidden layers resolve to `None`.
pub fn resolve_filters(filters: &LayerFilters) -> Option<LayerStyle> {
    if !filters.visible {
        return None;
    }
    let toggles = &filters.toggles;

    let mut effects = vec![AppearanceEffect::Opacity(filters.opacity / 100.0)];
    if toggles.is_in_effect(FilterKind::HueRotate) {
        effects.push(AppearanceEffect::HueRotate(filters.hue_rotate));
    }
    if toggles.is_in_effect(FilterKind::ColorAdjust) {
        effects.push(AppearanceEffect::Brightness(filters.brightness / 100.0));
        effects.push(AppearanceEffect::Contrast(filters.contrast / 100.0));
        effects.push(AppearanceEffect::Saturate(filters.saturate / 100.0));
    }
    if toggles.is_in_effect(FilterKind::Blur) && filters.blur > 0.0 {
        effects.push(AppearanceEffect::Blur(filters.blur));
    }

    let mut transform = vec![
        TransformOp::Translate {
            x: filters.offset_x,
            y: filters.offset_y,
        },
        TransformOp::Scale(filters.scale),
        TransformOp::Rotate(filters.rotation),
    ];
    if filters.flip_x {
        transform.push(TransformOp::FlipX);
    }
    if filters.flip_y {
        transform.push(TransformOp::FlipY);
    }

    let scroll = toggles
        .is_in_effect(FilterKind::UvScroll)
        .then(|| ScrollVelocity::new(filters.uv_scroll_x, filters.uv_scroll_y));

    Some(LayerStyle {
        effects,
        transform,
        scroll,
    })
}

pub fn resolve_layer(layer: &Layer) -> Option<LayerStyle> {
    resolve_filters(&layer.filters)
}
