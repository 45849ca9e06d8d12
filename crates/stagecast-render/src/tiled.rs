//! The live broadcast view: the canvas repeated across the whole viewport,
//! with the centered copy emphasized.

use std::str::FromStr;

use serde::Serialize;

use stagecast_core::{Color, LiveConfig, Rect, Size2D, StageError};
use stagecast_ir::{CanvasSize, ProjectConfig};

use crate::composite::{compose_layers, CompositeLayer};
use crate::scroll::ScrollAnimators;

/// Window size in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn to_size(&self) -> Size2D {
        Size2D::new(self.width as f64, self.height as f64)
    }
}

impl FromStr for ViewportSize {
    type Err = StageError;

    /// Parses `"1920x1080"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StageError::InvalidArgument(format!("expected WIDTHxHEIGHT, got '{}'", s));
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let width = w.trim().parse().map_err(|_| invalid())?;
        let height = h.trim().parse().map_err(|_| invalid())?;
        Ok(ViewportSize::new(width, height))
    }
}

impl std::fmt::Display for ViewportSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One copy of the canvas in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tile {
    /// Grid position relative to the main tile.
    pub col: i64,
    pub row: i64,
    pub rect: Rect,
    pub is_main: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TiledLayout {
    /// Never above 1: the canvas is shrunk to fit, never enlarged.
    pub fit_scale: f64,
    pub tile_size: Size2D,
    pub tiles: Vec<Tile>,
}

impl TiledLayout {
    fn empty() -> Self {
        Self {
            fit_scale: 0.0,
            tile_size: Size2D::zero(),
            tiles: Vec::new(),
        }
    }

    pub fn main_tile(&self) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.is_main)
    }
}

/// Lay tiles out so they cover the viewport. A zero-sized viewport or
/// canvas has no tiles.
pub fn compute_tiles(canvas: CanvasSize, viewport: ViewportSize) -> TiledLayout {
    if viewport.is_empty() || !canvas.is_valid() {
        return TiledLayout::empty();
    }
    let (vw, vh) = (viewport.width as f64, viewport.height as f64);
    let (cw, ch) = (canvas.width as f64, canvas.height as f64);

    let fit_scale = (vw / cw).min(vh / ch).min(1.0);
    let (tw, th) = (cw * fit_scale, ch * fit_scale);

    let main_x = (vw / 2.0 - tw / 2.0).floor();
    let main_y = (vh / 2.0 - th / 2.0).floor();

    let left = (main_x / tw).ceil() as i64 + 1;
    let right = ((vw - main_x - tw) / tw).ceil() as i64 + 1;
    let top = (main_y / th).ceil() as i64 + 1;
    let bottom = ((vh - main_y - th) / th).ceil() as i64 + 1;

    let bounds = Rect::new(0.0, 0.0, vw, vh);
    let mut tiles = Vec::new();
    for row in -top..=bottom {
        for col in -left..=right {
            let rect = Rect::new(main_x + col as f64 * tw, main_y + row as f64 * th, tw, th);
            if rect.intersects(&bounds) {
                tiles.push(Tile {
                    col,
                    row,
                    rect,
                    is_main: col == 0 && row == 0,
                });
            }
        }
    }

    TiledLayout {
        fit_scale,
        tile_size: Size2D::new(tw, th),
        tiles,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveOptions {
    /// Opacity of every non-main tile.
    pub tile_opacity: f64,
    pub highlight_main: bool,
}

impl Default for LiveOptions {
    fn default() -> Self {
        LiveConfig::default().into()
    }
}

impl From<LiveConfig> for LiveOptions {
    fn from(config: LiveConfig) -> Self {
        Self {
            tile_opacity: config.tile_opacity,
            highlight_main: config.highlight_main,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiveTile {
    pub tile: Tile,
    pub opacity: f64,
    pub highlighted: bool,
}

/// Everything the live view shows for one scene state.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveFrame {
    pub viewport: ViewportSize,
    pub canvas: CanvasSize,
    pub fit_scale: f64,
    pub background: Color,
    pub tiles: Vec<LiveTile>,
    pub layers: Vec<CompositeLayer>,
}

fn build_frame(
    scene: &ProjectConfig,
    viewport: ViewportSize,
    layout: &TiledLayout,
    options: LiveOptions,
    animators: Option<&ScrollAnimators>,
) -> LiveFrame {
    let tiles = layout
        .tiles
        .iter()
        .map(|tile| LiveTile {
            tile: *tile,
            opacity: if tile.is_main { 1.0 } else { options.tile_opacity },
            highlighted: tile.is_main && options.highlight_main,
        })
        .collect();
    LiveFrame {
        viewport,
        canvas: scene.canvas_size,
        fit_scale: layout.fit_scale,
        background: scene.background(),
        tiles,
        layers: compose_layers(scene, animators),
    }
}

/// Build the live view without caching the layout.
#[tracing::instrument(skip_all, fields(viewport = %viewport))]
pub fn render_live(
    scene: &ProjectConfig,
    viewport: ViewportSize,
    options: LiveOptions,
    animators: Option<&ScrollAnimators>,
) -> LiveFrame {
    let layout = compute_tiles(scene.canvas_size, viewport);
    build_frame(scene, viewport, &layout, options, animators)
}

/// A live view that keeps its tiling until the canvas or viewport size
/// changes.
#[derive(Debug, Default)]
pub struct LiveView {
    key: Option<(CanvasSize, ViewportSize)>,
    layout: Option<TiledLayout>,
    layouts_computed: u64,
}

impl LiveView {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tiling for these sizes, recomputed only when they changed.
    pub fn layout(&mut self, canvas: CanvasSize, viewport: ViewportSize) -> &TiledLayout {
        if self.key != Some((canvas, viewport)) {
            tracing::debug!("retiling {} canvas for {} viewport", canvas, viewport);
            self.key = Some((canvas, viewport));
            self.layout = None;
            self.layouts_computed += 1;
        }
        self.layout
            .get_or_insert_with(|| compute_tiles(canvas, viewport))
    }

    pub fn render(
        &mut self,
        scene: &ProjectConfig,
        viewport: ViewportSize,
        options: LiveOptions,
        animators: Option<&ScrollAnimators>,
    ) -> LiveFrame {
        let layout = self.layout(scene.canvas_size, viewport).clone();
        build_frame(scene, viewport, &layout, options, animators)
    }

    /// How many times the tiling was computed.
    pub fn layouts_computed(&self) -> u64 {
        self.layouts_computed
    }
}
