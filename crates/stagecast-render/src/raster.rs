//! CPU rasterization of preview and live frames.
//!
//! Both surfaces draw the canvas through [`Rasterizer::render_canvas`], so
//! the same scene state produces the same canvas pixels in either view.

use std::collections::HashMap;

use stagecast_core::{Affine2D, Color, FrameBuffer, Point2D, Rect, Size2D};
use stagecast_ir::CanvasSize;

use crate::composite::CompositeLayer;
use crate::effects::apply_effects;
use crate::media::MediaCache;
use crate::preview::PreviewFrame;
use crate::tiled::LiveFrame;

const GRID_SPACING: f64 = 20.0;
const OUTLINE_WIDTH: f64 = 2.0;
const DASH_ON: f64 = 6.0;
const DASH_PERIOD: f64 = 10.0;
const BORDER_WIDTH: u32 = 2;
const EMPTY_BOX: f64 = 64.0;

fn grid_color() -> Color {
    Color::ACCENT.with_alpha(0.15)
}

fn outline_color() -> Color {
    Color::ACCENT.with_alpha(0.8)
}

fn border_color() -> Color {
    Color::ACCENT.with_alpha(0.5)
}

fn highlight_color() -> Color {
    Color::ACCENT.with_alpha(0.3)
}

fn live_backdrop() -> Color {
    Color::BLACK
}

pub struct Rasterizer<'a> {
    media: &'a MediaCache,
}

impl<'a> Rasterizer<'a> {
    pub fn new(media: &'a MediaCache) -> Self {
        Self { media }
    }

    /// Background plus every layer, at canvas resolution.
    pub fn render_canvas(
        &self,
        canvas: CanvasSize,
        background: &Color,
        layers: &[CompositeLayer],
    ) -> FrameBuffer {
        let mut surface = FrameBuffer::solid(canvas.width, canvas.height, background);
        for layer in layers {
            self.draw_layer(&mut surface, layer);
        }
        surface
    }

    /// The preview surface at its display scale. With a border the surface
    /// grows by the border width on every side.
    #[tracing::instrument(skip_all, fields(canvas = %frame.canvas, scale = frame.options.scale))]
    pub fn rasterize_preview(&self, frame: &PreviewFrame) -> FrameBuffer {
        let mut canvas = self.render_canvas(frame.canvas, &frame.background, &frame.layers);
        let box_size = frame.canvas.to_size();

        if frame.options.show_grid {
            draw_grid(&mut canvas);
        }
        if let Some(layer) = frame
            .outline
            .as_ref()
            .and_then(|o| frame.layers.get(o.layer_index))
        {
            let m = layer
                .style
                .matrix_about(Rect::from_size(box_size).center());
            draw_dashed_outline(&mut canvas, &m, box_size);
        }
        if frame.empty_state {
            draw_empty_state(&mut canvas);
        }

        let scale = frame.options.scale;
        let scaled = resample_nearest(
            &canvas,
            (box_size.width * scale).round().max(0.0) as u32,
            (box_size.height * scale).round().max(0.0) as u32,
        );
        if !frame.options.show_border {
            return scaled;
        }

        let mut out = FrameBuffer::new(
            scaled.width + 2 * BORDER_WIDTH,
            scaled.height + 2 * BORDER_WIDTH,
        );
        let ring = Rect::new(0.0, 0.0, out.width as f64, out.height as f64);
        draw_ring(&mut out, &ring, BORDER_WIDTH as f64, &border_color());
        out.composite_over(&scaled, BORDER_WIDTH as i32, BORDER_WIDTH as i32);
        out
    }

    /// The live surface: every tile over a black backdrop.
    #[tracing::instrument(skip_all, fields(viewport = %frame.viewport, tiles = frame.tiles.len()))]
    pub fn rasterize_live(&self, frame: &LiveFrame) -> FrameBuffer {
        let mut out = FrameBuffer::solid(
            frame.viewport.width,
            frame.viewport.height,
            &live_backdrop(),
        );
        if frame.tiles.is_empty() {
            return out;
        }

        let canvas = self.render_canvas(frame.canvas, &frame.background, &frame.layers);
        // Tiles share rounded edges, so a fractional tile size alternates
        // between two pixel spans instead of leaving seams.
        let mut scaled: HashMap<(u32, u32), FrameBuffer> = HashMap::new();
        for live in &frame.tiles {
            let r = live.tile.rect;
            let (x0, x1) = (r.x.round(), r.right().round());
            let (y0, y1) = (r.y.round(), r.bottom().round());
            let span = ((x1 - x0).max(0.0) as u32, (y1 - y0).max(0.0) as u32);
            let tile = scaled
                .entry(span)
                .or_insert_with(|| resample_nearest(&canvas, span.0, span.1));
            if live.opacity >= 1.0 {
                out.composite_over(tile, x0 as i32, y0 as i32);
            } else {
                let mut faded = tile.clone();
                faded.multiply_alpha(live.opacity as f32);
                out.composite_over(&faded, x0 as i32, y0 as i32);
            }
        }
        for live in frame.tiles.iter().filter(|t| t.highlighted) {
            let r = live.tile.rect;
            let w = OUTLINE_WIDTH;
            let outer = Rect::new(r.x - w, r.y - w, r.width + 2.0 * w, r.height + 2.0 * w);
            draw_ring(&mut out, &outer, w, &highlight_color());
        }
        out
    }

    fn draw_layer(&self, dst: &mut FrameBuffer, layer: &CompositeLayer) {
        let Some(media) = self.media.get(&layer.source) else {
            tracing::warn!("no decoded media for layer '{}'; skipping", layer.id);
            return;
        };
        if media.is_empty() || dst.is_empty() {
            return;
        }
        let box_size = Size2D::new(dst.width as f64, dst.height as f64);

        let mut local = FrameBuffer::new(dst.width, dst.height);
        match layer.scroll_offset {
            Some(offset) => draw_tiled(&mut local, media, offset),
            None => draw_contained(&mut local, media),
        }
        apply_effects(&mut local, &layer.style.effects);

        let m = layer.style.matrix_about(Rect::from_size(box_size).center());
        if m == Affine2D::IDENTITY {
            dst.composite_over(&local, 0, 0);
            return;
        }
        let Some(inv) = m.invert() else {
            return;
        };
        let bounds = m.bounds_of(&Rect::from_size(box_size));
        let x0 = bounds.x.floor().max(0.0) as u32;
        let y0 = bounds.y.floor().max(0.0) as u32;
        let x1 = (bounds.right().ceil().max(0.0) as u32).min(dst.width);
        let y1 = (bounds.bottom().ceil().max(0.0) as u32).min(dst.height);
        for y in y0..y1 {
            for x in x0..x1 {
                let q = inv.apply(Point2D::new(x as f64 + 0.5, y as f64 + 0.5));
                if q.x < 0.0 || q.y < 0.0 {
                    continue;
                }
                if let Some(px) = local.get_pixel(q.x as u32, q.y as u32) {
                    dst.blend_pixel(x, y, px);
                }
            }
        }
    }
}

/// Media at natural size, shrunk to fit if needed, centered.
fn draw_contained(local: &mut FrameBuffer, media: &FrameBuffer) {
    let box_size = Size2D::new(local.width as f64, local.height as f64);
    let natural = Size2D::new(media.width as f64, media.height as f64);
    let size = if natural.width <= box_size.width && natural.height <= box_size.height {
        natural
    } else {
        natural.fit_within(box_size)
    };
    if size.is_empty() {
        return;
    }
    let rect = Rect::from_size(box_size).centered(size);
    let x0 = rect.x.round().max(0.0) as u32;
    let y0 = rect.y.round().max(0.0) as u32;
    let x1 = (rect.right().round().max(0.0) as u32).min(local.width);
    let y1 = (rect.bottom().round().max(0.0) as u32).min(local.height);
    let sx = media.width as f64 / rect.width;
    let sy = media.height as f64 / rect.height;
    for y in y0..y1 {
        let my = (((y as f64 + 0.5 - rect.y) * sy) as u32).min(media.height - 1);
        for x in x0..x1 {
            let mx = (((x as f64 + 0.5 - rect.x) * sx) as u32).min(media.width - 1);
            if let Some(px) = media.get_pixel(mx, my) {
                local.set_pixel(x, y, px);
            }
        }
    }
}

/// The 2×2 tile grid, each tile the media stretched over the whole box,
/// translated by `offset`.
fn draw_tiled(local: &mut FrameBuffer, media: &FrameBuffer, offset: Point2D) {
    let (w, h) = (local.width as f64, local.height as f64);
    let sx = media.width as f64 / w;
    let sy = media.height as f64 / h;
    for y in 0..local.height {
        let v = (y as f64 + 0.5 - offset.y).rem_euclid(h);
        let my = ((v * sy) as u32).min(media.height - 1);
        for x in 0..local.width {
            let u = (x as f64 + 0.5 - offset.x).rem_euclid(w);
            let mx = ((u * sx) as u32).min(media.width - 1);
            if let Some(px) = media.get_pixel(mx, my) {
                local.set_pixel(x, y, px);
            }
        }
    }
}

/// Nearest-neighbour resize. Same-size input is returned as a copy.
pub fn resample_nearest(src: &FrameBuffer, width: u32, height: u32) -> FrameBuffer {
    if src.width == width && src.height == height {
        return src.clone();
    }
    let mut out = FrameBuffer::new(width, height);
    if src.is_empty() {
        return out;
    }
    for y in 0..height {
        let sy = ((y as u64 * src.height as u64) / height as u64) as u32;
        for x in 0..width {
            let sx = ((x as u64 * src.width as u64) / width as u64) as u32;
            if let Some(px) = src.get_pixel(sx, sy) {
                out.set_pixel(x, y, px);
            }
        }
    }
    out
}

fn draw_grid(surface: &mut FrameBuffer) {
    let color = grid_color();
    let (w, h) = (surface.width as f64, surface.height as f64);
    let mut x = GRID_SPACING;
    while x < w {
        surface.fill_rect(&Rect::new(x, 0.0, 1.0, h), &color);
        x += GRID_SPACING;
    }
    let mut y = GRID_SPACING;
    while y < h {
        surface.fill_rect(&Rect::new(0.0, y, w, 1.0), &color);
        y += GRID_SPACING;
    }
}

/// A `width`-thick ring just inside `rect`.
fn draw_ring(surface: &mut FrameBuffer, rect: &Rect, width: f64, color: &Color) {
    surface.fill_rect(&Rect::new(rect.x, rect.y, rect.width, width), color);
    surface.fill_rect(
        &Rect::new(rect.x, rect.bottom() - width, rect.width, width),
        color,
    );
    surface.fill_rect(
        &Rect::new(rect.x, rect.y + width, width, rect.height - 2.0 * width),
        color,
    );
    surface.fill_rect(
        &Rect::new(
            rect.right() - width,
            rect.y + width,
            width,
            rect.height - 2.0 * width,
        ),
        color,
    );
}

/// A dashed border along the inside of the layer box, transformed with the
/// layer.
fn draw_dashed_outline(surface: &mut FrameBuffer, m: &Affine2D, box_size: Size2D) {
    let rgba = outline_color().to_rgba8();
    let (w, h) = (box_size.width, box_size.height);
    let mut plot = |p: Point2D| {
        let q = m.apply(p);
        if q.x >= 0.0 && q.y >= 0.0 {
            surface.set_pixel(q.x as u32, q.y as u32, rgba);
        }
    };
    let mut t = 0.0;
    while t < w.max(h) {
        if t % DASH_PERIOD < DASH_ON {
            let mut inset = 0.5;
            while inset < OUTLINE_WIDTH {
                if t < w {
                    plot(Point2D::new(t + 0.5, inset));
                    plot(Point2D::new(t + 0.5, h - inset));
                }
                if t < h {
                    plot(Point2D::new(inset, t + 0.5));
                    plot(Point2D::new(w - inset, t + 0.5));
                }
                inset += 1.0;
            }
        }
        t += 1.0;
    }
}

/// A dashed square with a plus sign in the middle of the canvas.
fn draw_empty_state(surface: &mut FrameBuffer) {
    let center = Rect::new(0.0, 0.0, surface.width as f64, surface.height as f64).center();
    let half = EMPTY_BOX / 2.0;
    let origin = Affine2D::translate(center.x - half, center.y - half);
    draw_dashed_outline(surface, &origin, Size2D::new(EMPTY_BOX, EMPTY_BOX));

    let color = outline_color().with_alpha(0.5);
    let arm = 12.0;
    surface.fill_rect(&Rect::new(center.x - arm, center.y - 1.0, 2.0 * arm, 2.0), &color);
    surface.fill_rect(&Rect::new(center.x - 1.0, center.y - arm, 2.0, 2.0 * arm), &color);
}
