use crate::color::Color;
use crate::math::Rect;

/// A raster surface of 8-bit RGBA pixels (straight alpha, row-major).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Raw pixel data, 4 bytes per pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Create a new frame buffer filled with zeros (transparent black).
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width as usize) * (height as usize) * 4;
        Self {
            data: vec![0u8; size],
            width,
            height,
        }
    }

    /// Create a frame buffer filled with a solid color.
    pub fn solid(width: u32, height: u32, color: &Color) -> Self {
        let pixel = color.to_rgba8();
        let pixel_count = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            data.extend_from_slice(&pixel);
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Wrap existing RGBA bytes. Returns `None` when the length does not match.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != (width as usize) * (height as usize) * 4 {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
        })
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Get the RGBA value at a pixel coordinate. Returns None if out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ])
    }

    /// Set the RGBA value at a pixel coordinate. No-op if out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data[offset..offset + 4].copy_from_slice(&rgba);
    }

    /// Blend a single pixel over the existing content. No-op if out of bounds.
    pub fn blend_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        blend_over(&rgba, &mut self.data[offset..offset + 4]);
    }

    /// Blend `color` over every pixel whose center lies inside `rect`.
    pub fn fill_rect(&mut self, rect: &Rect, color: &Color) {
        let rgba = color.to_rgba8();
        let x0 = rect.x.round().max(0.0) as u32;
        let y0 = rect.y.round().max(0.0) as u32;
        let x1 = (rect.right().round().max(0.0) as u32).min(self.width);
        let y1 = (rect.bottom().round().max(0.0) as u32).min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend_pixel(x, y, rgba);
            }
        }
    }

    /// Scale every pixel's alpha by `factor` (clamped to [0, 1]).
    pub fn multiply_alpha(&mut self, factor: f32) {
        let factor = factor.clamp(0.0, 1.0);
        if factor >= 1.0 {
            return;
        }
        for px in self.data.chunks_exact_mut(4) {
            px[3] = (px[3] as f32 * factor).round() as u8;
        }
    }

    /// Alpha-composite `src` on top of `self` at position (dx, dy).
    /// Uses integer math that auto-vectorizes well.
    pub fn composite_over(&mut self, src: &FrameBuffer, dx: i32, dy: i32) {
        let dst_width = self.width as i32;
        let dst_height = self.height as i32;

        let mut start_y = 0;
        let mut end_y = src.height as i32;
        let mut start_x = 0;
        let mut end_x = src.width as i32;

        if dy < 0 {
            start_y = -dy;
        }
        if dy + end_y > dst_height {
            end_y = dst_height - dy;
        }
        if dx < 0 {
            start_x = -dx;
        }
        if dx + end_x > dst_width {
            end_x = dst_width - dx;
        }

        if start_x >= end_x || start_y >= end_y {
            return;
        }

        let src_stride = (src.width * 4) as usize;
        let dst_stride = (self.width * 4) as usize;

        for sy in start_y..end_y {
            let dst_y = dy + sy;
            let src_row_start = (sy as usize * src_stride) + (start_x as usize * 4);
            let dst_row_start = (dst_y as usize * dst_stride) + ((dx + start_x) as usize * 4);
            let len = (end_x - start_x) as usize * 4;

            let src_slice = &src.data[src_row_start..src_row_start + len];
            let dst_slice = &mut self.data[dst_row_start..dst_row_start + len];

            for (s, d) in src_slice.chunks_exact(4).zip(dst_slice.chunks_exact_mut(4)) {
                blend_over(s, d);
            }
        }
    }
}

/// Porter-Duff "over" for one straight-alpha pixel.
#[inline]
fn blend_over(s: &[u8], d: &mut [u8]) {
    let sa = s[3] as u32;
    if sa == 0 {
        return;
    }
    if sa == 255 {
        d.copy_from_slice(&s[..4]);
        return;
    }

    let da = d[3] as u32;
    let inv_sa = 255 - sa;
    let out_a = sa + ((da * inv_sa) / 255);
    if out_a == 0 {
        return;
    }

    for c in 0..3 {
        let sc = s[c] as u32;
        let dc = d[c] as u32;
        d[c] = ((sc * sa * 255 + dc * da * inv_sa) / (out_a * 255)) as u8;
    }
    d[3] = out_a as u8;
}
