//! CPU implementations of the appearance effects, following the CSS
//! Filter Effects definitions for each function.

use stagecast_core::FrameBuffer;

use crate::resolve::AppearanceEffect;

/// Apply `effects` in order to a straight-alpha frame.
pub fn apply_effects(frame: &mut FrameBuffer, effects: &[AppearanceEffect]) {
    for effect in effects {
        match *effect {
            AppearanceEffect::Opacity(v) => frame.multiply_alpha(v as f32),
            AppearanceEffect::HueRotate(deg) => {
                if deg % 360.0 != 0.0 {
                    apply_matrix(frame, &hue_rotate_matrix(deg));
                }
            }
            AppearanceEffect::Brightness(v) => {
                if v != 1.0 {
                    map_channels(frame, |c| c * v);
                }
            }
            AppearanceEffect::Contrast(v) => {
                if v != 1.0 {
                    map_channels(frame, |c| (c - 0.5) * v + 0.5);
                }
            }
            AppearanceEffect::Saturate(v) => {
                if v != 1.0 {
                    apply_matrix(frame, &saturate_matrix(v));
                }
            }
            AppearanceEffect::Blur(sigma) => {
                if sigma > 0.0 {
                    gaussian_blur(frame, sigma);
                }
            }
        }
    }
}

type ColorMatrix = [[f64; 3]; 3];

pub fn hue_rotate_matrix(degrees: f64) -> ColorMatrix {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}

pub fn saturate_matrix(s: f64) -> ColorMatrix {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn to_unit(v: u8) -> f64 {
    v as f64 / 255.0
}

fn to_byte(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn apply_matrix(frame: &mut FrameBuffer, m: &ColorMatrix) {
    for px in frame.data.chunks_exact_mut(4) {
        if px[3] == 0 {
            continue;
        }
        let rgb = [to_unit(px[0]), to_unit(px[1]), to_unit(px[2])];
        for (c, row) in m.iter().enumerate() {
            px[c] = to_byte(row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2]);
        }
    }
}

fn map_channels(frame: &mut FrameBuffer, f: impl Fn(f64) -> f64) {
    for px in frame.data.chunks_exact_mut(4) {
        if px[3] == 0 {
            continue;
        }
        for c in px.iter_mut().take(3) {
            *c = to_byte(f(to_unit(*c)));
        }
    }
}

/// Gaussian blur with standard deviation `sigma` pixels. Edges clamp;
/// colors are blurred premultiplied so transparent pixels do not bleed
/// black.
///
/// The radius is capped at the larger frame dimension: past that every
/// tap already lands on a clamped edge pixel.
pub fn gaussian_blur(frame: &mut FrameBuffer, sigma: f64) {
    if frame.is_empty() || !sigma.is_finite() || sigma <= 0.0 {
        return;
    }
    let max_radius = frame.width.max(frame.height) as usize;
    let radius = (sigma * 3.0).ceil().min(max_radius as f64) as usize;
    let kernel = gaussian_kernel_q16(radius, sigma);

    premultiply(&mut frame.data);
    let mut tmp = vec![0u8; frame.data.len()];
    horizontal_pass(&frame.data, &mut tmp, frame.width, frame.height, &kernel);
    vertical_pass(&tmp, &mut frame.data, frame.width, frame.height, &kernel);
    unpremultiply(&mut frame.data);
}

/// Normalized weights in 16.16 fixed point, summing to exactly 1.0.
fn gaussian_kernel_q16(radius: usize, sigma: f64) -> Vec<u32> {
    let r = radius as i64;
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = i as f64;
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|w| ((w / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let mid = weights.len() / 2;
    weights[mid] = (i64::from(weights[mid]) + 65536 - acc).clamp(0, 65536) as u32;
    weights
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = i64::from(width);
    for y in 0..i64::from(height) {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i64 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let (w, h) = (i64::from(width), i64::from(height));
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i64 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

fn premultiply(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        for c in px.iter_mut().take(3) {
            *c = ((u32::from(*c) * a + 127) / 255) as u8;
        }
    }
}

fn unpremultiply(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in px.iter_mut().take(3) {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}
