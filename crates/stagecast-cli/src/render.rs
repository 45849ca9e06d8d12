//! `stagecast render`: simulate the scroll animation up to a point in time
//! and write one rasterized frame.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};

use stagecast_core::hash::hash_frame;
use stagecast_core::{FrameBuffer, FrameTime, StagecastConfig};
use stagecast_render::{
    render_live, render_preview, LiveOptions, ManualScheduler, MediaCache, PreviewOptions,
    Rasterizer, ScrollAnimators, ViewportSize,
};

use crate::load_scene;

/// Simulated display refresh rate.
const FRAME_RATE: f64 = 60.0;

pub struct RenderArgs {
    pub file: PathBuf,
    pub output: PathBuf,
    pub time: f64,
    pub scale: Option<f64>,
    pub viewport: Option<ViewportSize>,
}

pub fn cmd_render(config: &StagecastConfig, args: RenderArgs) -> Result<()> {
    if !args.time.is_finite() || args.time < 0.0 {
        anyhow::bail!("--time must be a non-negative number of seconds");
    }
    if let Some(scale) = args.scale {
        if !scale.is_finite() || scale <= 0.0 {
            anyhow::bail!("--scale must be greater than zero");
        }
    }

    let start = Instant::now();
    println!("🎬 Rendering {}", args.file.display());
    let scene = load_scene(&args.file)?;

    let mut media = match media_root(config, &args.file) {
        Some(root) => MediaCache::with_root(root),
        None => MediaCache::new(),
    };
    let failures = media.preload(&scene);
    if !failures.is_empty() {
        println!("   ⚠️  {} layer(s) skipped, media unavailable", failures.len());
    }

    let mut sched = ManualScheduler::new();
    let mut animators = ScrollAnimators::new();
    animators.sync(&scene, &mut sched);
    if !animators.is_empty() {
        animators.run_frames(&mut sched, frame_times(args.time), scene.canvas_size.to_size());
        tracing::debug!(
            "simulated {:.2}s of scrolling ({} frame requests)",
            args.time,
            sched.request_count()
        );
    }

    let raster = Rasterizer::new(&media);
    let frame = match args.viewport {
        Some(viewport) => {
            let options = LiveOptions::from(config.live.clone());
            let live = render_live(&scene, viewport, options, Some(&animators));
            println!(
                "   Live view {}: {} tile(s) at {:.0}%",
                viewport,
                live.tiles.len(),
                live.fit_scale * 100.0
            );
            raster.rasterize_live(&live)
        }
        None => {
            let mut options = PreviewOptions::from(config.preview.clone());
            if let Some(scale) = args.scale {
                options.scale = scale;
            }
            let preview = render_preview(&scene, None, options, Some(&animators));
            println!("   Preview {}", preview.readout);
            raster.rasterize_preview(&preview)
        }
    };

    write_png(&frame, &args.output)?;
    println!(
        "   ✓ {}x{} written to {} in {:.2?}",
        frame.width,
        frame.height,
        args.output.display(),
        start.elapsed()
    );
    println!("   Hash: {}", hash_frame(&frame).to_hex());
    Ok(())
}

/// Relative sources resolve against the configured root, else against the
/// directory holding the scene document.
fn media_root(config: &StagecastConfig, scene_file: &Path) -> Option<PathBuf> {
    config.media.root.clone().or_else(|| {
        scene_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
    })
}

fn frame_times(seconds: f64) -> impl Iterator<Item = FrameTime> {
    let frames = (seconds * FRAME_RATE).ceil() as u64;
    (0..=frames).map(move |i| FrameTime::from_seconds((i as f64 / FRAME_RATE).min(seconds)))
}

fn write_png(frame: &FrameBuffer, path: &Path) -> Result<()> {
    if frame.is_empty() {
        anyhow::bail!("nothing to write: rendered frame is empty");
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
        .context("frame buffer does not match its dimensions")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    img.save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
