use chrono::{TimeZone, Utc};
use serde_json::json;

use stagecast_core::hash::hash_frame;
use stagecast_core::{Color, FrameBuffer, FrameTime, Point2D, Size2D};
use stagecast_ir::{
    import_document, CanvasSize, FilterKind, Layer, LayerId, MediaType, ProjectConfig,
};
use stagecast_render::{
    compose_layers, compute_tiles, render_live, render_preview, resolve_layer, LiveOptions,
    ManualScheduler, MediaCache, PreviewOptions, Rasterizer, ScrollAnimators, ViewportSize,
};

fn frame_times(seconds: f64, fps: f64) -> impl Iterator<Item = FrameTime> {
    let frames = (seconds * fps).round() as u64;
    (0..=frames).map(move |i| FrameTime::from_seconds(i as f64 / fps))
}

fn scroll_scene(vx: f64, vy: f64) -> ProjectConfig {
    let doc = json!({
        "canvasSize": {"width": 1920, "height": 1080},
        "backgroundColor": "#000000",
        "layers": [{
            "id": "b",
            "type": "image",
            "source": "tile.png",
            "zIndex": 1,
            "filters": {
                "activeFilters": ["uvScroll"],
                "uvScrollX": vx,
                "uvScrollY": vy
            }
        }]
    });
    import_document(&doc.to_string(), Utc::now()).unwrap()
}

#[test]
fn test_two_layer_scenario() {
    let doc = json!({
        "canvasSize": {"width": 1920, "height": 1080},
        "backgroundColor": "#000000",
        "layers": [
            {
                "id": "b",
                "type": "image",
                "source": "stars.png",
                "zIndex": 2,
                "filters": {"activeFilters": ["uvScroll"], "uvScrollX": 2, "uvScrollY": 0}
            },
            {
                "id": "a",
                "type": "image",
                "source": "logo.png",
                "zIndex": 1,
                "filters": {"uvScrollX": 0}
            }
        ]
    });
    let scene = import_document(&doc.to_string(), Utc::now()).unwrap();

    let mut sched = ManualScheduler::new();
    let mut animators = ScrollAnimators::new();
    animators.sync(&scene, &mut sched);
    assert_eq!(animators.len(), 1);

    let tile = scene.canvas_size.to_size();
    let t = 30.0;
    animators.run_frames(&mut sched, frame_times(t, 60.0), tile);

    let layers = compose_layers(&scene, Some(&animators));
    let order: Vec<&str> = layers.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(order, vec!["a", "b"]);
    assert!(!layers[0].is_scrolling());
    assert!(layers[1].is_scrolling());

    let expected = (2.0 * t * 50.0) % tile.width;
    let position = animators.get(&LayerId::new("b")).unwrap().position();
    assert!((position.x - expected).abs() < 1e-6, "{} vs {}", position.x, expected);
    assert_eq!(position.y, 0.0);
    assert_eq!(layers[1].scroll_offset, Some(Point2D::new(-position.x, 0.0)));
}

#[test]
fn test_scroll_stays_wrapped_for_48_hours() {
    let tile = Size2D::new(1920.0, 1080.0);
    for (vx, vy) in [(3.7, -1.3), (-10.0, 0.25), (0.001, 9.0)] {
        let scene = scroll_scene(vx, vy);
        let mut sched = ManualScheduler::new();
        let mut animators = ScrollAnimators::new();
        animators.sync(&scene, &mut sched);

        let id = LayerId::new("b");
        let hours_48 = 48.0 * 3600.0;
        // One callback per simulated second keeps the run short while
        // covering the full span.
        for now in frame_times(hours_48, 1.0) {
            animators.run_frames(&mut sched, [now], tile);
            let p = animators.get(&id).unwrap().position();
            assert!(p.x >= 0.0 && p.x < tile.width, "x = {}", p.x);
            assert!(p.y >= 0.0 && p.y < tile.height, "y = {}", p.y);
        }
    }
}

#[test]
fn test_zero_velocity_never_schedules() {
    let scene = scroll_scene(0.0, 0.0);
    let mut sched = ManualScheduler::new();
    let mut animators = ScrollAnimators::new();
    animators.sync(&scene, &mut sched);
    animators.run_frames(&mut sched, frame_times(10.0, 60.0), scene.canvas_size.to_size());

    assert_eq!(sched.request_count(), 0);
    assert_eq!(sched.pending_count(), 0);
    assert_eq!(
        animators.offset(&LayerId::new("b")),
        Some(Point2D::zero())
    );
}

#[test]
fn test_velocity_change_restarts_from_fresh_origin() {
    let scene = scroll_scene(1.0, 0.0);
    let tile = scene.canvas_size.to_size();
    let mut sched = ManualScheduler::new();
    let mut animators = ScrollAnimators::new();
    animators.sync(&scene, &mut sched);
    animators.run_frames(&mut sched, frame_times(1.0, 10.0), tile);
    let before = animators.get(&LayerId::new("b")).unwrap().position().x;
    assert!((before - 50.0).abs() < 1e-9);

    // A long pause, then a speed change: the pause must not count.
    let faster = scroll_scene(2.0, 0.0);
    animators.sync(&faster, &mut sched);
    let resumed = [FrameTime::from_seconds(100.0), FrameTime::from_seconds(101.0)];
    animators.run_frames(&mut sched, resumed, tile);
    let after = animators.get(&LayerId::new("b")).unwrap().position().x;
    assert!((after - 150.0).abs() < 1e-9);
}

#[test]
fn test_tiles_cover_viewport() {
    let cases = [
        (CanvasSize::new(1920, 1080), ViewportSize::new(1920, 1080)),
        (CanvasSize::new(1920, 1080), ViewportSize::new(2560, 1440)),
        (CanvasSize::new(1080, 1920), ViewportSize::new(1920, 1080)),
        (CanvasSize::new(300, 250), ViewportSize::new(1366, 768)),
        (CanvasSize::new(3840, 2160), ViewportSize::new(801, 599)),
        (CanvasSize::new(1000, 1000), ViewportSize::new(333, 1200)),
    ];
    for (canvas, viewport) in cases {
        let layout = compute_tiles(canvas, viewport);
        assert_eq!(
            layout.tiles.iter().filter(|t| t.is_main).count(),
            1,
            "{} in {}",
            canvas,
            viewport
        );

        let step = 7;
        let mut xs: Vec<u32> = (0..viewport.width).step_by(step).collect();
        xs.push(viewport.width - 1);
        let mut ys: Vec<u32> = (0..viewport.height).step_by(step).collect();
        ys.push(viewport.height - 1);
        for &y in &ys {
            for &x in &xs {
                let p = Point2D::new(x as f64 + 0.5, y as f64 + 0.5);
                assert!(
                    layout.tiles.iter().any(|t| t.rect.contains(p)),
                    "gap at ({}, {}) for {} in {}",
                    x,
                    y,
                    canvas,
                    viewport
                );
            }
        }
    }
}

#[test]
fn test_blur_toggle_off_keeps_value() {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut layer = Layer::new(LayerId::new("l"), "l", MediaType::Image, "l.png", 1, now);
    layer.filters.blur = 10.0;
    layer.filters.toggles.attach(FilterKind::Blur);
    assert!(resolve_layer(&layer).unwrap().css_filter().contains("blur(10px)"));

    layer.filters.toggles.set_enabled(FilterKind::Blur, false);
    assert!(!resolve_layer(&layer).unwrap().css_filter().contains("blur"));
    assert_eq!(layer.filters.blur, 10.0);

    layer.filters.toggles.set_enabled(FilterKind::Blur, true);
    assert!(resolve_layer(&layer).unwrap().css_filter().contains("blur(10px)"));
}

fn gradient(width: u32, height: u32) -> FrameBuffer {
    let mut fb = FrameBuffer::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            fb.set_pixel(x, y, [r, g, 128, 255]);
        }
    }
    fb
}

fn crop(src: &FrameBuffer, x0: u32, y0: u32, width: u32, height: u32) -> FrameBuffer {
    let mut out = FrameBuffer::new(width, height);
    for y in 0..height {
        for x in 0..width {
            if let Some(px) = src.get_pixel(x0 + x, y0 + y) {
                out.set_pixel(x, y, px);
            }
        }
    }
    out
}

#[test]
fn test_preview_matches_live_main_tile() {
    let doc = json!({
        "canvasSize": {"width": 64, "height": 48},
        "backgroundColor": "#1a2b3c",
        "layers": [
            {
                "id": "bg",
                "type": "image",
                "source": "bg",
                "zIndex": 1,
                "filters": {"activeFilters": ["uvScroll"], "uvScrollX": 1.5, "uvScrollY": -0.5}
            },
            {
                "id": "logo",
                "type": "image",
                "source": "logo",
                "zIndex": 2,
                "filters": {
                    "opacity": 80,
                    "rotation": 30,
                    "scale": 0.75,
                    "offsetX": 5,
                    "hueRotate": 90,
                    "flipX": true,
                    "activeFilters": ["hueRotate", "blur"],
                    "blur": 1
                }
            }
        ]
    });
    let scene = import_document(&doc.to_string(), Utc::now()).unwrap();

    let mut media = MediaCache::new();
    media.register("bg", gradient(16, 16));
    media.register("logo", FrameBuffer::solid(20, 10, &Color::rgb(1.0, 0.5, 0.0)));

    let mut sched = ManualScheduler::new();
    let mut animators = ScrollAnimators::new();
    animators.sync(&scene, &mut sched);
    animators.run_frames(&mut sched, frame_times(2.5, 30.0), scene.canvas_size.to_size());

    let raster = Rasterizer::new(&media);
    let preview_options = PreviewOptions {
        scale: 1.0,
        show_border: false,
        show_grid: false,
    };
    let preview = raster.rasterize_preview(&render_preview(
        &scene,
        None,
        preview_options,
        Some(&animators),
    ));

    let live_options = LiveOptions {
        tile_opacity: 0.7,
        highlight_main: false,
    };
    let viewport = ViewportSize::new(200, 100);
    let live_frame = render_live(&scene, viewport, live_options, Some(&animators));
    let live = raster.rasterize_live(&live_frame);
    let main = live_frame
        .tiles
        .iter()
        .find(|t| t.tile.is_main)
        .unwrap()
        .tile
        .rect;
    let main_crop = crop(&live, main.x as u32, main.y as u32, 64, 48);

    assert_eq!((preview.width, preview.height), (64, 48));
    assert_eq!(hash_frame(&preview), hash_frame(&main_crop));
    assert_ne!(preview, FrameBuffer::solid(64, 48, &scene.background()));
}

#[test]
fn test_rasterize_is_deterministic() {
    let mut scene = ProjectConfig::default();
    scene.canvas_size = CanvasSize::new(32, 32);
    let mut layer = Layer::new(LayerId::new("x"), "x", MediaType::Gif, "x", 1, Utc::now());
    layer.filters.rotation = 45.0;
    scene.layers.push(layer);

    let mut media = MediaCache::new();
    media.register("x", gradient(8, 8));
    let raster = Rasterizer::new(&media);

    let frame = render_preview(&scene, Some(&LayerId::new("x")), PreviewOptions::default(), None);
    let a = raster.rasterize_preview(&frame);
    let b = raster.rasterize_preview(&frame);
    assert_eq!(hash_frame(&a), hash_frame(&b));
    // 32 * 0.5 + 2 * 2 border.
    assert_eq!((a.width, a.height), (20, 20));
}
