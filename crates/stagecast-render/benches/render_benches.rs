use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stagecast_core::{Color, FrameBuffer, FrameTime};
use stagecast_ir::{CanvasSize, FilterKind, Layer, LayerId, MediaType, ProjectConfig};
use stagecast_render::{
    compose_layers, compute_tiles, render_live, render_preview, LiveOptions, ManualScheduler,
    MediaCache, PreviewOptions, Rasterizer, ScrollAnimators, ViewportSize,
};

fn create_scene(layer_count: usize) -> ProjectConfig {
    let mut scene = ProjectConfig::default();
    scene.canvas_size = CanvasSize::new(640, 360);
    for i in 0..layer_count {
        let mut layer = Layer::new(
            LayerId::new(format!("layer_{}", i)),
            format!("Layer {}", i),
            MediaType::Image,
            format!("media_{}", i % 3),
            i as i64 + 1,
            chrono::Utc::now(),
        );
        layer.filters.rotation = (i * 15) as f64;
        layer.filters.hue_rotate = 45.0;
        layer.filters.toggles.attach(FilterKind::HueRotate);
        if i % 4 == 0 {
            layer.filters.uv_scroll_x = 1.0;
            layer.filters.toggles.attach(FilterKind::UvScroll);
        }
        scene.layers.push(layer);
    }
    scene
}

fn create_media() -> MediaCache {
    let mut media = MediaCache::new();
    media.register("media_0", FrameBuffer::solid(128, 128, &Color::rgb(1.0, 0.2, 0.2)));
    media.register("media_1", FrameBuffer::solid(320, 90, &Color::rgb(0.2, 1.0, 0.2)));
    media.register("media_2", FrameBuffer::solid(64, 256, &Color::rgb(0.2, 0.2, 1.0)));
    media
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("stagecast_layout");

    group.bench_function("compute_tiles_small_canvas", |b| {
        b.iter(|| {
            compute_tiles(
                black_box(CanvasSize::new(320, 180)),
                black_box(ViewportSize::new(2560, 1440)),
            )
        })
    });

    let scene = create_scene(32);
    group.bench_function("compose_32_layers", |b| {
        b.iter(|| compose_layers(black_box(&scene), None))
    });

    group.bench_function("scroll_600_frames", |b| {
        b.iter(|| {
            let mut sched = ManualScheduler::new();
            let mut animators = ScrollAnimators::new();
            animators.sync(&scene, &mut sched);
            let times = (0..600).map(|i| FrameTime::from_millis(i as f64 * 1000.0 / 60.0));
            animators.run_frames(&mut sched, times, scene.canvas_size.to_size());
            animators
        })
    });

    group.finish();
}

fn bench_raster(c: &mut Criterion) {
    let mut group = c.benchmark_group("stagecast_raster");
    group.sample_size(10);

    let scene = create_scene(8);
    let media = create_media();
    let raster = Rasterizer::new(&media);

    group.bench_function("preview_8_layers", |b| {
        let frame = render_preview(&scene, None, PreviewOptions::default(), None);
        b.iter(|| raster.rasterize_preview(black_box(&frame)))
    });

    group.bench_function("live_8_layers_1080p", |b| {
        let frame = render_live(
            &scene,
            ViewportSize::new(1920, 1080),
            LiveOptions::default(),
            None,
        );
        b.iter(|| raster.rasterize_live(black_box(&frame)))
    });

    group.finish();
}

criterion_group!(benches, bench_layout, bench_raster);
criterion_main!(benches);
