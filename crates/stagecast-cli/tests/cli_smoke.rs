use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn bin() -> String {
    std::env::var("CARGO_BIN_EXE_stagecast").unwrap_or_else(|_| {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../target/debug/stagecast")
            .to_string_lossy()
            .to_string()
    })
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("stagecast-cli-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).expect("failed to create scratch dir");
    dir
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(bin())
        .current_dir(dir)
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to spawn stagecast")
}

fn write_scene(dir: &Path) -> PathBuf {
    let logo = image::RgbaImage::from_pixel(8, 4, image::Rgba([255, 0, 0, 255]));
    logo.save(dir.join("logo.png")).expect("failed to write logo");

    let scene = serde_json::json!({
        "name": "Smoke",
        "canvasSize": {"width": 64, "height": 36},
        "backgroundColor": "#101010",
        "layers": [
            {"id": "bg", "type": "image", "source": "logo.png", "zIndex": 1,
             "filters": {"activeFilters": ["uvScroll"], "uvScrollX": 1}},
            {"id": "logo", "type": "image", "source": "logo.png", "zIndex": 2,
             "filters": {"rotation": 15}}
        ]
    });
    let path = dir.join("scene.json");
    std::fs::write(&path, scene.to_string()).expect("failed to write scene");
    path
}

#[test]
fn check_reports_render_order() {
    let dir = scratch_dir("check");
    write_scene(&dir);
    let output = run(&dir, &["check", "scene.json"]);
    assert!(output.status.success(), "check failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("bg → logo"), "unexpected output: {stdout}");
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn check_rejects_incomplete_document() {
    let dir = scratch_dir("reject");
    std::fs::write(dir.join("bad.json"), r#"{"foo": 1}"#).unwrap();
    let output = run(&dir, &["check", "bad.json"]);
    assert!(!output.status.success());
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn normalize_fills_defaults() {
    let dir = scratch_dir("normalize");
    write_scene(&dir);
    let output = run(&dir, &["normalize", "scene.json"]);
    assert!(output.status.success(), "normalize failed: {:?}", output);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["layers"][1]["filters"]["opacity"], 100.0);
    assert_eq!(value["layers"][0]["filters"]["activeFilters"][0], "uvScroll");
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn tiles_emits_one_main_tile() {
    let dir = scratch_dir("tiles");
    write_scene(&dir);
    let output = run(&dir, &["tiles", "scene.json", "--viewport", "200x100"]);
    assert!(output.status.success(), "tiles failed: {:?}", output);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let tiles = value["tiles"].as_array().unwrap();
    assert_eq!(tiles.iter().filter(|t| t["is_main"] == true).count(), 1);
    assert_eq!(value["fit_scale"], 1.0);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn render_writes_png() {
    let dir = scratch_dir("render");
    write_scene(&dir);

    let output = run(
        &dir,
        &["render", "scene.json", "-o", "out/preview.png", "--time", "1.5", "--scale", "1"],
    );
    assert!(output.status.success(), "render failed: {:?}", output);
    let img = image::open(dir.join("out/preview.png")).unwrap();
    // Default config draws a 2px border.
    assert_eq!((img.width(), img.height()), (68, 40));

    let output = run(
        &dir,
        &["render", "scene.json", "-o", "live.png", "--viewport", "160x90"],
    );
    assert!(output.status.success(), "live render failed: {:?}", output);
    let img = image::open(dir.join("live.png")).unwrap();
    assert_eq!((img.width(), img.height()), (160, 90));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn config_file_controls_preview() {
    let dir = scratch_dir("config");
    write_scene(&dir);
    let init = run(&dir, &["init-config"]);
    assert!(init.status.success(), "init-config failed: {:?}", init);
    assert!(!run(&dir, &["init-config"]).status.success());

    std::fs::write(
        dir.join("stagecast.toml"),
        "[preview]\nscale = 0.5\nshow_border = false\n",
    )
    .unwrap();
    let output = run(&dir, &["render", "scene.json", "-o", "half.png"]);
    assert!(output.status.success(), "render failed: {:?}", output);
    let img = image::open(dir.join("half.png")).unwrap();
    assert_eq!((img.width(), img.height()), (32, 18));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn presets_lookup() {
    let dir = scratch_dir("presets");
    let output = run(&dir, &["presets", "instagram story"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "1080x1920");
    assert!(!run(&dir, &["presets", "cinemascope"]).status.success());
    std::fs::remove_dir_all(&dir).ok();
}
