use chrono::{TimeZone, Utc};
use serde_json::json;

use stagecast_ir::{
    normalize_project, FilterKind, FilterState, FiltersPatch, LayerFilters, LayerId, ManualClock,
    MediaType, ProjectConfig, SceneEditor,
};

fn editor() -> (SceneEditor, ManualClock) {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let clock = ManualClock::new(start);
    let editor = SceneEditor::with_clock(ProjectConfig::new(start), clock.clone());
    (editor, clock)
}

fn render_ids(scene: &ProjectConfig) -> Vec<String> {
    scene
        .render_order()
        .iter()
        .map(|l| l.id.as_str().to_string())
        .collect()
}

#[test]
fn test_render_order_ignores_array_order() {
    let doc = |layers: serde_json::Value| {
        normalize_project(json!({
            "canvasSize": {"width": 100, "height": 100},
            "layers": layers
        }))
        .unwrap()
    };
    let a = json!({"id": "a", "type": "image", "source": "a.png", "zIndex": 5});
    let b = json!({"id": "b", "type": "image", "source": "b.png", "zIndex": 1});
    let c = json!({"id": "c", "type": "gif", "source": "c.gif", "zIndex": 3});

    let forward = doc(json!([a, b, c]));
    let backward = doc(json!([c, b, a]));
    assert_eq!(render_ids(&forward), vec!["b", "c", "a"]);
    assert_eq!(render_ids(&forward), render_ids(&backward));
}

#[test]
fn test_filter_patch_round_trip_and_timestamps() {
    let (mut ed, clock) = editor();
    let id = ed.add_layer("Logo", MediaType::Image, "logo.png");

    let mut last = ed.scene().layer(&id).unwrap().updated_at;
    let patches = [
        FiltersPatch {
            opacity: Some(50.0),
            ..FiltersPatch::default()
        },
        FiltersPatch {
            rotation: Some(-30.0),
            flip_x: Some(true),
            ..FiltersPatch::default()
        },
        FiltersPatch {
            active_filters: Some(vec![FilterKind::HueRotate]),
            hue_rotate: Some(90.0),
            ..FiltersPatch::default()
        },
    ];

    for (i, patch) in patches.iter().enumerate() {
        if i == 1 {
            // Clock jumps backwards; stamps must still increase.
            clock.advance_millis(-60_000);
        }
        let mut expected = ed.scene().layer(&id).unwrap().filters.clone();
        expected.apply_patch(patch);

        ed.update_layer_filters(&id, patch);

        let layer = ed.scene().layer(&id).unwrap();
        assert_eq!(layer.filters, expected);
        assert!(layer.updated_at > last);
        last = layer.updated_at;
    }

    let filters = &ed.scene().layer(&id).unwrap().filters;
    assert_eq!(filters.opacity, 50.0);
    assert!(filters.flip_x);
    assert!(filters.toggles.is_in_effect(FilterKind::HueRotate));
}

#[test]
fn test_normalization_is_idempotent() {
    let raw = json!({
        "name": "Stream",
        "canvasSize": {"width": 1280, "height": 720},
        "backgroundColor": "#112233",
        "layers": [
            {"id": "a", "type": "image", "source": "a.png", "zIndex": 2,
             "filters": {"blur": 4, "activeFilters": ["blur", "colorAdjust"], "disabledFilters": ["colorAdjust"]}},
            {"id": "b", "type": "video", "source": "b.mp4", "zIndex": 1, "filters": {}}
        ]
    });

    let once = normalize_project(raw).unwrap();
    let twice = normalize_project(serde_json::to_value(&once).unwrap()).unwrap();
    assert_eq!(once, twice);
    assert_eq!(once.layers[1].filters, LayerFilters::default());
    assert_eq!(
        once.layers[0].filters.toggles.state(FilterKind::ColorAdjust),
        FilterState::Disabled
    );
}

#[test]
fn test_import_rejection_and_acceptance() {
    let (mut ed, _) = editor();
    ed.add_layer("Keep", MediaType::Image, "keep.png");
    let before = ed.snapshot();

    for bad in [
        r#"{"layers": []}"#,
        r#"{"canvasSize": {"width": 10, "height": 10}}"#,
        r#"{"canvasSize": {"width": 10, "height": 10}, "layers": {}}"#,
        r#"[]"#,
        r#"{"canvasSize": {"#,
    ] {
        assert!(ed.import_json(bad).is_err(), "accepted: {}", bad);
        assert_eq!(*ed.scene(), *before);
    }

    ed.import_json(
        r#"{"canvasSize": {"width": 640, "height": 480},
            "layers": [{"id": "x", "type": "gif", "source": "x.gif", "filters": {"opacity": 20}}]}"#,
    )
    .unwrap();
    let scene = ed.scene();
    assert_eq!(scene.canvas_size.width, 640);
    let layer = scene.layer(&LayerId::new("x")).unwrap();
    assert_eq!(layer.filters.opacity, 20.0);
    assert_eq!(layer.filters.scale, 1.0);
    assert!(layer.filters.visible);
    assert!(ed.selected_layer_id().is_none());
}

#[test]
fn test_export_then_import_restores_scene() {
    let (mut ed, _) = editor();
    let id = ed.add_layer("Loop", MediaType::Gif, "loop.gif");
    ed.attach_filter(&id, FilterKind::UvScroll);
    ed.update_layer_filters(
        &id,
        &FiltersPatch {
            uv_scroll_x: Some(2.0),
            ..FiltersPatch::default()
        },
    );
    let exported = ed.export_json().unwrap();
    let original = ed.snapshot();

    let (mut other, _) = editor();
    other.import_json(&exported).unwrap();
    assert_eq!(other.scene().layers, original.layers);
    assert_eq!(other.scene().canvas_size, original.canvas_size);
}

#[test]
fn test_duplicate_then_edit_copy() {
    let (mut ed, _) = editor();
    let id = ed.add_layer("Frame", MediaType::Image, "frame.png");
    ed.attach_filter(&id, FilterKind::Blur);
    let copy = ed.duplicate_layer(&id).unwrap();

    ed.remove_filter(&copy, FilterKind::Blur);
    ed.update_layer_filters(
        &copy,
        &FiltersPatch {
            scale: Some(2.5),
            ..FiltersPatch::default()
        },
    );

    let original = ed.scene().layer(&id).unwrap();
    assert!(original.filters.toggles.is_attached(FilterKind::Blur));
    assert_eq!(original.filters.scale, 1.0);
    let dup = ed.scene().layer(&copy).unwrap();
    assert!(dup.created_at > original.created_at);
    assert_eq!(dup.z_index, original.z_index + 1);
}

#[test]
fn test_toggle_off_keeps_blur_value() {
    let (mut ed, _) = editor();
    let id = ed.add_layer("Blurred", MediaType::Image, "b.png");
    ed.update_layer_filters(
        &id,
        &FiltersPatch {
            blur: Some(8.0),
            active_filters: Some(vec![FilterKind::Blur]),
            ..FiltersPatch::default()
        },
    );
    ed.update_layer_filters(
        &id,
        &FiltersPatch {
            disabled_filters: Some(vec![FilterKind::Blur]),
            ..FiltersPatch::default()
        },
    );
    let filters = &ed.scene().layer(&id).unwrap().filters;
    assert_eq!(filters.blur, 8.0);
    assert!(!filters.toggles.is_in_effect(FilterKind::Blur));

    ed.set_filter_enabled(&id, FilterKind::Blur, true);
    assert!(ed
        .scene()
        .layer(&id)
        .unwrap()
        .filters
        .toggles
        .is_in_effect(FilterKind::Blur));
}

#[test]
fn test_reset_filters_keeps_pipeline() {
    let (mut ed, _) = editor();
    let id = ed.add_layer("Tint", MediaType::Image, "t.png");
    ed.attach_filter(&id, FilterKind::HueRotate);
    ed.update_layer_filters(
        &id,
        &FiltersPatch {
            hue_rotate: Some(120.0),
            opacity: Some(10.0),
            ..FiltersPatch::default()
        },
    );
    ed.reset_filters(&id);
    let filters = &ed.scene().layer(&id).unwrap().filters;
    assert_eq!(filters.hue_rotate, 0.0);
    assert_eq!(filters.opacity, 100.0);
    assert!(filters.toggles.is_in_effect(FilterKind::HueRotate));
}
