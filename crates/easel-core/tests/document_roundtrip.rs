//! Integration tests: JSON document → scene → JSON document.
//!
//! Verifies that the codec is stable: writing a loaded document and loading
//! the result again produces identical bytes.

use easel_core::document::{AllowList, Document};
use easel_core::model::*;
use easel_core::scene::Scene;
use easel_core::{CodecError, ImageFilter};
use pretty_assertions::assert_eq;

fn load(json: &str) -> Scene {
    let doc = Document::from_json(json).expect("parse failed");
    Scene::from_snapshot(doc.into_snapshot()).expect("scene build failed")
}

fn write(scene: &Scene) -> String {
    let snapshot = scene.snapshot(&AllowList::default());
    Document::from_snapshot(&snapshot)
        .and_then(|doc| doc.to_json_pretty())
        .expect("write failed")
}

// ─── Round-trip ──────────────────────────────────────────────────────────

#[test]
fn poster_roundtrip_is_byte_stable() {
    let first = write(&load(include_str!("fixtures/poster.json")));
    let second = write(&load(&first));
    assert_eq!(first, second);
}

#[test]
fn poster_keeps_every_object_in_order() {
    let scene = load(include_str!("fixtures/poster.json"));
    let kinds: Vec<&str> = scene.objects().map(|o| o.kind.type_name()).collect();
    assert_eq!(
        kinds,
        vec!["rect", "rect", "textbox", "image", "polygon", "path"]
    );
    assert!(scene.objects().next().unwrap().is_workspace());
}

#[test]
fn legacy_text_tag_decodes_as_textbox() {
    let scene = load(include_str!("fixtures/poster.json"));
    let text = scene
        .objects()
        .find_map(|o| o.text())
        .expect("text object missing");
    assert_eq!(text.text, "Summer sale\nup to 50% off");
    assert_eq!(text.font_weight, 700);
    assert_eq!(text.text_align, TextAlign::Center);

    let written = write(&scene);
    assert!(written.contains("\"type\": \"textbox\""));
    assert!(!written.contains("i-text"));
}

#[test]
fn text_layout_is_recomputed_on_write() {
    let first = write(&load(include_str!("fixtures/poster.json")));
    let doc = Document::from_json(&first).unwrap();
    let text = doc
        .objects
        .iter()
        .find_map(|o| o.text())
        .expect("text object missing");
    // 400 / (48 * 0.6) = 13 glyphs per line: "Summer sale" → 1, "up to 50% off" → 1
    assert_eq!(text.line_count, 2);
    assert!((text.height - 2.0 * 48.0 * LINE_HEIGHT).abs() < 1e-9);
}

#[test]
fn text_layout_is_computed_on_load() {
    // The fixture stores a stale height of 10.
    let scene = load(include_str!("fixtures/poster.json"));
    let text = scene.objects().find_map(|o| o.text()).unwrap();
    assert_eq!(text.line_count, 2);
    assert!((text.height - 2.0 * 48.0 * LINE_HEIGHT).abs() < 1e-9);
}

#[test]
fn image_filter_and_metadata_survive() {
    let scene = load(include_str!("fixtures/poster.json"));
    let image = scene.objects().find_map(|o| o.image()).unwrap();
    assert_eq!(image.filters.as_slice(), &[ImageFilter::Sepia]);

    let text = scene.objects().find(|o| o.is_text()).unwrap();
    assert_eq!(
        text.meta.link_data,
        Some(serde_json::json!({ "href": "https://example.com/sale" }))
    );
}

#[test]
fn restricted_allow_list_drops_metadata() {
    let scene = load(include_str!("fixtures/poster.json"));
    let snapshot = scene.snapshot(&AllowList::new([MetaKey::Name]));
    let text = snapshot.objects.iter().find(|o| o.is_text()).unwrap();
    assert_eq!(text.meta.link_data, None);
    assert_eq!(text.meta.editable, None);
    assert!(snapshot.workspace().is_some());
}

#[test]
fn workspace_summary_in_envelope() {
    let first = write(&load(include_str!("fixtures/poster.json")));
    let doc = Document::from_json(&first).unwrap();
    assert_eq!((doc.width, doc.height), (900.0, 1200.0));
    assert_eq!(doc.background.as_deref(), Some("white"));
}

// ─── Rejection ───────────────────────────────────────────────────────────

#[test]
fn two_workspaces_rejected() {
    let err = Document::from_json(include_str!("fixtures/two_workspaces.json")).unwrap_err();
    assert!(matches!(err, CodecError::DuplicateWorkspace(2)));
}

#[test]
fn malformed_json_rejected() {
    let err = Document::from_json("{ \"objects\": [").unwrap_err();
    assert!(matches!(err, CodecError::Json(_)));
}
