//! Integration tests: scene → PNG/JPEG/SVG bytes.

#![cfg(feature = "raster")]

use easel_core::Scene;
use easel_core::presets::{self, ShapeStyle};
use easel_render::{ExportFormat, export};
use kurbo::Rect;

fn poster() -> (Scene, Rect) {
    let mut scene = Scene::new();
    let mut ws = presets::workspace(64.0, 48.0);
    ws.left = 100.0;
    ws.top = 50.0;
    let region = ws.bounds();
    scene.add(ws);

    let mut rect = presets::rectangle(&ShapeStyle {
        fill: "#ff0000".into(),
        stroke: "transparent".into(),
        ..ShapeStyle::default()
    });
    rect.left = 100.0;
    rect.top = 50.0;
    rect.scale_x = 0.32;
    rect.scale_y = 0.48;
    scene.add(rect);
    (scene, region)
}

#[test]
fn png_matches_workspace_size() {
    let (scene, region) = poster();
    let bytes = export(&scene, region, ExportFormat::Png).expect("png export");
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

    let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (64, 48));
    // Red rectangle covers the top-left 32×48 block; the rest is white page.
    assert_eq!(img.get_pixel(10, 20).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(50, 20).0, [255, 255, 255, 255]);
}

#[test]
fn jpeg_is_encoded() {
    let (scene, region) = poster();
    let bytes = export(&scene, region, ExportFormat::Jpeg).expect("jpeg export");
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    let img = image::load_from_memory(&bytes).unwrap();
    assert_eq!((img.width(), img.height()), (64, 48));
}

#[test]
fn svg_export_is_text() {
    let (scene, region) = poster();
    let bytes = export(&scene, region, ExportFormat::Svg).unwrap();
    let svg = String::from_utf8(bytes).unwrap();
    assert!(svg.contains("viewBox=\"100 50 64 48\""));
}
