//! Integration tests: command layer scenarios (easel-editor).
//!
//! End-to-end editing sessions on `Editor<MemoryScene>`: shape and text
//! insertion, style read-through, clipboard, workspace resizing, images,
//! stacking, filters and document/export output.

use easel_core::presets::TextOverrides;
use easel_core::{FILL_COLOR, ImageFilter, ObjectId, ObjectKind, Point, Rect, TextAlign};
use easel_editor::{Editor, EditorConfig, EditorError, MemoryScene, SceneAdapter, Tool};
use pretty_assertions::assert_eq;
use smallvec::smallvec;
use std::cell::Cell;
use std::rc::Rc;

const CONTAINER: (f64, f64) = (1200.0, 900.0);

fn blank() -> Editor<MemoryScene> {
    Editor::new(
        MemoryScene::new(CONTAINER.0, CONTAINER.1),
        EditorConfig::default(),
        None,
    )
    .unwrap()
}

fn card() -> Editor<MemoryScene> {
    Editor::new(
        MemoryScene::new(CONTAINER.0, CONTAINER.1),
        EditorConfig::default(),
        Some(include_str!("fixtures/card.json")),
    )
    .unwrap()
}

fn fill_of(ed: &Editor<MemoryScene>, index: usize) -> Option<String> {
    ed.scene().all_objects()[index].fill.clone()
}

fn z_index(ed: &Editor<MemoryScene>, id: ObjectId) -> usize {
    ed.scene().scene().z_index(id).unwrap()
}

// ─── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn fill_change_undo_redo() {
    let mut ed = blank();
    ed.add_rectangle();
    ed.change_fill_color("#ff0000");
    assert_eq!(fill_of(&ed, 1).as_deref(), Some("#ff0000"));

    ed.undo();
    assert_eq!(fill_of(&ed, 1).as_deref(), Some(FILL_COLOR));
    ed.redo();
    assert_eq!(fill_of(&ed, 1).as_deref(), Some("#ff0000"));
}

#[test]
fn text_font_size_is_saved() {
    let mut ed = blank();
    ed.add_text("Hello", &TextOverrides::default());
    ed.change_font_size(48.0);

    let download = ed.save_json().unwrap();
    assert_eq!(download.filename, "untitled.json");
    assert_eq!(download.mime, "application/json");

    let doc: serde_json::Value = serde_json::from_slice(&download.bytes).unwrap();
    let text = doc["objects"]
        .as_array()
        .unwrap()
        .iter()
        .find(|obj| obj["type"] == "textbox")
        .expect("text object saved");
    assert_eq!(text["fontSize"].as_f64(), Some(48.0));
    assert_eq!(text["text"], "Hello");
}

#[test]
fn repeated_paste_offsets_copies() {
    let mut ed = blank();
    let id = ed.add_rectangle();
    {
        let rect = ed.scene_mut().object_mut(id).unwrap();
        rect.left = 100.0;
        rect.top = 100.0;
    }
    ed.copy();

    let first = ed.paste();
    assert_eq!(first.len(), 1);
    let pasted = ed.scene().object(first[0]).unwrap();
    assert_eq!((pasted.left, pasted.top), (110.0, 110.0));
    assert_eq!(ed.selected(), first.as_slice());

    let second = ed.paste();
    let pasted = ed.scene().object(second[0]).unwrap();
    assert_eq!((pasted.left, pasted.top), (120.0, 120.0));
    assert_eq!(ed.selected(), second.as_slice());

    assert_ne!(first[0], second[0]);
    assert_ne!(first[0], id);
    assert_eq!(ed.scene().all_objects().len(), 4);
}

#[test]
fn workspace_resize_refits_viewport() {
    let mut ed = blank();
    ed.change_size(500.0, 500.0);

    let ws = ed.workspace().unwrap();
    match &ws.kind {
        ObjectKind::Rect { width, height, .. } => {
            assert_eq!((*width, *height), (500.0, 500.0));
        }
        other => panic!("expected workspace rect, got {other:?}"),
    }

    let on_screen = ed
        .scene()
        .viewport_transform()
        .transform_rect_bbox(ws.bounds());
    let container = Rect::new(0.0, 0.0, CONTAINER.0, CONTAINER.1);
    assert_eq!(container.union(on_screen), container, "workspace clipped");
    assert_eq!(ed.viewport().zoom(), 1.0);
}

#[test]
fn paste_with_empty_clipboard_does_nothing() {
    let mut ed = blank();
    ed.copy();
    assert!(ed.paste().is_empty());
    assert_eq!(ed.history().len(), 1);
}

// ─── Style ──────────────────────────────────────────────────────────────

#[test]
fn active_values_read_through_to_selection() {
    let mut ed = blank();
    ed.change_fill_color("#00ff00");
    assert_eq!(ed.active_fill_color(), "#00ff00");

    let id = ed.add_rectangle();
    assert_eq!(ed.active_fill_color(), "#00ff00");
    ed.scene_mut().object_mut(id).unwrap().fill = Some("#0000ff".into());
    assert_eq!(ed.active_fill_color(), "#0000ff");

    ed.scene_mut().clear_active();
    ed.pump(0);
    assert_eq!(ed.active_fill_color(), "#00ff00");
}

#[test]
fn font_attributes_only_touch_text() {
    let mut ed = blank();
    let rect = ed.add_rectangle();
    let text = ed.add_text("Title", &TextOverrides::default());
    ed.scene_mut().set_active(&[rect, text]);
    ed.pump(0);

    ed.change_font_family("Georgia");
    ed.change_text_align(TextAlign::Center);
    ed.change_font_underline(true);

    // The rect is first in the selection and has no font: the default answers.
    assert_eq!(ed.active_font_family(), "Georgia");
    let body = ed.scene().object(text).unwrap().text().unwrap();
    assert_eq!(body.font_family, "Georgia");
    assert_eq!(body.text_align, TextAlign::Center);
    assert!(body.underline);
    assert!(matches!(
        ed.scene().object(rect).unwrap().kind,
        ObjectKind::Rect { .. }
    ));
}

#[test]
fn stroke_color_on_text_sets_glyph_fill() {
    let mut ed = blank();
    let text = ed.add_text("Ink", &TextOverrides::default());
    ed.change_stroke_color("#ff00ff");
    let obj = ed.scene().object(text).unwrap();
    assert_eq!(obj.fill.as_deref(), Some("#ff00ff"));
    assert_eq!(obj.stroke, None);
}

#[test]
fn dash_array_and_opacity_apply_to_selection() {
    let mut ed = blank();
    let id = ed.add_soft_rectangle();
    ed.change_stroke_dash_array(smallvec![5.0, 5.0]);
    ed.change_opacity(0.5);
    assert_eq!(ed.active_stroke_dash_array().as_slice(), &[5.0, 5.0]);
    assert_eq!(ed.active_opacity(), 0.5);
    assert_eq!(ed.scene().object(id).unwrap().opacity, 0.5);
}

#[test]
fn selection_cleared_callback_and_tools() {
    let cleared = Rc::new(Cell::new(0));
    let counter = cleared.clone();
    let mut ed = blank();
    ed.on_selection_cleared(Box::new(move || counter.set(counter.get() + 1)));

    ed.add_triangle();
    assert!(ed.is_tool_available(Tool::StrokeWidth));
    ed.delete();
    assert_eq!(cleared.get(), 1);
    assert!(!ed.is_tool_available(Tool::StrokeWidth));
    assert!(ed.is_tool_available(Tool::Templates));
}

// ─── Images ─────────────────────────────────────────────────────────────

#[test]
fn image_covers_the_workspace() {
    let mut ed = blank();
    let ticket = ed.add_image("https://cdn.example.com/cat.png");
    let id = ed.complete_image(ticket, Ok((300, 200))).unwrap().unwrap();

    let image = ed.scene().object(id).unwrap();
    assert_eq!(image.scaled_size(), (900.0, 1200.0));
    let offset = image.center() - ed.workspace().unwrap().center();
    assert!(offset.hypot() < 1e-9);
    assert_eq!(ed.selected(), &[id]);
    assert_eq!(ed.history().len(), 2);
}

#[test]
fn superseded_image_completion_is_discarded() {
    let mut ed = blank();
    let stale = ed.add_image("a.png");
    let live = ed.add_image("b.png");
    assert_eq!(ed.complete_image(stale, Ok((10, 10))).unwrap(), None);
    assert!(ed.complete_image(live, Ok((10, 10))).unwrap().is_some());

    let cancelled = ed.add_image("c.png");
    ed.scene_mut().clear_active();
    ed.pump(0);
    ed.delete();
    assert_eq!(ed.complete_image(cancelled, Ok((10, 10))).unwrap(), None);
    assert_eq!(ed.scene().all_objects().len(), 2);
}

#[test]
fn image_decode_error_is_reported() {
    let mut ed = blank();
    let ticket = ed.add_image("missing.png");
    let err = ed
        .complete_image(ticket, Err("404 Not Found".into()))
        .unwrap_err();
    assert!(matches!(err, EditorError::ImageLoad { ref uri, .. } if uri == "missing.png"));
    assert_eq!(ed.history().len(), 1);
    assert_eq!(ed.scene().all_objects().len(), 1);
}

#[test]
fn image_filter_replaces_previous() {
    let mut ed = blank();
    let rect = ed.add_rectangle();
    let ticket = ed.add_image("photo.jpg");
    let image = ed.complete_image(ticket, Ok((90, 120))).unwrap().unwrap();
    ed.scene_mut().set_active(&[rect, image]);
    ed.pump(0);

    ed.change_image_filter("sepia");
    ed.change_image_filter("gamma");
    let filters = &ed.scene().object(image).unwrap().image().unwrap().filters;
    assert_eq!(filters.len(), 1);
    assert!(matches!(filters[0], ImageFilter::Gamma { .. }));

    ed.change_image_filter("none");
    assert!(ed.scene().object(image).unwrap().image().unwrap().filters.is_empty());
}

// ─── Stacking ───────────────────────────────────────────────────────────

#[test]
fn workspace_stays_at_the_bottom() {
    let mut ed = blank();
    let a = ed.add_rectangle();
    let b = ed.add_circle();
    let ws = ed.workspace().unwrap().id;

    ed.scene_mut().set_active(&[a]);
    ed.pump(0);
    ed.bring_forward();
    assert_eq!(z_index(&ed, a), 2);
    assert_eq!(z_index(&ed, b), 1);

    ed.send_backwards();
    ed.send_backwards();
    ed.send_backwards();
    assert_eq!(z_index(&ed, ws), 0);
    assert_eq!(z_index(&ed, a), 1);
}

#[test]
fn delete_never_removes_the_workspace() {
    let mut ed = blank();
    let ws = ed.workspace().unwrap().id;
    ed.scene_mut().set_active(&[ws]);
    ed.delete();
    assert!(ed.workspace().is_some());
}

// ─── Documents ──────────────────────────────────────────────────────────

#[test]
fn saved_document_round_trips() {
    let mut ed = blank();
    ed.add_rectangle();
    ed.add_text("Round\ntrip", &TextOverrides::default());
    ed.change_font_size(40.0);
    ed.add_circle();
    ed.change_background("#eeeeee");

    let first = ed.save_json().unwrap().bytes;
    ed.load_json(std::str::from_utf8(&first).unwrap()).unwrap();
    let second = ed.save_json().unwrap().bytes;
    assert_eq!(
        String::from_utf8(first).unwrap(),
        String::from_utf8(second).unwrap()
    );
}

#[test]
fn initial_state_is_loaded_and_fitted() {
    let ed = card();
    let ws = ed.workspace().unwrap();
    assert_eq!(ws.scaled_size(), (600.0, 400.0));
    assert_eq!(ws.fill.as_deref(), Some("#fafafa"));
    assert_eq!(ed.scene().all_objects().len(), 3);
    assert_eq!(ed.history().len(), 1);
    assert!(!ed.can_undo());

    let on_screen = ed
        .scene()
        .viewport_transform()
        .transform_rect_bbox(ws.bounds());
    assert!((on_screen.center().x - CONTAINER.0 / 2.0).abs() < 1e-6);
    assert!((on_screen.center().y - CONTAINER.1 / 2.0).abs() < 1e-6);
}

#[test]
fn background_and_size_are_summarized() {
    let mut ed = blank();
    ed.change_background("#101010");
    let doc = ed.to_document().unwrap();
    assert_eq!(doc.background.as_deref(), Some("#101010"));
    assert_eq!((doc.width, doc.height), (900.0, 1200.0));
}

#[test]
fn svg_export_restores_viewport() {
    let mut ed = card();
    let fitted = ed.scene().viewport_transform();
    let download = ed.save_svg().unwrap();
    assert_eq!(download.filename, "untitled.svg");
    assert_eq!(download.mime, "image/svg+xml");
    let svg = String::from_utf8(download.bytes).unwrap();
    assert!(svg.contains(r#"viewBox="200 200 600 400""#));
    assert!(svg.contains("Greetings"));
    assert_eq!(ed.scene().viewport_transform(), fitted);
}

#[test]
fn flat_freehand_stroke_is_exported() {
    let mut ed = blank();
    ed.enable_drawing_mode();
    ed.scene_mut()
        .finish_stroke(&[
            Point::new(500.0, 450.0),
            Point::new(560.0, 450.0),
            Point::new(640.0, 450.0),
        ])
        .unwrap();
    ed.tick(0);
    ed.tick(1_000);

    let svg = String::from_utf8(ed.save_svg().unwrap().bytes).unwrap();
    // Workspace outline plus the stroke.
    assert_eq!(svg.matches("<path").count(), 2);
}

#[cfg(feature = "raster")]
#[test]
fn png_export_has_workspace_dimensions() {
    let mut ed = card();
    let download = ed.save_png().unwrap();
    assert_eq!(download.filename, "untitled.png");
    assert_eq!(&download.bytes[..8], b"\x89PNG\r\n\x1a\n");
    // IHDR width and height, big-endian.
    assert_eq!(&download.bytes[16..20], &600u32.to_be_bytes());
    assert_eq!(&download.bytes[20..24], &400u32.to_be_bytes());

    let jpg = ed.save_jpg().unwrap();
    assert_eq!(jpg.filename, "untitled.jpg");
    assert_eq!(&jpg.bytes[..2], &[0xFF, 0xD8]);
}
