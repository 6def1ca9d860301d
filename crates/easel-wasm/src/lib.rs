//! WASM bridge for Easel: exposes the editor engine to the browser.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the canvas
//! element, fetches images and drives the clock; everything else goes
//! through `EaselCanvas`.

mod render2d;

use easel_core::presets::TextOverrides;
use easel_core::{ObjectId, ObjectKind, Point, Rect};
use easel_editor::{Editor, EditorConfig, EditorError, MemoryScene, PersistPayload, SceneAdapter};
use render2d::{CanvasTheme, ImageCache};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

const JPEG_QUALITY: f64 = 0.92;

/// Pointer gesture in progress.
enum Gesture {
    Idle,
    /// Dragging the selection; `last` is in scene coordinates.
    Drag { last: Point },
    /// Rubber-band selection, in screen coordinates.
    Marquee { start: Point, current: Point },
    /// Freehand stroke samples, in screen coordinates.
    Stroke { points: Vec<Point> },
}

/// The main WASM-facing canvas controller.
#[wasm_bindgen]
pub struct EaselCanvas {
    editor: Editor<MemoryScene>,
    images: ImageCache,
    theme: CanvasTheme,
    gesture: Gesture,
}

#[wasm_bindgen]
impl EaselCanvas {
    /// Mount an editor on a container of the given pixel size, optionally
    /// restoring a saved document and applying a JSON config.
    #[wasm_bindgen(constructor)]
    pub fn new(
        width: f64,
        height: f64,
        initial_json: Option<String>,
        config_json: Option<String>,
    ) -> Result<EaselCanvas, JsValue> {
        console_error_panic_hook_setup();

        let config = match config_json {
            Some(json) => EditorConfig::from_json_str(&json).map_err(js_error)?,
            None => EditorConfig::default(),
        };
        let editor = Editor::new(
            MemoryScene::new(width, height),
            config,
            initial_json.as_deref(),
        )
        .map_err(js_error)?;
        Ok(Self {
            editor,
            images: ImageCache::new(),
            theme: CanvasTheme::default(),
            gesture: Gesture::Idle,
        })
    }

    /// Render the scene to a Canvas2D context.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let scene = self.editor.scene();
        let (width, height) = scene.container_size();
        let marquee = match self.gesture {
            Gesture::Marquee { start, current } => Some(Rect::from_points(start, current)),
            _ => None,
        };
        render2d::render_scene(
            ctx,
            scene.scene(),
            scene.viewport_transform(),
            width,
            height,
            self.editor.selected(),
            &self.images,
            &self.theme,
            marquee,
        );
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.editor.resize_container(width, height);
    }

    /// Advance the clock; records a finished gesture once it has settled.
    pub fn tick(&mut self, now_ms: f64) {
        self.editor.tick(now_ms as u64);
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    pub fn pointer_down(&mut self, x: f64, y: f64, shift: bool, now_ms: f64) {
        let screen = Point::new(x, y);
        if self.editor.scene().is_drawing_mode() {
            self.gesture = Gesture::Stroke {
                points: vec![screen],
            };
            return;
        }

        let scene_point = self.editor.scene().to_scene_point(screen);
        let hit = easel_render::hit_test(self.editor.scene().scene(), scene_point);
        // Pressing on an already selected object drags the whole selection.
        let keep = !shift && hit.is_some_and(|id| self.editor.selected().contains(&id));
        if !keep {
            self.editor.scene_mut().select_at(screen, shift);
        }
        self.gesture = match hit {
            Some(_) => Gesture::Drag { last: scene_point },
            None => Gesture::Marquee {
                start: screen,
                current: screen,
            },
        };
        self.editor.pump(now_ms as u64);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, now_ms: f64) {
        let screen = Point::new(x, y);
        match &mut self.gesture {
            Gesture::Idle => return,
            Gesture::Drag { last } => {
                let current = self.editor.scene().to_scene_point(screen);
                let delta = current - *last;
                *last = current;
                let selected = self.editor.selected().to_vec();
                for id in selected {
                    self.editor.scene_mut().translate(id, delta.x, delta.y);
                }
            }
            Gesture::Marquee { current, .. } => *current = screen,
            Gesture::Stroke { points } => points.push(screen),
        }
        self.editor.pump(now_ms as u64);
    }

    pub fn pointer_up(&mut self, x: f64, y: f64, now_ms: f64) {
        let screen = Point::new(x, y);
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Stroke { mut points } => {
                points.push(screen);
                self.editor.scene_mut().finish_stroke(&points);
            }
            Gesture::Marquee { start, .. } if (screen - start).hypot() > 2.0 => {
                self.editor
                    .scene_mut()
                    .select_rect(Rect::from_points(start, screen));
            }
            _ => {}
        }
        self.editor.pump(now_ms as u64);
    }

    // ─── Insertion ───────────────────────────────────────────────────────

    pub fn add_rectangle(&mut self) -> String {
        self.editor.add_rectangle().to_string()
    }

    pub fn add_soft_rectangle(&mut self) -> String {
        self.editor.add_soft_rectangle().to_string()
    }

    pub fn add_triangle(&mut self) -> String {
        self.editor.add_triangle().to_string()
    }

    pub fn add_inverse_triangle(&mut self) -> String {
        self.editor.add_inverse_triangle().to_string()
    }

    pub fn add_diamond(&mut self) -> String {
        self.editor.add_diamond().to_string()
    }

    pub fn add_circle(&mut self) -> String {
        self.editor.add_circle().to_string()
    }

    /// `overrides_json` is an object of text attributes, e.g.
    /// `{"fontSize": 80, "fontWeight": 700}`.
    pub fn add_text(
        &mut self,
        content: &str,
        overrides_json: Option<String>,
    ) -> Result<String, JsValue> {
        let overrides: TextOverrides = match overrides_json {
            Some(json) => serde_json::from_str(&json).map_err(js_error)?,
            None => TextOverrides::default(),
        };
        Ok(self.editor.add_text(content, &overrides).to_string())
    }

    /// Start an image insertion; the page loads `uri` into an `<img>` and
    /// calls `complete_image` (or `fail_image`) with the returned ticket.
    pub fn add_image(&mut self, uri: &str) -> f64 {
        self.editor.add_image(uri).0 as f64
    }

    /// Returns the new object ID, or `undefined` when the ticket was
    /// superseded.
    pub fn complete_image(
        &mut self,
        ticket: f64,
        image: HtmlImageElement,
    ) -> Result<Option<String>, JsValue> {
        let size = (image.natural_width(), image.natural_height());
        let id = self
            .editor
            .complete_image(easel_editor::ImageTicket(ticket as u64), Ok(size))
            .map_err(js_error)?;
        // Keyed by the document's `src`, which may be relative.
        let src = id
            .and_then(|id| self.editor.scene().object(id))
            .and_then(|obj| match &obj.kind {
                ObjectKind::Image(body) => Some(body.src.clone()),
                _ => None,
            });
        if let Some(src) = src {
            self.images.insert(src, image);
        }
        Ok(id.map(|id| id.to_string()))
    }

    pub fn fail_image(&mut self, ticket: f64, reason: &str) -> Result<(), JsValue> {
        self.editor
            .complete_image(
                easel_editor::ImageTicket(ticket as u64),
                Err(reason.to_string()),
            )
            .map(|_| ())
            .map_err(js_error)
    }

    /// Make an already decoded image available to the renderer under the
    /// `src` a loaded document refers to it by.
    pub fn register_image(&mut self, src: String, image: HtmlImageElement) {
        self.images.insert(src, image);
    }

    /// Image sources referenced by the document, as a JSON array, so the
    /// page can fetch them after a load.
    pub fn image_sources(&self) -> String {
        let sources: Vec<&str> = self
            .editor
            .scene()
            .all_objects()
            .into_iter()
            .filter_map(|obj| match &obj.kind {
                ObjectKind::Image(body) => Some(body.src.as_str()),
                _ => None,
            })
            .collect();
        serde_json::to_string(&sources).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn delete(&mut self) {
        self.editor.delete();
    }

    // ─── Style ───────────────────────────────────────────────────────────

    pub fn change_fill_color(&mut self, value: &str) {
        self.editor.change_fill_color(value);
    }

    pub fn change_stroke_color(&mut self, value: &str) {
        self.editor.change_stroke_color(value);
    }

    pub fn change_stroke_width(&mut self, value: f64) {
        self.editor.change_stroke_width(value);
    }

    pub fn change_stroke_dash_array(&mut self, value: Vec<f64>) {
        self.editor.change_stroke_dash_array(value.into_iter().collect());
    }

    pub fn change_opacity(&mut self, value: f64) {
        self.editor.change_opacity(value);
    }

    pub fn change_font_family(&mut self, value: &str) {
        self.editor.change_font_family(value);
    }

    pub fn change_font_weight(&mut self, value: u16) {
        self.editor.change_font_weight(value);
    }

    /// `normal`, `italic` or `oblique`.
    pub fn change_font_style(&mut self, value: &str) -> Result<(), JsValue> {
        self.editor.change_font_style(keyword(value)?);
        Ok(())
    }

    pub fn change_font_size(&mut self, value: f64) {
        self.editor.change_font_size(value);
    }

    /// `left`, `center`, `right` or `justify`.
    pub fn change_text_align(&mut self, value: &str) -> Result<(), JsValue> {
        self.editor.change_text_align(keyword(value)?);
        Ok(())
    }

    pub fn change_font_underline(&mut self, value: bool) {
        self.editor.change_font_underline(value);
    }

    pub fn change_font_linethrough(&mut self, value: bool) {
        self.editor.change_font_linethrough(value);
    }

    pub fn change_image_filter(&mut self, name: &str) {
        self.editor.change_image_filter(name);
    }

    pub fn active_fill_color(&self) -> String {
        self.editor.active_fill_color()
    }

    pub fn active_stroke_color(&self) -> String {
        self.editor.active_stroke_color()
    }

    pub fn active_stroke_width(&self) -> f64 {
        self.editor.active_stroke_width()
    }

    pub fn active_stroke_dash_array(&self) -> Vec<f64> {
        self.editor.active_stroke_dash_array().to_vec()
    }

    pub fn active_opacity(&self) -> f64 {
        self.editor.active_opacity()
    }

    pub fn active_font_family(&self) -> String {
        self.editor.active_font_family()
    }

    pub fn active_font_weight(&self) -> u16 {
        self.editor.active_font_weight()
    }

    pub fn active_font_style(&self) -> String {
        self.editor.active_font_style().as_str().to_string()
    }

    pub fn active_font_size(&self) -> f64 {
        self.editor.active_font_size()
    }

    pub fn active_text_align(&self) -> String {
        self.editor.active_text_align().as_str().to_string()
    }

    pub fn active_underline(&self) -> bool {
        self.editor.active_underline()
    }

    pub fn active_linethrough(&self) -> bool {
        self.editor.active_linethrough()
    }

    // ─── Selection & tools ───────────────────────────────────────────────

    /// Selected object IDs as a JSON array.
    pub fn selected_ids(&self) -> String {
        let ids: Vec<&str> = self.editor.selected().iter().map(ObjectId::as_str).collect();
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }

    /// Whether a sidebar tool (kebab-case name) can be opened right now.
    pub fn is_tool_available(&self, tool: &str) -> bool {
        keyword(tool).is_ok_and(|tool| self.editor.is_tool_available(tool))
    }

    pub fn on_selection_cleared(&mut self, callback: js_sys::Function) {
        self.editor.on_selection_cleared(Box::new(move || {
            if let Err(err) = callback.call0(&JsValue::NULL) {
                log::warn!("selection-cleared callback failed: {err:?}");
            }
        }));
    }

    /// `callback(json, width, height)` runs after every recorded change.
    pub fn on_persist(&mut self, callback: js_sys::Function) {
        self.editor
            .on_persist(Box::new(move |payload: &PersistPayload| {
                callback
                    .call3(
                        &JsValue::NULL,
                        &JsValue::from_str(&payload.json),
                        &JsValue::from_f64(payload.width),
                        &JsValue::from_f64(payload.height),
                    )
                    .map(|_| ())
                    .map_err(|err| EditorError::Persist(format!("{err:?}")))
            }));
    }

    pub fn copy(&mut self) {
        self.editor.copy();
    }

    pub fn paste(&mut self) {
        self.editor.paste();
    }

    // ─── Stacking & workspace ────────────────────────────────────────────

    pub fn bring_forward(&mut self) {
        self.editor.bring_forward();
    }

    pub fn send_backwards(&mut self) {
        self.editor.send_backwards();
    }

    pub fn change_size(&mut self, width: f64, height: f64) {
        self.editor.change_size(width, height);
    }

    pub fn change_background(&mut self, color: &str) {
        self.editor.change_background(color);
    }

    /// `[width, height]` of the workspace.
    pub fn workspace_size(&self) -> Vec<f64> {
        self.editor
            .workspace()
            .map(|ws| {
                let (w, h) = ws.scaled_size();
                vec![w, h]
            })
            .unwrap_or_default()
    }

    pub fn enable_drawing_mode(&mut self) {
        self.editor.enable_drawing_mode();
    }

    pub fn disable_drawing_mode(&mut self) {
        self.gesture = Gesture::Idle;
        self.editor.disable_drawing_mode();
    }

    // ─── History & viewport ──────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    pub fn zoom_in(&mut self) {
        self.editor.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.editor.zoom_out();
    }

    pub fn auto_zoom(&mut self) {
        self.editor.auto_zoom();
    }

    // ─── Documents & export ──────────────────────────────────────────────

    /// Tab-indented document JSON.
    pub fn save_json(&self) -> Result<String, JsValue> {
        let download = self.editor.save_json().map_err(js_error)?;
        String::from_utf8(download.bytes).map_err(js_error)
    }

    pub fn load_json(&mut self, json: &str) -> Result<(), JsValue> {
        self.editor.load_json(json).map_err(js_error)
    }

    /// SVG export as a `data:` URL.
    pub fn save_svg(&mut self) -> Result<String, JsValue> {
        let download = self.editor.save_svg().map_err(js_error)?;
        let svg = String::from_utf8(download.bytes).map_err(js_error)?;
        let encoded: String = js_sys::encode_uri_component(&svg).into();
        Ok(format!("data:{};charset=utf-8,{encoded}", download.mime))
    }

    /// PNG export through a scratch `<canvas>`, as a `data:` URL.
    pub fn save_png(&self, scratch: &HtmlCanvasElement) -> Result<String, JsValue> {
        self.export_canvas(scratch)?;
        scratch.to_data_url_with_type("image/png")
    }

    /// JPEG export through a scratch `<canvas>`, as a `data:` URL.
    pub fn save_jpg(&self, scratch: &HtmlCanvasElement) -> Result<String, JsValue> {
        self.export_canvas(scratch)?;
        scratch.to_data_url_with_type_and_encoder_options(
            "image/jpeg",
            &JsValue::from_f64(JPEG_QUALITY),
        )
    }

    /// Base file name for downloads.
    pub fn export_basename(&self) -> String {
        easel_editor::EXPORT_BASENAME.to_string()
    }
}

impl EaselCanvas {
    /// Paint the workspace region onto `scratch` at one pixel per unit.
    /// The live viewport is untouched.
    fn export_canvas(&self, scratch: &HtmlCanvasElement) -> Result<(), JsValue> {
        let region = self
            .editor
            .workspace()
            .map(|ws| ws.bounds())
            .ok_or_else(|| js_error(EditorError::MissingWorkspace))?;
        scratch.set_width(region.width().ceil() as u32);
        scratch.set_height(region.height().ceil() as u32);
        let ctx: CanvasRenderingContext2d = scratch
            .get_context("2d")?
            .ok_or("canvas has no 2d context")?
            .dyn_into()?;
        render2d::render_region(&ctx, self.editor.scene().scene(), region, &self.images);
        Ok(())
    }
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Parse a lowercase/kebab-case keyword into one of the editor's enums.
fn keyword<T: DeserializeOwned>(value: &str) -> Result<T, JsValue> {
    serde_json::from_value(serde_json::Value::String(value.to_string())).map_err(js_error)
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Easel WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
