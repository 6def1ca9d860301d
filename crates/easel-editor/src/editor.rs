//! Command layer: the editor façade the UI talks to.
//!
//! `Editor` owns the style defaults, selection mirror, history, viewport and
//! clipboard, and drives a `SceneAdapter`. Every command mutates the scene,
//! requests a repaint and (for document changes) records a history entry.
//! Gestures the engine performs on its own (drags, freehand strokes) are
//! picked up from the event queue by `pump` and recorded by `tick` once
//! the debounce window has passed.

use crate::adapter::{LoadTicket, SceneAdapter, SceneEvent};
use crate::clipboard::Clipboard;
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::history::{History, RecordOutcome};
use crate::selection::{ClearedCallback, SelectionTracker};
use crate::style::StyleState;
use crate::tools::Tool;
use crate::viewport::Viewport;
use easel_core::document::{AllowList, Document, Snapshot};
use easel_core::presets::{self, Brush, TextOverrides};
use easel_core::{
    filters, Attr, DashArray, FontStyle, ObjectId, ObjectKind, Point, SceneObject, TextAlign,
};
use easel_render::ExportFormat;

/// Base name for every downloaded file.
pub const EXPORT_BASENAME: &str = "untitled";

/// A file ready to hand to the host's download mechanism.
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// What the out-of-process autosave receives after each recorded change.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistPayload {
    pub json: String,
    pub width: f64,
    pub height: f64,
}

pub type PersistCallback = Box<dyn FnMut(&PersistPayload) -> Result<(), EditorError>>;

/// Handle for one `add_image` request. Only the most recent request is
/// live; completions for older tickets are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageTicket(pub u64);

#[derive(Debug)]
struct PendingImage {
    generation: u64,
    uri: String,
}

pub struct Editor<S: SceneAdapter> {
    scene: S,
    config: EditorConfig,
    allow: AllowList,
    style: StyleState,
    selection: SelectionTracker,
    history: History,
    viewport: Viewport,
    clipboard: Clipboard,
    image_generation: u64,
    pending_image: Option<PendingImage>,
    on_persist: Option<PersistCallback>,
}

impl<S: SceneAdapter> Editor<S> {
    /// Mount the editor on `scene`.
    ///
    /// With `initial_state`, the prior document JSON is loaded; otherwise a
    /// workspace-only document of the configured size is built, centered in
    /// the container. Either way history starts with exactly one entry.
    pub fn new(
        mut scene: S,
        config: EditorConfig,
        initial_state: Option<&str>,
    ) -> Result<Self, EditorError> {
        config.validate()?;
        let allow = AllowList::default();
        let (initial, loading) = match initial_state {
            Some(json) => {
                let snapshot = Document::from_json(json)?.into_snapshot();
                let bytes = snapshot.encode()?;
                (bytes, Some(scene.load(snapshot)?))
            }
            None => {
                let (cw, ch) = scene.container_size();
                let mut workspace =
                    presets::workspace(config.workspace_width, config.workspace_height);
                workspace.set_center(Point::new(cw / 2.0, ch / 2.0));
                scene.add(workspace);
                (scene.serialize(&allow).encode()?, None)
            }
        };

        let history = History::new(initial, config.max_history, config.debounce_ms);
        let viewport = Viewport::new(scene.container_size(), &config);
        let clipboard = Clipboard::new(config.paste_offset);
        let mut editor = Self {
            scene,
            config,
            allow,
            style: StyleState::default(),
            selection: SelectionTracker::new(),
            history,
            viewport,
            clipboard,
            image_generation: 0,
            pending_image: None,
            on_persist: None,
        };
        if let Some(ticket) = loading {
            editor.history.begin_replay(ticket);
        }
        editor.process_events(None);
        editor.auto_zoom();
        log::debug!(
            "editor: mounted ({} objects)",
            editor.scene.all_objects().len()
        );
        Ok(editor)
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Direct engine access for gesture input. Call `pump`/`tick` afterwards
    /// so the resulting events reach the selection mirror and history.
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn style(&self) -> &StyleState {
        &self.style
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn workspace(&self) -> Option<&SceneObject> {
        self.scene.workspace()
    }

    pub fn selected(&self) -> &[ObjectId] {
        self.selection.selected()
    }

    /// Tools whose panels edit the selection are unavailable without one.
    pub fn is_tool_available(&self, tool: Tool) -> bool {
        !tool.needs_selection() || !self.selection.is_empty()
    }

    pub fn on_selection_cleared(&mut self, callback: ClearedCallback) {
        self.selection.on_cleared(callback);
    }

    pub fn on_persist(&mut self, callback: PersistCallback) {
        self.on_persist = Some(callback);
    }

    // ─── Event loop ──────────────────────────────────────────────────────

    /// Drain engine events at `now_ms`. Content changes arm the debounce.
    pub fn pump(&mut self, now_ms: u64) {
        self.process_events(Some(now_ms));
    }

    /// Drain events and record once the debounce window has elapsed.
    pub fn tick(&mut self, now_ms: u64) {
        self.pump(now_ms);
        if self.history.debounce.due(now_ms) {
            self.record();
        }
    }

    fn process_events(&mut self, now_ms: Option<u64>) {
        for event in self.scene.drain_events() {
            match event {
                SceneEvent::SelectionChanged(ids) => self.selection.update(ids),
                SceneEvent::Loaded(ticket) => self.finish_load(ticket),
                SceneEvent::ObjectModified(_) | SceneEvent::PathCreated(_)
                    if self.history.is_replaying() =>
                {
                    // A gesture landed on the replayed scene; keep it.
                    log::trace!("history: deferring {event:?} until replay completes");
                    self.history.defer_record();
                }
                event if event.is_mutation() => {
                    if self.history.is_replaying() {
                        log::trace!("history: ignoring {event:?} during replay");
                    } else if let Some(now) = now_ms {
                        self.history.debounce.schedule(now);
                    }
                }
                _ => {}
            }
        }
    }

    fn finish_load(&mut self, ticket: LoadTicket) {
        if !self.history.finish_replay(ticket) {
            log::debug!("editor: load {ticket:?} superseded");
            return;
        }
        self.auto_zoom();
        if self.history.take_deferred() {
            self.record();
        }
    }

    /// Flush engine events, repaint and record the result immediately.
    fn commit(&mut self) {
        self.process_events(None);
        self.scene.render();
        self.record();
    }

    fn record(&mut self) {
        let snapshot = self.scene.serialize(&self.allow);
        let bytes = match snapshot.encode() {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!("history: snapshot not recorded: {err}");
                return;
            }
        };
        if self.history.record(bytes) == RecordOutcome::Appended {
            self.persist(&snapshot);
        }
    }

    fn persist(&mut self, snapshot: &Snapshot) {
        let Some(callback) = self.on_persist.as_mut() else {
            return;
        };
        let payload = Document::from_snapshot(snapshot).and_then(|doc| {
            Ok(PersistPayload {
                json: doc.to_json()?,
                width: doc.width,
                height: doc.height,
            })
        });
        let result = match payload {
            Ok(payload) => callback(&payload),
            Err(err) => Err(err.into()),
        };
        if let Err(err) = result {
            log::warn!("editor: persist failed: {err}");
        }
    }

    // ─── Insertion ───────────────────────────────────────────────────────

    /// Center `object` on the workspace, insert it and select it.
    fn insert(&mut self, mut object: SceneObject) -> ObjectId {
        if let Some(center) = self.scene.workspace().map(SceneObject::center) {
            object.set_center(center);
        }
        let id = self.scene.add(object);
        self.scene.set_active(&[id]);
        self.commit();
        id
    }

    pub fn add_rectangle(&mut self) -> ObjectId {
        self.insert(presets::rectangle(&self.style.shape_style()))
    }

    pub fn add_soft_rectangle(&mut self) -> ObjectId {
        self.insert(presets::soft_rectangle(&self.style.shape_style()))
    }

    pub fn add_triangle(&mut self) -> ObjectId {
        self.insert(presets::triangle(&self.style.shape_style()))
    }

    pub fn add_inverse_triangle(&mut self) -> ObjectId {
        self.insert(presets::inverse_triangle(&self.style.shape_style()))
    }

    pub fn add_diamond(&mut self) -> ObjectId {
        self.insert(presets::diamond(&self.style.shape_style()))
    }

    pub fn add_circle(&mut self) -> ObjectId {
        self.insert(presets::circle(&self.style.shape_style()))
    }

    pub fn add_text(&mut self, content: &str, overrides: &TextOverrides) -> ObjectId {
        self.insert(presets::textbox(
            content,
            &self.style.text_style(),
            overrides,
        ))
    }

    /// Start an image insertion. The host fetches and decodes `uri`, then
    /// reports back through `complete_image`. Any earlier pending request
    /// is superseded.
    pub fn add_image(&mut self, uri: &str) -> ImageTicket {
        self.image_generation += 1;
        self.pending_image = Some(PendingImage {
            generation: self.image_generation,
            uri: uri.to_string(),
        });
        ImageTicket(self.image_generation)
    }

    /// Finish an image insertion with the decoded natural size, or the
    /// fetch/decode error. Returns `Ok(None)` for a superseded ticket.
    pub fn complete_image(
        &mut self,
        ticket: ImageTicket,
        decoded: Result<(u32, u32), String>,
    ) -> Result<Option<ObjectId>, EditorError> {
        let pending = match self.pending_image.take() {
            Some(pending) if pending.generation == ticket.0 => pending,
            other => {
                self.pending_image = other;
                log::warn!("editor: discarding superseded image completion {ticket:?}");
                return Ok(None);
            }
        };
        let (width, height) = decoded.map_err(|reason| EditorError::ImageLoad {
            uri: pending.uri.clone(),
            reason,
        })?;
        if width == 0 || height == 0 {
            return Err(EditorError::ImageLoad {
                uri: pending.uri,
                reason: format!("image has no pixels ({width}x{height})"),
            });
        }
        let target = self
            .scene
            .workspace()
            .map(SceneObject::scaled_size)
            .ok_or(EditorError::MissingWorkspace)?;
        let image = presets::image(&pending.uri, (width as f64, height as f64), target);
        Ok(Some(self.insert(image)))
    }

    /// Remove every active object and clear the selection. Also cancels a
    /// pending image insertion.
    pub fn delete(&mut self) {
        for id in self.scene.active_objects() {
            if self.scene.object(id).is_some_and(|obj| !obj.is_workspace()) {
                self.scene.remove(id);
            }
        }
        self.scene.clear_active();
        if self.pending_image.take().is_some() {
            log::debug!("editor: pending image cancelled by delete");
        }
        self.commit();
    }

    // ─── Style ───────────────────────────────────────────────────────────

    fn apply(&mut self, attr: Attr) {
        let applied = self.scene.apply_to_active(&attr);
        log::trace!("editor: {attr:?} applied to {applied} objects");
        self.commit();
    }

    pub fn change_fill_color(&mut self, value: &str) {
        self.style.fill = value.to_string();
        self.apply(Attr::Fill(value.to_string()));
    }

    /// Also recolors the drawing brush.
    pub fn change_stroke_color(&mut self, value: &str) {
        self.style.stroke_color = value.to_string();
        let brush = Brush {
            color: value.to_string(),
            width: self.scene.brush().width,
        };
        self.scene.set_brush(brush);
        self.apply(Attr::StrokeColor(value.to_string()));
    }

    /// Also resizes the drawing brush.
    pub fn change_stroke_width(&mut self, value: f64) {
        self.style.stroke_width = value;
        let brush = Brush {
            color: self.scene.brush().color.clone(),
            width: value,
        };
        self.scene.set_brush(brush);
        self.apply(Attr::StrokeWidth(value));
    }

    pub fn change_stroke_dash_array(&mut self, value: DashArray) {
        self.style.stroke_dash_array = value.clone();
        self.apply(Attr::StrokeDashArray(value));
    }

    pub fn change_opacity(&mut self, value: f64) {
        self.apply(Attr::Opacity(value));
    }

    pub fn change_font_family(&mut self, value: &str) {
        self.style.font_family = value.to_string();
        self.apply(Attr::FontFamily(value.to_string()));
    }

    pub fn change_font_weight(&mut self, value: u16) {
        self.style.font_weight = value;
        self.apply(Attr::FontWeight(value));
    }

    pub fn change_font_style(&mut self, value: FontStyle) {
        self.apply(Attr::FontStyle(value));
    }

    pub fn change_font_size(&mut self, value: f64) {
        self.style.font_size = value;
        self.apply(Attr::FontSize(value));
    }

    pub fn change_text_align(&mut self, value: TextAlign) {
        self.apply(Attr::TextAlign(value));
    }

    pub fn change_font_underline(&mut self, value: bool) {
        self.apply(Attr::Underline(value));
    }

    pub fn change_font_linethrough(&mut self, value: bool) {
        self.apply(Attr::Linethrough(value));
    }

    /// Replace the filter of every active image. Unknown names clear it.
    pub fn change_image_filter(&mut self, name: &str) {
        self.apply(Attr::Filter(filters::resolve(name)));
    }

    fn first_selected(&self) -> Option<&SceneObject> {
        self.selection.first().and_then(|id| self.scene.object(id))
    }

    pub fn active_fill_color(&self) -> String {
        self.style.active_fill(self.first_selected())
    }

    pub fn active_stroke_color(&self) -> String {
        self.style.active_stroke_color(self.first_selected())
    }

    pub fn active_stroke_width(&self) -> f64 {
        self.style.active_stroke_width(self.first_selected())
    }

    pub fn active_stroke_dash_array(&self) -> DashArray {
        self.style.active_stroke_dash_array(self.first_selected())
    }

    pub fn active_opacity(&self) -> f64 {
        self.style.active_opacity(self.first_selected())
    }

    pub fn active_font_family(&self) -> String {
        self.style.active_font_family(self.first_selected())
    }

    pub fn active_font_weight(&self) -> u16 {
        self.style.active_font_weight(self.first_selected())
    }

    pub fn active_font_style(&self) -> FontStyle {
        self.style.active_font_style(self.first_selected())
    }

    pub fn active_font_size(&self) -> f64 {
        self.style.active_font_size(self.first_selected())
    }

    pub fn active_text_align(&self) -> TextAlign {
        self.style.active_text_align(self.first_selected())
    }

    pub fn active_underline(&self) -> bool {
        self.style.active_underline(self.first_selected())
    }

    pub fn active_linethrough(&self) -> bool {
        self.style.active_linethrough(self.first_selected())
    }

    // ─── Stacking ────────────────────────────────────────────────────────

    pub fn bring_forward(&mut self) {
        for id in self.scene.active_objects() {
            self.scene.bring_forward(id);
        }
        self.pin_workspace();
        self.commit();
    }

    pub fn send_backwards(&mut self) {
        for id in self.scene.active_objects() {
            self.scene.send_backwards(id);
        }
        self.pin_workspace();
        self.commit();
    }

    /// The workspace always stays bottommost.
    fn pin_workspace(&mut self) {
        if let Some(id) = self.scene.workspace().map(|ws| ws.id) {
            self.scene.send_to_back(id);
        }
    }

    // ─── Workspace ───────────────────────────────────────────────────────

    pub fn change_size(&mut self, width: f64, height: f64) {
        let Some(id) = self.scene.workspace().map(|ws| ws.id) else {
            return;
        };
        if let Some(ObjectKind::Rect {
            width: w,
            height: h,
            ..
        }) = self.scene.object_mut(id).map(|ws| &mut ws.kind)
        {
            *w = width;
            *h = height;
        }
        self.auto_zoom();
        self.commit();
    }

    pub fn change_background(&mut self, color: &str) {
        let Some(id) = self.scene.workspace().map(|ws| ws.id) else {
            return;
        };
        if let Some(ws) = self.scene.object_mut(id) {
            ws.fill = Some(color.to_string());
        }
        self.commit();
    }

    // ─── Drawing mode ────────────────────────────────────────────────────

    pub fn enable_drawing_mode(&mut self) {
        self.scene.clear_active();
        self.scene.set_brush(Brush {
            color: self.style.stroke_color.clone(),
            width: self.config.brush_width,
        });
        self.scene.set_drawing_mode(true);
        self.process_events(None);
        self.scene.render();
    }

    pub fn disable_drawing_mode(&mut self) {
        self.scene.set_drawing_mode(false);
        self.scene.render();
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.replay(History::undo)
    }

    pub fn redo(&mut self) -> bool {
        self.replay(History::redo)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn replay(&mut self, step: fn(&mut History) -> Option<&[u8]>) -> bool {
        // An unfinished gesture is recorded before navigating away from it.
        if self.history.debounce.is_pending() && !self.history.is_replaying() {
            self.record();
        }
        let previous = self.history.index();
        let snapshot = match step(&mut self.history).map(Snapshot::decode) {
            None => return false,
            Some(Ok(snapshot)) => snapshot,
            Some(Err(err)) => {
                log::warn!("history: entry not replayable: {err}");
                self.history.restore_index(previous);
                return false;
            }
        };
        match self.scene.load(snapshot) {
            Ok(ticket) => {
                self.history.begin_replay(ticket);
                self.process_events(None);
                true
            }
            Err(err) => {
                log::warn!("history: replay rejected: {err}");
                self.history.restore_index(previous);
                false
            }
        }
    }

    // ─── Export ──────────────────────────────────────────────────────────

    pub fn save_png(&mut self) -> Result<Download, EditorError> {
        self.export(ExportFormat::Png)
    }

    pub fn save_jpg(&mut self) -> Result<Download, EditorError> {
        self.export(ExportFormat::Jpeg)
    }

    pub fn save_svg(&mut self) -> Result<Download, EditorError> {
        self.export(ExportFormat::Svg)
    }

    /// Export the workspace region at identity zoom. The viewport is
    /// refitted afterwards even when the export fails.
    fn export(&mut self, format: ExportFormat) -> Result<Download, EditorError> {
        let region = self
            .scene
            .workspace()
            .map(SceneObject::bounds)
            .ok_or(EditorError::MissingWorkspace)?;
        let identity = self.viewport.reset();
        self.scene.set_viewport_transform(identity);
        let result = self.scene.export(region, format);
        self.auto_zoom();
        let bytes = result?;
        Ok(Download {
            filename: format!("{EXPORT_BASENAME}.{}", format.extension()),
            mime: format.mime().to_string(),
            bytes,
        })
    }

    /// The current scene as a normalized document.
    pub fn to_document(&self) -> Result<Document, EditorError> {
        Ok(Document::from_snapshot(&self.scene.serialize(&self.allow))?)
    }

    pub fn save_json(&self) -> Result<Download, EditorError> {
        let json = self.to_document()?.to_json_pretty()?;
        Ok(Download {
            filename: format!("{EXPORT_BASENAME}.json"),
            mime: "application/json".to_string(),
            bytes: json.into_bytes(),
        })
    }

    /// Replace the document with `json`. A document that fails to parse
    /// or validate leaves the scene and history untouched. The load is
    /// recorded as one undoable step once it completes.
    pub fn load_json(&mut self, json: &str) -> Result<(), EditorError> {
        let snapshot = Document::from_json(json)?.into_snapshot();
        let ticket = self.scene.load(snapshot)?;
        self.pending_image = None;
        self.history.begin_replay(ticket);
        self.history.defer_record();
        self.process_events(None);
        Ok(())
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    pub fn copy(&mut self) {
        let objects: Vec<SceneObject> = self
            .scene
            .active_objects()
            .into_iter()
            .filter_map(|id| self.scene.object(id))
            .filter(|obj| !obj.is_workspace())
            .cloned()
            .collect();
        self.clipboard.copy(objects);
    }

    /// Insert offset clones of the clipboard and select them.
    pub fn paste(&mut self) -> Vec<ObjectId> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        let ids: Vec<ObjectId> = self
            .clipboard
            .paste()
            .into_iter()
            .map(|obj| self.scene.add(obj))
            .collect();
        self.scene.set_active(&ids);
        self.commit();
        ids
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    /// Fit the workspace into the container.
    pub fn auto_zoom(&mut self) {
        let (width, height) = self.scene.container_size();
        self.viewport.resize(width, height);
        let Some(region) = self.scene.workspace().map(SceneObject::bounds) else {
            return;
        };
        let transform = self.viewport.fit(region);
        self.scene.set_viewport_transform(transform);
        self.scene.render();
    }

    pub fn zoom_in(&mut self) {
        let transform = self.viewport.zoom_in();
        self.scene.set_viewport_transform(transform);
        self.scene.render();
    }

    pub fn zoom_out(&mut self) {
        let transform = self.viewport.zoom_out();
        self.scene.set_viewport_transform(transform);
        self.scene.render();
    }

    pub fn resize_container(&mut self, width: f64, height: f64) {
        self.scene.set_container_size(width, height);
        self.auto_zoom();
    }
}
