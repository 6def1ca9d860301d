//! Headless scene adapter.
//!
//! Keeps the object arena in memory, renders nothing on screen and exports
//! through `easel-render`. Used by the CLI, the WASM bridge and tests. It
//! also provides the gesture entry points a real engine would drive from
//! pointer input (drag, freehand stroke, click selection).

use crate::adapter::{LoadTicket, SceneAdapter, SceneEvent};
use easel_core::document::{AllowList, Snapshot};
use easel_core::presets::{self, Brush};
use easel_core::{Affine, Attr, CodecError, ObjectId, Point, Rect, Scene, SceneObject, STROKE_COLOR};
use easel_render::{ExportError, ExportFormat};

pub struct MemoryScene {
    scene: Scene,
    active: Vec<ObjectId>,
    events: Vec<SceneEvent>,
    transform: Affine,
    container: (f64, f64),
    drawing: bool,
    brush: Brush,
    next_ticket: u64,
    /// When set, `Loaded` events are held back until `finish_loads`.
    defer_loads: bool,
    held_loads: Vec<LoadTicket>,
    frames: u64,
}

impl MemoryScene {
    pub fn new(container_width: f64, container_height: f64) -> Self {
        Self {
            scene: Scene::new(),
            active: Vec::new(),
            events: Vec::new(),
            transform: Affine::IDENTITY,
            container: (container_width, container_height),
            drawing: false,
            brush: Brush {
                color: STROKE_COLOR.to_string(),
                width: 1.0,
            },
            next_ticket: 0,
            defer_loads: false,
            held_loads: Vec::new(),
            frames: 0,
        }
    }

    /// Simulate an engine whose loads complete asynchronously: `Loaded`
    /// events are only queued by `finish_loads`.
    pub fn with_deferred_loads(mut self) -> Self {
        self.defer_loads = true;
        self
    }

    /// Queue `Loaded` for every held load, oldest first.
    pub fn finish_loads(&mut self) {
        for ticket in self.held_loads.drain(..) {
            self.events.push(SceneEvent::Loaded(ticket));
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Repaints requested so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn to_scene_point(&self, screen: Point) -> Point {
        self.transform.inverse() * screen
    }

    // ─── Gestures ────────────────────────────────────────────────────────

    /// Drag an object by a scene-space delta.
    pub fn translate(&mut self, id: ObjectId, dx: f64, dy: f64) -> bool {
        match self.scene.get_mut(id) {
            Some(obj) if obj.is_selectable() => {
                obj.translate(dx, dy);
                self.events.push(SceneEvent::ObjectModified(id));
                true
            }
            _ => false,
        }
    }

    /// Turn a finished freehand stroke (screen coordinates) into a path
    /// object. Ignored outside drawing mode.
    pub fn finish_stroke(&mut self, screen_points: &[Point]) -> Option<ObjectId> {
        if !self.drawing {
            return None;
        }
        let points: Vec<Point> = screen_points
            .iter()
            .map(|p| self.to_scene_point(*p))
            .collect();
        let path = presets::freehand(&points, &self.brush)?;
        let id = self.add(path);
        self.events.push(SceneEvent::PathCreated(id));
        Some(id)
    }

    /// Click selection at a screen position. With `additive`, toggles the
    /// hit object in the selection; a click on empty space clears it.
    pub fn select_at(&mut self, screen: Point, additive: bool) -> Option<ObjectId> {
        if self.drawing {
            return None;
        }
        let hit = easel_render::hit_test(&self.scene, self.to_scene_point(screen));
        match hit {
            Some(id) if additive => {
                let mut next = self.active.clone();
                if let Some(pos) = next.iter().position(|a| *a == id) {
                    next.remove(pos);
                } else {
                    next.push(id);
                }
                self.set_active(&next);
            }
            Some(id) => self.set_active(&[id]),
            None if !additive => self.clear_active(),
            None => {}
        }
        hit
    }

    /// Marquee selection over a screen-space rectangle.
    pub fn select_rect(&mut self, screen: Rect) -> Vec<ObjectId> {
        let inverse = self.transform.inverse();
        let region = inverse.transform_rect_bbox(screen);
        let hits = easel_render::hit_test_rect(&self.scene, region);
        self.set_active(&hits);
        hits
    }
}

impl SceneAdapter for MemoryScene {
    fn all_objects(&self) -> Vec<&SceneObject> {
        self.scene.objects().collect()
    }

    fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.scene.get(id)
    }

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.scene.get_mut(id)
    }

    fn active_objects(&self) -> Vec<ObjectId> {
        self.active.clone()
    }

    fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = self.scene.add(object);
        self.events.push(SceneEvent::ObjectAdded(id));
        id
    }

    fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let removed = self.scene.remove(id)?;
        self.events.push(SceneEvent::ObjectRemoved(id));
        if self.active.contains(&id) {
            let next: Vec<ObjectId> = self.active.iter().copied().filter(|a| *a != id).collect();
            self.set_active(&next);
        }
        Some(removed)
    }

    fn set_active(&mut self, ids: &[ObjectId]) {
        let next: Vec<ObjectId> = ids
            .iter()
            .copied()
            .filter(|id| self.scene.get(*id).is_some_and(|obj| obj.is_selectable()))
            .collect();
        if next != self.active {
            self.active = next.clone();
            self.events.push(SceneEvent::SelectionChanged(next));
        }
    }

    fn clear_active(&mut self) {
        self.set_active(&[]);
    }

    fn apply_to_active(&mut self, attr: &Attr) -> usize {
        let mut applied = 0;
        for id in &self.active {
            if let Some(obj) = self.scene.get_mut(*id)
                && obj.apply(attr)
            {
                applied += 1;
            }
        }
        applied
    }

    fn bring_forward(&mut self, id: ObjectId) -> bool {
        self.scene.bring_forward(id)
    }

    fn send_backwards(&mut self, id: ObjectId) -> bool {
        self.scene.send_backwards(id)
    }

    fn send_to_back(&mut self, id: ObjectId) -> bool {
        self.scene.send_to_back(id)
    }

    fn serialize(&self, allow: &AllowList) -> Snapshot {
        self.scene.snapshot(allow)
    }

    fn load(&mut self, snapshot: Snapshot) -> Result<LoadTicket, CodecError> {
        let scene = Scene::from_snapshot(snapshot)?;
        self.next_ticket += 1;
        let ticket = LoadTicket(self.next_ticket);

        self.clear_active();
        let old: Vec<ObjectId> = self.scene.ids();
        self.scene = scene;
        for id in old {
            self.events.push(SceneEvent::ObjectRemoved(id));
        }
        for id in self.scene.ids() {
            self.events.push(SceneEvent::ObjectAdded(id));
        }
        self.transform = Affine::IDENTITY;
        self.frames += 1;

        if self.defer_loads {
            self.held_loads.push(ticket);
        } else {
            self.events.push(SceneEvent::Loaded(ticket));
        }
        log::debug!("memory scene: load {:?} ({} objects)", ticket, self.scene.len());
        Ok(ticket)
    }

    fn render(&mut self) {
        self.frames += 1;
    }

    fn viewport_transform(&self) -> Affine {
        self.transform
    }

    fn set_viewport_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn container_size(&self) -> (f64, f64) {
        self.container
    }

    fn set_container_size(&mut self, width: f64, height: f64) {
        self.container = (width, height);
    }

    fn is_drawing_mode(&self) -> bool {
        self.drawing
    }

    fn set_drawing_mode(&mut self, enabled: bool) {
        self.drawing = enabled;
    }

    fn brush(&self) -> &Brush {
        &self.brush
    }

    fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }

    fn export(&self, region: Rect, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        easel_render::export(&self.scene, region, format)
    }

    fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }
}
