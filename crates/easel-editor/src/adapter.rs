//! Scene adapter: the editor's view of the rendering engine.
//!
//! The engine owns the object tree. The editor reads and mutates it only
//! through this trait and learns about engine-side changes (user gestures,
//! completed loads) by draining queued `SceneEvent`s.

use easel_core::document::{AllowList, Snapshot};
use easel_core::presets::Brush;
use easel_core::{Affine, Attr, CodecError, ObjectId, Rect, SceneObject};
use easel_render::{ExportError, ExportFormat};

/// Identifies one `load` call; completion is reported as
/// `SceneEvent::Loaded` with the same ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(pub u64);

/// Change notifications queued by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    ObjectAdded(ObjectId),
    ObjectRemoved(ObjectId),
    ObjectModified(ObjectId),
    /// A freehand stroke was turned into a path object.
    PathCreated(ObjectId),
    /// The active selection changed; carries the new selection.
    SelectionChanged(Vec<ObjectId>),
    /// A `load` finished reconstructing the scene.
    Loaded(LoadTicket),
}

impl SceneEvent {
    /// True for events that change document content.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            SceneEvent::ObjectAdded(_)
                | SceneEvent::ObjectRemoved(_)
                | SceneEvent::ObjectModified(_)
                | SceneEvent::PathCreated(_)
        )
    }
}

pub trait SceneAdapter {
    /// All objects in stacking order, bottom first.
    fn all_objects(&self) -> Vec<&SceneObject>;

    fn object(&self, id: ObjectId) -> Option<&SceneObject>;

    /// Direct mutable access. Programmatic edits do not queue events.
    fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject>;

    fn active_objects(&self) -> Vec<ObjectId>;

    /// Insert on top of the stack; queues `ObjectAdded`.
    fn add(&mut self, object: SceneObject) -> ObjectId;

    /// Remove an object (dropping it from the selection); queues
    /// `ObjectRemoved`. Unknown IDs are ignored.
    fn remove(&mut self, id: ObjectId) -> Option<SceneObject>;

    /// Replace the selection; queues `SelectionChanged` when it changes.
    fn set_active(&mut self, ids: &[ObjectId]);

    fn clear_active(&mut self);

    /// Apply an attribute to every active object that supports it.
    /// Returns how many objects accepted it.
    fn apply_to_active(&mut self, attr: &Attr) -> usize;

    fn bring_forward(&mut self, id: ObjectId) -> bool;
    fn send_backwards(&mut self, id: ObjectId) -> bool;
    fn send_to_back(&mut self, id: ObjectId) -> bool;

    fn serialize(&self, allow: &AllowList) -> Snapshot;

    /// Replace the scene with `snapshot`. The snapshot is validated before
    /// the live scene is touched. Loading resets the viewport transform and
    /// clears the selection; completion arrives as `Loaded(ticket)`.
    fn load(&mut self, snapshot: Snapshot) -> Result<LoadTicket, CodecError>;

    /// Request a repaint.
    fn render(&mut self);

    fn viewport_transform(&self) -> Affine;
    fn set_viewport_transform(&mut self, transform: Affine);

    /// Container size in pixels.
    fn container_size(&self) -> (f64, f64);
    fn set_container_size(&mut self, width: f64, height: f64);

    fn is_drawing_mode(&self) -> bool;
    fn set_drawing_mode(&mut self, enabled: bool);
    fn brush(&self) -> &Brush;
    fn set_brush(&mut self, brush: Brush);

    /// Export `region` (scene coordinates) in `format`.
    fn export(&self, region: Rect, format: ExportFormat) -> Result<Vec<u8>, ExportError>;

    fn drain_events(&mut self) -> Vec<SceneEvent>;

    fn workspace(&self) -> Option<&SceneObject> {
        self.all_objects().into_iter().find(|obj| obj.is_workspace())
    }
}
