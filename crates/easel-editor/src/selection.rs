//! Active-selection mirror and the selection-cleared hook.

use easel_core::ObjectId;

pub type ClearedCallback = Box<dyn FnMut()>;

/// Mirrors the engine's active selection. Entries are never validated
/// against the scene; the next `SelectionChanged` event reconciles them.
#[derive(Default)]
pub struct SelectionTracker {
    selected: Vec<ObjectId>,
    on_cleared: Option<ClearedCallback>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_cleared(&mut self, callback: ClearedCallback) {
        self.on_cleared = Some(callback);
    }

    /// Replace the tracked set, firing the cleared callback whenever the
    /// new set is empty, even if it already was.
    pub fn update(&mut self, ids: Vec<ObjectId>) {
        self.selected = ids;
        if self.selected.is_empty()
            && let Some(callback) = self.on_cleared.as_mut()
        {
            callback();
        }
    }

    pub fn selected(&self) -> &[ObjectId] {
        &self.selected
    }

    pub fn first(&self) -> Option<ObjectId> {
        self.selected.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
