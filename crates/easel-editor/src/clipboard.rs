//! Copy/paste buffer for selected objects.

use easel_core::{ObjectId, SceneObject};

/// In-memory copy buffer (not the system clipboard).
///
/// Each paste yields clones offset from the previous paste, so repeated
/// pastes step diagonally away from the original.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    buffer: Vec<SceneObject>,
    offset: f64,
}

impl Clipboard {
    pub fn new(offset: f64) -> Self {
        Self {
            buffer: Vec::new(),
            offset,
        }
    }

    /// Replace the buffer. An empty selection leaves it untouched.
    /// Buffered copies are detached from their originals' IDs.
    pub fn copy(&mut self, mut objects: Vec<SceneObject>) {
        if objects.is_empty() {
            return;
        }
        for obj in &mut objects {
            obj.id = ObjectId::unassigned();
        }
        self.buffer = objects;
    }

    /// Offset clones of the buffer, ready for insertion.
    pub fn paste(&mut self) -> Vec<SceneObject> {
        for obj in &mut self.buffer {
            obj.translate(self.offset, self.offset);
        }
        self.buffer.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::presets::{self, ShapeStyle};

    #[test]
    fn repeated_paste_steps_offset() {
        let mut rect = presets::rectangle(&ShapeStyle::default());
        rect.left = 100.0;
        rect.top = 100.0;
        let mut clipboard = Clipboard::new(10.0);
        clipboard.copy(vec![rect]);

        let first = clipboard.paste();
        assert_eq!((first[0].left, first[0].top), (110.0, 110.0));
        let second = clipboard.paste();
        assert_eq!((second[0].left, second[0].top), (120.0, 120.0));
    }

    #[test]
    fn empty_copy_keeps_buffer() {
        let mut clipboard = Clipboard::new(10.0);
        assert!(clipboard.paste().is_empty());
        clipboard.copy(vec![presets::rectangle(&ShapeStyle::default())]);
        clipboard.copy(Vec::new());
        assert!(!clipboard.is_empty());
    }
}
