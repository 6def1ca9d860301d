//! Hit testing: point → object lookup.
//!
//! Walks the stacking order top-down to find which selectable object is at
//! a given scene position. The workspace is never hit.

use easel_core::model::{ObjectKind, SceneObject};
use easel_core::{ObjectId, Scene};
use kurbo::{Point, Rect, Shape};

/// Find the topmost selectable object at `point` (scene coordinates).
/// Returns `None` for empty space.
pub fn hit_test(scene: &Scene, point: Point) -> Option<ObjectId> {
    scene
        .objects()
        .rev()
        .filter(|obj| obj.is_selectable())
        .find(|obj| contains(obj, point))
        .map(|obj| obj.id)
}

/// All selectable objects whose bounds intersect `rect`, bottom first.
/// Used for marquee selection.
pub fn hit_test_rect(scene: &Scene, rect: Rect) -> Vec<ObjectId> {
    scene
        .objects()
        .filter(|obj| obj.is_selectable())
        .filter(|obj| obj.bounds().intersect(rect).area() > 0.0)
        .map(|obj| obj.id)
        .collect()
}

fn contains(obj: &SceneObject, point: Point) -> bool {
    let transform = obj.transform();
    if transform.determinant().abs() < f64::EPSILON {
        return false;
    }
    let local = transform.inverse() * point;
    match &obj.kind {
        // Open strokes: accept anywhere on the stroke's padded bounds.
        ObjectKind::Path { .. } => obj
            .kind
            .local_bounds()
            .inflate(obj.stroke_width / 2.0, obj.stroke_width / 2.0)
            .contains(local),
        ObjectKind::Textbox(_) | ObjectKind::Image(_) => obj.kind.local_bounds().contains(local),
        _ => obj.kind.outline().contains(local),
    }
}
