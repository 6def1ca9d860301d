//! Integration tests: snapshot history (easel-editor).
//!
//! Drives `Editor<MemoryScene>` through commands, gestures and replays,
//! checking history bounds, the replay re-entrancy guard, debounced
//! recording and the persist hook.

use easel_core::{Point, SceneObject};
use easel_editor::{Editor, EditorConfig, EditorError, MemoryScene, PersistPayload, SceneAdapter};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

fn blank() -> Editor<MemoryScene> {
    Editor::new(MemoryScene::new(1200.0, 900.0), EditorConfig::default(), None).unwrap()
}

fn deferred() -> Editor<MemoryScene> {
    let scene = MemoryScene::new(1200.0, 900.0).with_deferred_loads();
    Editor::new(scene, EditorConfig::default(), None).unwrap()
}

fn fills(ed: &Editor<MemoryScene>) -> Vec<Option<String>> {
    ed.scene()
        .all_objects()
        .into_iter()
        .filter(|obj| !obj.is_workspace())
        .map(|obj| obj.fill.clone())
        .collect()
}

fn object_count(ed: &Editor<MemoryScene>) -> usize {
    ed.scene().all_objects().len()
}

// ─── Bounds ─────────────────────────────────────────────────────────────

#[test]
fn undo_at_start_is_a_no_op() {
    let mut ed = blank();
    let before = ed.save_json().unwrap();

    assert!(!ed.undo());
    assert_eq!(ed.history().index(), 0);
    assert_eq!(ed.history().len(), 1);
    assert_eq!(ed.save_json().unwrap(), before);
}

#[test]
fn redo_at_end_is_a_no_op() {
    let mut ed = blank();
    ed.add_rectangle();
    assert!(!ed.redo());
    assert_eq!(ed.history().index(), 1);
}

#[test]
fn can_undo_and_redo_track_the_index() {
    let mut ed = blank();
    let initial = ed.save_json().unwrap();
    ed.add_rectangle();
    ed.add_circle();
    ed.add_diamond();
    let n = ed.history().len() - 1;
    assert_eq!(n, 3);

    for step in (0..n).rev() {
        assert!(ed.can_undo());
        assert!(ed.undo());
        assert_eq!(ed.history().index(), step);
        assert!(ed.can_redo());
    }
    assert!(!ed.can_undo());
    assert_eq!(ed.save_json().unwrap(), initial);

    for step in 1..=n {
        assert!(ed.redo());
        assert_eq!(ed.history().index(), step);
    }
    assert!(!ed.can_redo());
    assert_eq!(object_count(&ed), 4);
}

#[test]
fn unchanged_document_is_not_recorded() {
    let mut ed = blank();
    // Nothing selected: the defaults change, the document does not.
    ed.change_fill_color("#123456");
    ed.change_opacity(0.5);
    ed.delete();
    assert_eq!(ed.history().len(), 1);
}

#[test]
fn new_mutation_truncates_redo_tail() {
    let mut ed = blank();
    ed.add_rectangle();
    ed.add_circle();
    ed.undo();
    ed.add_triangle();
    assert_eq!(ed.history().len(), 3);
    assert!(!ed.can_redo());
}

#[test]
fn history_is_capped() {
    let config = EditorConfig {
        max_history: 3,
        ..EditorConfig::default()
    };
    let mut ed = Editor::new(MemoryScene::new(1200.0, 900.0), config, None).unwrap();
    for _ in 0..5 {
        ed.add_rectangle();
    }
    assert_eq!(ed.history().len(), 3);
    assert!(ed.undo());
    assert!(ed.undo());
    assert!(!ed.undo());
    // The oldest surviving entry has three rectangles.
    assert_eq!(object_count(&ed), 4);
}

// ─── Re-entrancy ────────────────────────────────────────────────────────

#[test]
fn undo_does_not_record_its_own_replay() {
    let mut ed = blank();
    ed.add_rectangle();
    ed.change_fill_color("#ff0000");
    let len = ed.history().len();
    let index = ed.history().index();

    assert!(ed.undo());
    ed.tick(10_000);
    assert_eq!(ed.history().len(), len);
    assert_eq!(ed.history().index(), index - 1);
    assert!(!ed.history().is_replaying());
}

#[test]
fn replay_events_are_ignored_until_load_completes() {
    let mut ed = deferred();
    ed.add_rectangle();
    ed.change_fill_color("#ff0000");

    assert!(ed.undo());
    assert!(ed.history().is_replaying());
    // The engine reports removals/additions from the replay.
    ed.tick(0);
    ed.tick(10_000);
    assert_eq!(ed.history().len(), 3);

    ed.scene_mut().finish_loads();
    ed.pump(10_001);
    assert!(!ed.history().is_replaying());
    assert_eq!(ed.history().len(), 3);
    assert_eq!(ed.history().index(), 1);
}

#[test]
fn newer_undo_supersedes_in_flight_replay() {
    let mut ed = deferred();
    ed.add_rectangle();
    ed.add_circle();

    assert!(ed.undo());
    assert!(ed.undo());
    assert_eq!(ed.history().index(), 0);

    // Both loads complete; only the second one ends the replay.
    ed.scene_mut().finish_loads();
    ed.pump(0);
    assert!(!ed.history().is_replaying());
    assert_eq!(object_count(&ed), 1);
    assert_eq!(ed.history().len(), 3);
}

#[test]
fn command_during_replay_is_recorded_after_it() {
    let mut ed = deferred();
    ed.add_rectangle();
    ed.add_circle();

    assert!(ed.undo());
    ed.add_triangle();
    assert_eq!(ed.history().len(), 3, "record must wait for the replay");

    ed.scene_mut().finish_loads();
    ed.pump(0);
    assert_eq!(ed.history().len(), 3);
    assert_eq!(ed.history().index(), 2);
    assert!(!ed.can_redo());
}

#[test]
fn gesture_during_replay_is_recorded_after_it() {
    let mut ed = deferred();
    let rect = ed.add_rectangle();
    ed.add_circle();
    let left = ed.scene().object(rect).unwrap().left;

    assert!(ed.undo());
    assert!(ed.scene_mut().translate(rect, 50.0, 0.0));
    ed.pump(0);
    assert_eq!(ed.history().len(), 3);

    ed.scene_mut().finish_loads();
    ed.tick(10_000);
    assert_eq!(ed.history().len(), 3);
    assert_eq!(ed.history().index(), 2);
    assert!(!ed.can_redo());
    assert_eq!(ed.scene().object(rect).unwrap().left, left + 50.0);

    assert!(ed.undo());
    ed.scene_mut().finish_loads();
    ed.pump(0);
    assert_eq!(ed.scene().object(rect).unwrap().left, left);
}

#[test]
fn object_ids_survive_undo_and_redo() {
    let mut ed = blank();
    let rect = ed.add_rectangle();
    let circle = ed.add_circle();

    assert!(ed.undo());
    assert!(ed.scene().object(rect).is_some());
    assert!(ed.scene().object(circle).is_none());

    assert!(ed.redo());
    assert!(ed.scene().object(rect).is_some());
    assert!(ed.scene().object(circle).is_some());

    ed.add_triangle();
    assert!(ed.undo());
    assert!(ed.undo());
    assert!(ed.scene().object(rect).is_some());
}

#[test]
fn deferred_initial_load_is_not_recorded() {
    let json = include_str!("fixtures/card.json");
    let scene = MemoryScene::new(1200.0, 900.0).with_deferred_loads();
    let mut ed = Editor::new(scene, EditorConfig::default(), Some(json)).unwrap();
    assert!(ed.history().is_replaying());

    ed.scene_mut().finish_loads();
    ed.tick(0);
    ed.tick(10_000);
    assert!(!ed.history().is_replaying());
    assert_eq!(ed.history().len(), 1);
}

// ─── Loading ────────────────────────────────────────────────────────────

#[test]
fn load_json_is_one_undoable_step() {
    let json = include_str!("fixtures/card.json");
    let mut ed = blank();
    ed.add_rectangle();
    ed.load_json(json).unwrap();
    assert_eq!(ed.history().len(), 3);
    assert_eq!(object_count(&ed), 3);

    assert!(ed.undo());
    assert_eq!(object_count(&ed), 2);
}

#[test]
fn rejected_load_leaves_history_intact() {
    let mut ed = blank();
    ed.add_rectangle();
    let before = ed.save_json().unwrap();

    let err = ed
        .load_json(r#"{"objects":[{"type":"star","points":5}]}"#)
        .unwrap_err();
    assert!(matches!(err, EditorError::Codec(_)));
    assert!(ed.load_json("{ not json").is_err());

    assert_eq!(ed.history().len(), 2);
    assert_eq!(ed.save_json().unwrap(), before);
}

// ─── Debounced gestures ─────────────────────────────────────────────────

#[test]
fn drag_is_recorded_after_quiet_period() {
    let mut ed = blank();
    let id = ed.add_rectangle();

    ed.scene_mut().translate(id, 5.0, 0.0);
    ed.tick(1_000);
    ed.scene_mut().translate(id, 5.0, 0.0);
    ed.tick(1_300);
    ed.tick(1_700);
    assert_eq!(ed.history().len(), 2, "still inside the window");

    ed.tick(1_800);
    assert_eq!(ed.history().len(), 3, "both drags coalesce into one entry");

    ed.undo();
    let left = ed.scene().all_objects()[1].left;
    ed.redo();
    assert_eq!(ed.scene().all_objects()[1].left, left + 10.0);
}

#[test]
fn undo_flushes_a_pending_gesture() {
    let mut ed = blank();
    let id = ed.add_rectangle();
    let left = ed.scene().object(id).unwrap().left;

    ed.scene_mut().translate(id, 40.0, 0.0);
    ed.pump(0);
    assert!(ed.undo());
    assert_eq!(ed.history().len(), 3);
    assert_eq!(ed.scene().all_objects()[1].left, left);
    assert!(ed.can_redo());
}

#[test]
fn freehand_stroke_is_recorded() {
    let mut ed = blank();
    ed.enable_drawing_mode();
    let path = ed
        .scene_mut()
        .finish_stroke(&[
            Point::new(600.0, 400.0),
            Point::new(620.0, 410.0),
            Point::new(650.0, 450.0),
        ])
        .unwrap();
    ed.tick(0);
    ed.tick(500);
    assert_eq!(ed.history().len(), 2);

    let stroke: &SceneObject = ed.scene().object(path).unwrap();
    assert_eq!(stroke.stroke.as_deref(), Some(ed.style().stroke_color.as_str()));
    assert_eq!(stroke.stroke_width, ed.config().brush_width);
}

// ─── Persist hook ───────────────────────────────────────────────────────

#[test]
fn persist_runs_after_each_recorded_entry() {
    let seen: Rc<RefCell<Vec<PersistPayload>>> = Rc::default();
    let sink = seen.clone();
    let mut ed = blank();
    ed.on_persist(Box::new(move |payload: &PersistPayload| {
        sink.borrow_mut().push(payload.clone());
        Ok(())
    }));

    ed.add_rectangle();
    ed.change_fill_color("#00ff00");
    ed.delete();
    ed.delete();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 3);
    assert_eq!((seen[0].width, seen[0].height), (900.0, 1200.0));
    assert!(seen[1].json.contains("#00ff00"));
}

#[test]
fn persist_failure_keeps_the_entry() {
    let mut ed = blank();
    ed.on_persist(Box::new(|_: &PersistPayload| Err(EditorError::Persist("offline".into()))));
    ed.add_rectangle();
    assert_eq!(ed.history().len(), 2);
    assert!(ed.can_undo());
}

#[test]
fn fills_follow_undo_and_redo() {
    let mut ed = blank();
    ed.add_rectangle();
    ed.change_fill_color("#ff0000");
    ed.add_circle();
    ed.change_fill_color("#0000ff");

    ed.undo();
    assert_eq!(
        fills(&ed),
        vec![Some("#ff0000".to_string()), Some("#ff0000".to_string())]
    );
    ed.redo();
    assert_eq!(
        fills(&ed),
        vec![Some("#ff0000".to_string()), Some("#0000ff".to_string())]
    );
}
