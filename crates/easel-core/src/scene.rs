//! Object arena for a live document.
//!
//! Objects live in a `StableGraph` so indices stay valid across removals;
//! everything outside the arena refers to objects by `ObjectId`. Stacking
//! order is kept explicitly (bottom → top), the workspace normally sitting
//! at the bottom.

use crate::document::{AllowList, Snapshot};
use crate::error::CodecError;
use crate::id::ObjectId;
use crate::model::SceneObject;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableGraph;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Object storage.
    arena: StableGraph<SceneObject, ()>,
    /// Stacking order, bottom first.
    order: Vec<NodeIndex>,
    /// Index from ObjectId → NodeIndex for fast lookup.
    id_index: HashMap<ObjectId, NodeIndex>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a scene from a snapshot. The snapshot is validated first, so
    /// a rejected snapshot never produces a partially-built scene.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, CodecError> {
        snapshot.validate()?;
        let mut scene = Scene::new();
        for object in snapshot.objects {
            scene.add(object);
        }
        Ok(scene)
    }

    /// Canonical description of the scene restricted to `allow`.
    pub fn snapshot(&self, allow: &AllowList) -> Snapshot {
        Snapshot {
            objects: self
                .objects()
                .map(|obj| {
                    let mut record = obj.clone();
                    record.meta = obj.meta.restricted(allow.keys());
                    record
                })
                .collect(),
        }
    }

    /// Insert on top of the stack. Objects without a usable ID (decoded or
    /// cloned ones) are given a fresh one. Returns the object's ID.
    pub fn add(&mut self, mut object: SceneObject) -> ObjectId {
        if object.id == ObjectId::unassigned() || self.id_index.contains_key(&object.id) {
            object.id = ObjectId::with_prefix(object.kind.type_name());
        }
        let id = object.id;
        let idx = self.arena.add_node(object);
        self.order.push(idx);
        self.id_index.insert(id, idx);
        id
    }

    /// Insert at a stacking position (clamped to the top).
    pub fn insert_at(&mut self, index: usize, object: SceneObject) -> ObjectId {
        let id = self.add(object);
        if let Some(idx) = self.order.pop() {
            self.order.insert(index.min(self.order.len()), idx);
        }
        id
    }

    /// Remove an object, keeping the order and `id_index` synchronized.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let idx = self.id_index.remove(&id)?;
        self.order.retain(|&i| i != idx);
        self.arena.remove_node(idx)
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.order.clear();
        self.id_index.clear();
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.id_index.get(&id).map(|idx| &self.arena[*idx])
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.id_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.arena[idx])
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.id_index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Objects in stacking order, bottom first.
    pub fn objects(&self) -> impl DoubleEndedIterator<Item = &SceneObject> + '_ {
        self.order.iter().map(|idx| &self.arena[*idx])
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        self.objects().map(|obj| obj.id).collect()
    }

    /// Stacking position of an object (0 = bottom).
    pub fn z_index(&self, id: ObjectId) -> Option<usize> {
        let idx = self.id_index.get(&id)?;
        self.order.iter().position(|i| i == idx)
    }

    /// The workspace object (named `clip`).
    pub fn workspace(&self) -> Option<&SceneObject> {
        self.objects().find(|obj| obj.is_workspace())
    }

    /// Move one step toward the top. Returns true if the order changed.
    pub fn bring_forward(&mut self, id: ObjectId) -> bool {
        match self.z_index(id) {
            Some(pos) if pos + 1 < self.order.len() => {
                self.order.swap(pos, pos + 1);
                true
            }
            _ => false,
        }
    }

    /// Move one step toward the bottom. Returns true if the order changed.
    pub fn send_backwards(&mut self, id: ObjectId) -> bool {
        match self.z_index(id) {
            Some(pos) if pos > 0 => {
                self.order.swap(pos, pos - 1);
                true
            }
            _ => false,
        }
    }

    /// Move to the bottom of the stack.
    pub fn send_to_back(&mut self, id: ObjectId) -> bool {
        match self.z_index(id) {
            Some(pos) if pos > 0 => {
                let idx = self.order.remove(pos);
                self.order.insert(0, idx);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::{self, ShapeStyle};

    fn scene_with_three() -> (Scene, ObjectId, ObjectId, ObjectId) {
        let mut scene = Scene::new();
        let ws = scene.add(presets::workspace(900.0, 1200.0));
        let a = scene.add(presets::rectangle(&ShapeStyle::default()));
        let b = scene.add(presets::circle(&ShapeStyle::default()));
        (scene, ws, a, b)
    }

    #[test]
    fn add_get_remove() {
        let (mut scene, ws, a, _) = scene_with_three();
        assert_eq!(scene.len(), 3);
        assert_eq!(scene.workspace().map(|w| w.id), Some(ws));

        let removed = scene.remove(a).unwrap();
        assert_eq!(removed.id, a);
        assert!(scene.get(a).is_none());
        assert_eq!(scene.len(), 2);
        // Removing again is a no-op.
        assert!(scene.remove(a).is_none());
    }

    #[test]
    fn z_order_steps() {
        let (mut scene, ws, a, b) = scene_with_three();
        assert_eq!(scene.ids(), vec![ws, a, b]);

        assert!(scene.bring_forward(a));
        assert_eq!(scene.ids(), vec![ws, b, a]);
        assert!(!scene.bring_forward(a), "already on top");

        assert!(scene.send_backwards(a));
        assert!(scene.send_backwards(a));
        assert_eq!(scene.ids(), vec![a, ws, b]);

        assert!(scene.send_to_back(ws));
        assert_eq!(scene.ids(), vec![ws, a, b]);
    }

    #[test]
    fn insert_at_position() {
        let (mut scene, ws, a, b) = scene_with_three();
        let c = scene.insert_at(1, presets::diamond(&ShapeStyle::default()));
        assert_eq!(scene.ids(), vec![ws, c, a, b]);
        let d = scene.insert_at(99, presets::triangle(&ShapeStyle::default()));
        assert_eq!(scene.z_index(d), Some(4));
    }

    #[test]
    fn duplicate_ids_are_reassigned() {
        let mut scene = Scene::new();
        let rect = presets::rectangle(&ShapeStyle::default());
        let first = scene.add(rect.clone());
        let second = scene.add(rect);
        assert_ne!(first, second);
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn rejected_snapshot_builds_nothing() {
        let snapshot = Snapshot {
            objects: vec![presets::rectangle(&ShapeStyle::default())],
        };
        assert!(matches!(
            Scene::from_snapshot(snapshot),
            Err(CodecError::MissingWorkspace)
        ));
    }
}
