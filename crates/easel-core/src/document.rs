//! Snapshots and the persisted document format.
//!
//! A `Snapshot` is the canonical, allow-list-restricted description of a
//! scene. History keeps snapshots as compact MessagePack bytes; the
//! `Document` envelope is the JSON form written to storage and files.

use crate::error::CodecError;
use crate::id::ObjectId;
use crate::model::{MetaKey, SceneObject};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Current document format version.
pub const DOCUMENT_VERSION: &str = "1";

/// Type tags a document may carry (`text` / `i-text` are legacy aliases
/// for `textbox`).
const KNOWN_TYPES: [&str; 9] = [
    "rect", "triangle", "polygon", "ellipse", "textbox", "text", "i-text", "image", "path",
];

// ─── Allow-list ──────────────────────────────────────────────────────────

/// Optional metadata keys retained in snapshots. Geometry and style are
/// always kept; this only governs `ObjectMeta`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    keys: SmallVec<[MetaKey; 8]>,
}

impl AllowList {
    pub const ALL: [MetaKey; 7] = [
        MetaKey::Name,
        MetaKey::Selectable,
        MetaKey::HasControls,
        MetaKey::Editable,
        MetaKey::LinkData,
        MetaKey::ExtensionType,
        MetaKey::Extension,
    ];

    pub fn new(keys: impl IntoIterator<Item = MetaKey>) -> Self {
        let mut list = SmallVec::new();
        for key in keys {
            if !list.contains(&key) {
                list.push(key);
            }
        }
        Self { keys: list }
    }

    pub fn keys(&self) -> &[MetaKey] {
        &self.keys
    }

    pub fn allows(&self, key: MetaKey) -> bool {
        self.keys.contains(&key)
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(Self::ALL)
    }
}

// ─── Snapshot ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Objects in stacking order, bottom first.
    pub objects: Vec<SceneObject>,
}

impl Snapshot {
    pub fn workspace(&self) -> Option<&SceneObject> {
        self.objects.iter().find(|obj| obj.is_workspace())
    }

    /// A loadable snapshot carries exactly one workspace.
    pub fn validate(&self) -> Result<(), CodecError> {
        validate_objects(&self.objects)
    }

    /// Recompute derived text layout for every text object.
    pub fn normalize(&mut self) {
        for obj in &mut self.objects {
            if let Some(text) = obj.text_mut() {
                text.normalize();
            }
        }
    }

    /// Give every object that has no ID yet a fresh one.
    pub fn assign_ids(&mut self) {
        for obj in &mut self.objects {
            if obj.id == ObjectId::unassigned() {
                obj.id = ObjectId::with_prefix(obj.kind.type_name());
            }
        }
    }

    /// Compact binary form used for history entries. Field names are kept
    /// so that flattened records decode unambiguously. Unlike the JSON
    /// document, object IDs are carried so a replay restores the same IDs.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let ids = self.objects.iter().map(|obj| obj.id.as_str()).collect();
        let encoded = EncodedRef {
            ids,
            objects: &self.objects,
        };
        Ok(rmp_serde::to_vec_named(&encoded)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let Encoded { ids, mut objects } = rmp_serde::from_slice(bytes)?;
        for (obj, id) in objects.iter_mut().zip(&ids) {
            obj.id = ObjectId::intern(id);
        }
        Ok(Snapshot { objects })
    }
}

#[derive(Serialize)]
struct EncodedRef<'a> {
    ids: Vec<&'a str>,
    objects: &'a [SceneObject],
}

#[derive(Deserialize)]
struct Encoded {
    ids: Vec<String>,
    objects: Vec<SceneObject>,
}

// ─── Document ────────────────────────────────────────────────────────────

fn default_version() -> String {
    DOCUMENT_VERSION.to_string()
}

/// Persisted document: the snapshot objects plus the workspace summary.
/// Unknown top-level keys are ignored on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default = "default_version")]
    pub version: String,
    pub objects: Vec<SceneObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl Document {
    /// Build a document from a snapshot. Text layout is normalized first so
    /// that writing the same content twice yields identical bytes.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, CodecError> {
        snapshot.validate()?;
        let mut snapshot = snapshot.clone();
        snapshot.normalize();

        let (background, width, height) = match snapshot.workspace() {
            Some(ws) => {
                let (w, h) = ws.scaled_size();
                (ws.fill.clone(), w, h)
            }
            None => (None, 0.0, 0.0),
        };

        Ok(Document {
            version: DOCUMENT_VERSION.to_string(),
            objects: snapshot.objects,
            background,
            width,
            height,
        })
    }

    /// Text layout is recomputed, so documents saved without derived
    /// heights load with measurable text. Objects get fresh IDs.
    pub fn into_snapshot(self) -> Snapshot {
        let mut snapshot = Snapshot {
            objects: self.objects,
        };
        snapshot.normalize();
        snapshot.assign_ids();
        snapshot
    }

    /// Pretty JSON, tab-indented.
    pub fn to_json_pretty(&self) -> Result<String, CodecError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(String::from_utf8(buf)?)
    }

    /// Compact JSON, as handed to the persistence callback.
    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate a document. Objects with an unknown `type` and
    /// documents without exactly one workspace are rejected.
    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let objects = value
            .get("objects")
            .and_then(|objects| objects.as_array())
            .ok_or(CodecError::MissingObjects)?;

        for object in objects {
            match object.get("type").and_then(|t| t.as_str()) {
                Some(tag) if KNOWN_TYPES.contains(&tag) => {}
                Some(tag) => return Err(CodecError::UnsupportedObject(tag.to_string())),
                None => return Err(CodecError::UnsupportedObject(String::new())),
            }
        }

        let document: Document = serde_json::from_value(value)?;
        validate_objects(&document.objects)?;
        log::debug!(
            "parsed document v{} with {} objects",
            document.version,
            document.objects.len()
        );
        Ok(document)
    }
}

fn validate_objects(objects: &[SceneObject]) -> Result<(), CodecError> {
    match objects.iter().filter(|obj| obj.is_workspace()).count() {
        1 => Ok(()),
        0 => Err(CodecError::MissingWorkspace),
        n => Err(CodecError::DuplicateWorkspace(n)),
    }
}
