pub mod color;
pub mod document;
pub mod error;
pub mod filters;
pub mod id;
pub mod model;
pub mod presets;
pub mod scene;

pub use color::{Color, PALETTE};
pub use document::{AllowList, DOCUMENT_VERSION, Document, Snapshot};
pub use error::CodecError;
pub use filters::{FILTER_NAMES, ImageFilter};
pub use id::ObjectId;
pub use model::*;
pub use scene::Scene;

// Re-export kurbo geometry so downstream crates share one version
pub use kurbo::{Affine, Point, Rect};
