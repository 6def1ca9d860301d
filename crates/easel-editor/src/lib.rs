pub mod adapter;
pub mod clipboard;
pub mod config;
pub mod editor;
pub mod error;
pub mod history;
pub mod memory;
pub mod selection;
pub mod style;
pub mod tools;
pub mod viewport;

pub use adapter::{LoadTicket, SceneAdapter, SceneEvent};
pub use config::{ConfigError, EditorConfig};
pub use editor::{Download, EXPORT_BASENAME, Editor, ImageTicket, PersistPayload};
pub use error::EditorError;
pub use history::{History, RecordOutcome, ReplayState};
pub use memory::MemoryScene;
pub use tools::{SELECTION_DEPENDENT_TOOLS, Tool};

// Re-export so hosts only need this crate for export formats
pub use easel_render::ExportFormat;
