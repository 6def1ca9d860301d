use crate::config::ConfigError;
use easel_core::CodecError;
use easel_render::ExportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to load image {uri}: {reason}")]
    ImageLoad { uri: String, reason: String },

    #[error("scene has no workspace")]
    MissingWorkspace,

    #[error("persist failed: {0}")]
    Persist(String),
}
