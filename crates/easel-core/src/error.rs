use thiserror::Error;

/// Failures while encoding, decoding or validating scene data.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document has no `objects` array")]
    MissingObjects,

    #[error("unsupported object type `{0}`")]
    UnsupportedObject(String),

    #[error("document has no workspace object")]
    MissingWorkspace,

    #[error("document has {0} workspace objects, expected exactly one")]
    DuplicateWorkspace(usize),

    #[error("snapshot encode failed: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("snapshot decode failed: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
