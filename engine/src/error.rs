//! Error types for the depot engine.

use thiserror::Error;

/// All possible errors from the depot engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("duplicate field name: {0}")]
    DuplicateField(String),

    #[error("field '{name}' could not be serialized to JSON: {source}")]
    JsonSerialization {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown field kind: {0}")]
    UnknownFieldKind(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
