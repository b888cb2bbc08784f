//! Error types for document generation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for generator operations.
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Errors that can occur while generating a document.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Validation failed for {path}: missing required field `{missing_field}`")]
    Validation { path: PathBuf, missing_field: String },

    #[error("Validation failed for {path}: {message}")]
    InvalidShape { path: PathBuf, message: String },

    #[error("Document {path} still contains an unresolved node at {location}")]
    Unresolved { path: PathBuf, location: String },

    #[error("Unknown document kind: {0}")]
    UnknownKind(String),

    #[error("Unknown output format: {0}")]
    UnknownFormat(String),

    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
