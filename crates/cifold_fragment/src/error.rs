//! Error types for fragment reading.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for fragment operations.
pub type FragmentResult<T> = Result<T, FragmentError>;

/// Errors that can occur while reading a fragment.
#[derive(Error, Debug)]
pub enum FragmentError {
    #[error("Fragment not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid !{tag} in {path}: {message}")]
    InvalidTag {
        path: PathBuf,
        tag: String,
        message: String,
    },

    #[error("Unsupported mapping key in {path}: {message}")]
    InvalidKey { path: PathBuf, message: String },
}

impl FragmentError {
    /// Path of the fragment the error belongs to.
    pub fn path(&self) -> &Path {
        let path = match self {
            Self::NotFound(path) => path,
            Self::Io { path, .. }
            | Self::Yaml { path, .. }
            | Self::InvalidTag { path, .. }
            | Self::InvalidKey { path, .. } => path,
        };
        path.as_path()
    }
}
