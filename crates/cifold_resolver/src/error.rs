//! Error types for resolution.

use std::path::{Path, PathBuf};

use cifold_fragment::FragmentError;
use thiserror::Error;

/// Result type alias for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors that abort a resolution call.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Reference cycle detected: {}", display_chain(.cycle_paths))]
    Cycle {
        /// Repeated file through the current one, plus the repeated file again.
        cycle_paths: Vec<PathBuf>,
        /// Files being resolved when the cycle was found, root first.
        chain: Vec<PathBuf>,
    },

    #[error(
        "Maximum reference depth {limit} exceeded at {path} (via {})",
        display_chain(.chain)
    )]
    DepthExceeded {
        limit: usize,
        path: PathBuf,
        chain: Vec<PathBuf>,
    },

    #[error("{}", display_read(.path, .referrer.as_deref(), .source))]
    Read {
        /// Fragment that could not be read.
        path: PathBuf,
        /// File holding the Reference or Inclusion that pointed at `path`.
        referrer: Option<PathBuf>,
        /// Files being resolved when the read failed, root first.
        chain: Vec<PathBuf>,
        #[source]
        source: FragmentError,
    },

    #[error("Configuration error in {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl ResolveError {
    /// Chain of files leading to the failure, root first.
    pub fn chain(&self) -> &[PathBuf] {
        match self {
            Self::Cycle { chain, .. }
            | Self::DepthExceeded { chain, .. }
            | Self::Read { chain, .. } => chain.as_slice(),
            Self::Config { .. } => &[],
        }
    }

    /// File at the point of failure.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Cycle { cycle_paths, .. } => cycle_paths.last().map(PathBuf::as_path),
            Self::DepthExceeded { path, .. } | Self::Read { path, .. } | Self::Config { path, .. } => {
                Some(path.as_path())
            }
        }
    }
}

/// Render a path chain as `a.yml -> b.yml -> a.yml`.
pub fn display_chain(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn display_read(path: &Path, referrer: Option<&Path>, source: &FragmentError) -> String {
    match referrer {
        Some(referrer) => format!(
            "Failed to read {} (referenced from {}): {}",
            path.display(),
            referrer.display(),
            source
        ),
        None => format!("Failed to read {}: {}", path.display(), source),
    }
}
