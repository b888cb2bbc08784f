//! Fragment reader trait and the filesystem implementation.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::convert::parse_fragment;
use crate::error::{FragmentError, FragmentResult};
use crate::node::Node;

/// A parsed fragment: its raw tree and the paths it declares dependencies on.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFragment {
    /// Raw tree, possibly containing Reference and Inclusion nodes.
    pub root: Node,
    /// Reference/Inclusion targets as written, in document order, without duplicates.
    pub dependencies: Vec<String>,
}

impl ParsedFragment {
    pub fn new(root: Node) -> Self {
        Self {
            root,
            dependencies: Vec::new(),
        }
    }
}

/// Turns a fragment file into a node tree.
///
/// The resolver awaits this once per file it needs; implementations decide
/// where content comes from.
#[async_trait]
pub trait FragmentReader: Send + Sync {
    /// Parse the fragment at `path`.
    async fn parse(&self, path: &Path) -> FragmentResult<ParsedFragment>;
}

/// Reads fragments from the filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsFragmentReader;

impl FsFragmentReader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FragmentReader for FsFragmentReader {
    async fn parse(&self, path: &Path) -> FragmentResult<ParsedFragment> {
        debug!("Reading fragment {:?}", path);

        let content = tokio::fs::read_to_string(path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FragmentError::NotFound(path.to_path_buf())
            } else {
                FragmentError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        parse_fragment(&content, path)
    }
}
