//! In-memory fragment reader.
//!
//! Holds fragment sources keyed by path and counts how often each path is
//! parsed, so callers can verify how many reads a resolution performed
//! without touching the filesystem.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::convert::parse_fragment;
use crate::error::{FragmentError, FragmentResult};
use crate::reader::{FragmentReader, ParsedFragment};

/// Fragment reader backed by a map of path to YAML source.
#[derive(Clone, Default)]
pub struct MemoryFragmentReader {
    /// Fragment sources.
    fragments: Arc<RwLock<HashMap<PathBuf, String>>>,
    /// Parse calls per path, including failed ones.
    reads: Arc<RwLock<HashMap<PathBuf, usize>>>,
    /// Parse calls overall.
    total_reads: Arc<AtomicUsize>,
}

impl MemoryFragmentReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fragment source.
    pub fn with_fragment(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    /// Add or replace a fragment source.
    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.fragments.write().insert(path.into(), content.into());
    }

    /// Number of parse calls made for `path`.
    pub fn read_count(&self, path: impl AsRef<Path>) -> usize {
        self.reads.read().get(path.as_ref()).copied().unwrap_or(0)
    }

    /// Number of parse calls made overall.
    pub fn total_reads(&self) -> usize {
        self.total_reads.load(Ordering::SeqCst)
    }

    /// Forget recorded reads.
    pub fn reset_counts(&self) {
        self.reads.write().clear();
        self.total_reads.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl FragmentReader for MemoryFragmentReader {
    async fn parse(&self, path: &Path) -> FragmentResult<ParsedFragment> {
        *self.reads.write().entry(path.to_path_buf()).or_insert(0) += 1;
        self.total_reads.fetch_add(1, Ordering::SeqCst);

        let content = self
            .fragments
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| FragmentError::NotFound(path.to_path_buf()))?;

        parse_fragment(&content, path)
    }
}
