//! Resolution cache.
//!
//! Two tables share one handle:
//!
//! - parsed fragments, keyed by absolute path, so a file is read from the
//!   [`FragmentReader`](cifold_fragment::FragmentReader) at most once while
//!   the cache lives;
//! - resolved nodes, keyed by absolute path *and* the variable environment
//!   they were resolved under, so the same fragment referenced with different
//!   params never reuses the wrong result.
//!
//! The handle is cheap to clone; clones share storage. Whoever creates the
//! engine decides its lifetime: a fresh cache per call isolates tests, a
//! retained one serves a whole build session.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cifold_fragment::Node;
use parking_lot::RwLock;

use crate::variables::Variables;

/// Key of a resolved entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub path: PathBuf,
    pub fingerprint: String,
}

impl CacheKey {
    pub fn new(path: &Path, variables: &Variables) -> Self {
        Self {
            path: path.to_path_buf(),
            fingerprint: variables.fingerprint(),
        }
    }
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub parsed: usize,
    pub resolved: usize,
}

#[derive(Default)]
struct CacheInner {
    parsed: RwLock<HashMap<PathBuf, Node>>,
    resolved: RwLock<HashMap<CacheKey, Node>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

/// Shared cache of parsed and resolved fragments.
#[derive(Clone, Default)]
pub struct ResolutionCache {
    inner: Arc<CacheInner>,
}

impl std::fmt::Debug for ResolutionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionCache")
            .field("stats", &self.stats())
            .finish()
    }
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw parsed tree for `path`, if it was read before.
    pub fn parsed(&self, path: &Path) -> Option<Node> {
        self.inner.parsed.read().get(path).cloned()
    }

    pub fn store_parsed(&self, path: &Path, node: Node) {
        self.inner.parsed.write().insert(path.to_path_buf(), node);
    }

    /// Resolved tree for `key`, counting the lookup as a hit or miss.
    pub fn resolved(&self, key: &CacheKey) -> Option<Node> {
        let found = self.inner.resolved.read().get(key).cloned();
        let counter = if found.is_some() {
            &self.inner.hits
        } else {
            &self.inner.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Store a resolved tree. A second store for the same key overwrites
    /// with an identical value.
    pub fn store_resolved(&self, key: CacheKey, node: Node) {
        self.inner.resolved.write().insert(key, node);
    }

    /// Drop every entry and reset counters.
    pub fn clear(&self) {
        self.inner.parsed.write().clear();
        self.inner.resolved.write().clear();
        self.inner.hits.store(0, Ordering::Relaxed);
        self.inner.misses.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            parsed: self.inner.parsed.read().len(),
            resolved: self.inner.resolved.read().len(),
        }
    }

    /// True when both handles share storage.
    pub fn shares_storage_with(&self, other: &ResolutionCache) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
