//! Per-call resolution state.

use std::path::{Path, PathBuf};

use cifold_fragment::Mapping;
use uuid::Uuid;

use crate::cache::ResolutionCache;
use crate::variables::Variables;

/// State threaded through one resolution call.
///
/// Each recursive step works on a derived copy: [`enter`](Self::enter)
/// extends the file stack, [`with_params`](Self::with_params) overlays
/// variables. Only the cache is shared between copies.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    /// Identifier of the top-level call, for log correlation.
    pub session_id: Uuid,
    /// File whose content is being resolved.
    pub current_file: PathBuf,
    /// Absolute directory bare targets are resolved against.
    pub base_directory: PathBuf,
    /// Absolute paths of the files being resolved, root first.
    pub file_stack: Vec<PathBuf>,
    /// Variables visible to placeholders.
    pub variables: Variables,
    /// Shared cache.
    pub cache: ResolutionCache,
}

impl ResolutionContext {
    /// Context for resolving `root`. The stack starts empty; `root` is pushed
    /// when the engine enters it.
    pub fn new(
        root: impl Into<PathBuf>,
        base_directory: impl Into<PathBuf>,
        variables: Variables,
        cache: ResolutionCache,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            current_file: root.into(),
            base_directory: base_directory.into(),
            file_stack: Vec::new(),
            variables,
            cache,
        }
    }

    /// Copy of this context positioned inside `path`.
    pub fn enter(&self, path: &Path) -> Self {
        let mut file_stack = self.file_stack.clone();
        file_stack.push(path.to_path_buf());
        Self {
            session_id: self.session_id,
            current_file: path.to_path_buf(),
            base_directory: self.base_directory.clone(),
            file_stack,
            variables: self.variables.clone(),
            cache: self.cache.clone(),
        }
    }

    /// Copy of this context with `params` overlaid on the variables.
    pub fn with_params(&self, params: &Mapping) -> Self {
        Self {
            variables: self.variables.overlay(params),
            ..self.clone()
        }
    }

    /// Depth of the reference chain.
    pub fn depth(&self) -> usize {
        self.file_stack.len()
    }

    /// Index of `path` on the stack, if it is being resolved already.
    pub fn stack_position(&self, path: &Path) -> Option<usize> {
        self.file_stack.iter().position(|p| p == path)
    }

    /// File holding the node being resolved, if any.
    pub fn referrer(&self) -> Option<&Path> {
        self.file_stack.last().map(PathBuf::as_path)
    }
}
