//! Engine configuration.
//!
//! [`ResolverConfig`] is built in code or loaded from a `cifold.yaml`
//! project file through [`ProjectConfig`]:
//!
//! ```yaml
//! base_directory: templates
//! max_depth: 10
//! cache_across_calls: true
//! variables:
//!   org: acme
//!   inputs:
//!     node_version: "20"
//! output:
//!   directory: .ci/generated
//!   format: yaml
//!   provenance: true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use cifold_fragment::{node_from_yaml, Node};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ResolveError, ResolveResult};
use crate::variables::Variables;

/// Default bound on reference chain length.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Project file name looked up by callers.
pub const PROJECT_FILE: &str = "cifold.yaml";

/// Configuration of a [`ResolutionEngine`](crate::ResolutionEngine).
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Directory non-`./` relative fragment paths are resolved against.
    pub base_directory: PathBuf,
    /// Longest allowed chain of nested references.
    pub max_depth: usize,
    /// Initial variable environment.
    pub variables: Variables,
    /// Keep the engine's cache between `resolve_root` calls.
    pub cache_across_calls: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_directory: PathBuf::from("."),
            max_depth: DEFAULT_MAX_DEPTH,
            variables: Variables::new(),
            cache_across_calls: false,
        }
    }
}

impl ResolverConfig {
    pub fn new(base_directory: impl Into<PathBuf>) -> Self {
        Self {
            base_directory: base_directory.into(),
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<Node>) -> Self {
        self.variables.insert(key, value);
        self
    }

    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    pub fn cache_across_calls(mut self, enabled: bool) -> Self {
        self.cache_across_calls = enabled;
        self
    }
}

/// Output section of the project file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Directory generated documents are written to.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// `yaml` or `json`.
    #[serde(default)]
    pub format: Option<String>,
    /// Prefix YAML output with provenance comments.
    #[serde(default)]
    pub provenance: Option<bool>,
}

/// Contents of a `cifold.yaml` project file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub base_directory: Option<PathBuf>,
    #[serde(default)]
    pub max_depth: Option<usize>,
    #[serde(default)]
    pub cache_across_calls: Option<bool>,
    #[serde(default)]
    pub variables: serde_yaml::Value,
    #[serde(default)]
    pub output: OutputSettings,
}

impl ProjectConfig {
    /// Load a project file.
    pub fn load(path: impl AsRef<Path>) -> ResolveResult<Self> {
        let path = path.as_ref();
        debug!("Loading project config from {:?}", path);

        let content = fs::read_to_string(path).map_err(|e| config_error(path, e))?;
        Self::from_yaml(&content, path)
    }

    /// Parse project file content; `path` is used for error messages.
    pub fn from_yaml(content: &str, path: &Path) -> ResolveResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| config_error(path, e))
    }

    /// Build the engine configuration. A relative `base_directory` is taken
    /// relative to `project_dir`.
    pub fn resolver_config(&self, project_dir: &Path) -> ResolveResult<ResolverConfig> {
        let base_directory = match &self.base_directory {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => project_dir.join(dir),
            None => project_dir.to_path_buf(),
        };

        let variables = match node_from_yaml(self.variables.clone(), Path::new(PROJECT_FILE))
            .map_err(|e| config_error(Path::new(PROJECT_FILE), e))?
        {
            Node::Mapping(mapping) => Variables::from_mapping(mapping),
            node if node.is_null() => Variables::new(),
            other => {
                return Err(ResolveError::Config {
                    path: PathBuf::from(PROJECT_FILE),
                    message: format!("`variables` must be a mapping, found {}", other.kind_name()),
                })
            }
        };

        Ok(ResolverConfig {
            base_directory,
            max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
            variables,
            cache_across_calls: self.cache_across_calls.unwrap_or(true),
        })
    }
}

fn config_error(path: &Path, error: impl std::fmt::Display) -> ResolveError {
    ResolveError::Config {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}
