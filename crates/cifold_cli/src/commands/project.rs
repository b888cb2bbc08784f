//! Options shared by every command: locating the project file, the
//! templates directory, variables and root fragments.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;
use walkdir::WalkDir;

use cifold_fragment::{node_from_yaml, FsFragmentReader, Node};
use cifold_generator::DocumentKind;
use cifold_resolver::paths::{self, normalize};
use cifold_resolver::{ProjectConfig, ResolutionEngine, ResolverConfig, PROJECT_FILE};

use super::CliError;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Templates directory fragment paths are resolved against
    #[arg(short, long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// Project file (defaults to ./cifold.yaml when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Set a variable; dotted keys create nested mappings (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// Maximum reference depth
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,
}

/// Project file merged with command-line overrides.
#[derive(Debug)]
pub struct Project {
    pub config: ProjectConfig,
    pub resolver: ResolverConfig,
    /// Directory holding the project file, or the working directory.
    pub dir: PathBuf,
}

impl ProjectArgs {
    /// Load the project file and apply command-line overrides on top.
    pub fn load(&self) -> Result<Project> {
        let config_path = match &self.config {
            Some(path) => Some(path.clone()),
            None => {
                let default = PathBuf::from(PROJECT_FILE);
                default.exists().then_some(default)
            }
        };

        let (config, dir) = match config_path {
            Some(path) => {
                let config = ProjectConfig::load(&path)?;
                let dir = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                (config, dir)
            }
            None => (ProjectConfig::default(), PathBuf::from(".")),
        };

        let mut resolver = config.resolver_config(&dir)?;
        if let Some(templates) = &self.templates {
            resolver.base_directory = templates.clone();
        }
        resolver.base_directory = absolute(&resolver.base_directory)?;
        if let Some(max_depth) = self.max_depth {
            resolver.max_depth = max_depth;
        }
        for assignment in &self.vars {
            let (key, value) = parse_var(assignment)?;
            resolver.variables.set_path(&key, value);
        }

        debug!(
            "Templates directory {:?}, max depth {}",
            resolver.base_directory, resolver.max_depth
        );

        Ok(Project {
            config,
            resolver,
            dir,
        })
    }
}

impl Project {
    pub fn base_directory(&self) -> &Path {
        &self.resolver.base_directory
    }

    /// Engine reading fragments from disk.
    pub fn engine(&self) -> ResolutionEngine {
        ResolutionEngine::new(Arc::new(FsFragmentReader::new()), self.resolver.clone())
    }

    /// Absolute root fragments to process: explicit paths, then `pattern`
    /// matches under the templates directory. With neither, every fragment
    /// under `workflows/`. Explicit paths that do not exist as given are
    /// taken relative to the templates directory.
    pub fn roots(&self, explicit: &[PathBuf], pattern: Option<&str>) -> Result<Vec<PathBuf>> {
        let base = self.base_directory();
        let mut roots = Vec::new();
        for path in explicit {
            let root = if path.exists() {
                absolute(path)?
            } else {
                normalize(&base.join(path))
            };
            roots.push(root);
        }

        if let Some(pattern) = pattern {
            let full = base.join(pattern);
            let matches = glob::glob(&full.to_string_lossy()).map_err(|e| {
                CliError::InvalidPattern {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                }
            })?;
            for entry in matches {
                let path = normalize(&entry.context("Failed to read pattern match")?);
                if path.is_file() && !roots.contains(&path) {
                    roots.push(path);
                }
            }
        }

        if explicit.is_empty() && pattern.is_none() {
            roots = fragment_files(&base.join("workflows"));
        }

        if roots.is_empty() {
            return Err(CliError::NoRoots(base.to_path_buf()).into());
        }
        Ok(roots)
    }

    /// Document kind for `source`: the explicit one, else the one implied
    /// by its directory under the templates directory, else a workflow.
    pub fn kind_of(&self, source: &Path, explicit: Option<DocumentKind>) -> DocumentKind {
        explicit
            .or_else(|| DocumentKind::infer(self.relative(source)))
            .unwrap_or(DocumentKind::Workflow)
    }

    /// `path` relative to the templates directory when it lies below it.
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(self.base_directory()).unwrap_or(path)
    }

    /// Output directory from the project file, relative to its directory.
    pub fn output_directory(&self) -> Option<PathBuf> {
        self.config
            .output
            .directory
            .as_ref()
            .map(|dir| self.dir.join(dir))
    }
}

/// `path` made absolute against the working directory.
fn absolute(path: &Path) -> Result<PathBuf> {
    paths::absolute(path).context("Failed to read the working directory")
}

/// YAML fragment files below `dir`, sorted.
pub fn fragment_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("yml") | Some("yaml")
            )
        })
        .collect();
    files.sort();
    files
}

/// Parse `KEY=VALUE`. The value is read as a YAML scalar so that
/// `count=3` yields an integer; anything else stays a string.
pub fn parse_var(assignment: &str) -> Result<(String, Node), CliError> {
    let invalid = || CliError::InvalidVariable(assignment.to_string());

    let (key, raw) = assignment.split_once('=').ok_or_else(invalid)?;
    let key = key.trim();
    if key.is_empty() || key.split('.').any(str::is_empty) {
        return Err(invalid());
    }

    let value = match serde_yaml::from_str::<serde_yaml::Value>(raw) {
        Ok(value @ (serde_yaml::Value::Bool(_) | serde_yaml::Value::Number(_))) => {
            node_from_yaml(value, Path::new("--var")).unwrap_or_else(|_| Node::string(raw))
        }
        _ => Node::string(raw),
    };

    Ok((key.to_string(), value))
}
