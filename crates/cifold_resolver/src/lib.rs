//! # cifold_resolver
//!
//! Template resolution engine for cifold.
//!
//! Given a root fragment and a variable environment, the engine produces a
//! single tree with every `!reference` and `!include` replaced by the
//! resolved content of its target. It handles:
//!
//! - `${dotted.path}` placeholder substitution
//! - parameterized references with scoped variables
//! - deep merge of included mappings (sequences append)
//! - cycle detection with the full cycle path
//! - a bound on reference depth
//! - memoization through a caller-owned [`ResolutionCache`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cifold_fragment::FsFragmentReader;
//! use cifold_resolver::{ResolutionEngine, ResolverConfig};
//!
//! # async fn run() -> cifold_resolver::ResolveResult<()> {
//! let config = ResolverConfig::new("templates")
//!     .with_variable("org", "acme")
//!     .cache_across_calls(true);
//! let engine = ResolutionEngine::new(Arc::new(FsFragmentReader::new()), config);
//!
//! let doc = engine.resolve_root("workflows/ci.yml").await?;
//! assert!(doc.root.is_resolved());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod interpolate;
pub mod merge;
pub mod paths;
pub mod variables;

pub use cache::{CacheKey, CacheStats, ResolutionCache};
pub use config::{OutputSettings, ProjectConfig, ResolverConfig, DEFAULT_MAX_DEPTH, PROJECT_FILE};
pub use context::ResolutionContext;
pub use engine::{ResolutionEngine, ResolvedDocument};
pub use error::{display_chain, ResolveError, ResolveResult};
pub use interpolate::Interpolator;
pub use merge::{merge, merge_all};
pub use variables::Variables;
