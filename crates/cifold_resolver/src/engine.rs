//! Resolution engine.
//!
//! The engine walks a fragment graph from a root file, replacing every
//! Reference and Inclusion with the resolved content of its target:
//!
//! 1. return a cached result for (path, variables) if there is one
//! 2. reject the path if it is already on the file stack (cycle)
//! 3. reject the path if the stack is deeper than `max_depth`
//! 4. parse the file (once per cache lifetime)
//! 5. resolve children in document order
//! 6. cache and return the result
//!
//! Recursion goes through boxed futures: the reader is async, and every
//! level may await it.

use std::path::Path;
use std::sync::Arc;

use cifold_fragment::{FragmentReader, Inclusion, Mapping, Node, Reference, Scalar};
use futures_util::future::{BoxFuture, FutureExt};
use tracing::{debug, info, info_span, Instrument};

use crate::cache::{CacheKey, ResolutionCache};
use crate::config::ResolverConfig;
use crate::context::ResolutionContext;
use crate::error::{ResolveError, ResolveResult};
use crate::interpolate::Interpolator;
use crate::merge::merge;
use crate::paths;

/// Fully resolved root fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDocument {
    /// Absolute path of the root fragment.
    pub source: std::path::PathBuf,
    /// Resolved tree; contains no Reference or Inclusion.
    pub root: Node,
}

/// Resolves fragment graphs into single trees.
pub struct ResolutionEngine {
    reader: Arc<dyn FragmentReader>,
    config: ResolverConfig,
    cache: ResolutionCache,
    interpolator: Interpolator,
}

impl ResolutionEngine {
    /// Create an engine with its own cache.
    pub fn new(reader: Arc<dyn FragmentReader>, config: ResolverConfig) -> Self {
        Self {
            reader,
            config,
            cache: ResolutionCache::new(),
            interpolator: Interpolator::new(),
        }
    }

    /// Use a caller-owned cache, e.g. one shared by several engines.
    pub fn with_cache(mut self, cache: ResolutionCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The engine's cache. Only consulted by `resolve_root` when
    /// `cache_across_calls` is set.
    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Resolve a root fragment with the configured variables.
    pub async fn resolve_root(&self, path: impl AsRef<Path>) -> ResolveResult<ResolvedDocument> {
        let base = paths::absolute(&self.config.base_directory).map_err(|e| {
            ResolveError::Config {
                path: self.config.base_directory.clone(),
                message: format!("cannot make the base directory absolute: {}", e),
            }
        })?;
        let source = paths::root_path(path.as_ref(), &base);
        let cache = if self.config.cache_across_calls {
            self.cache.clone()
        } else {
            ResolutionCache::new()
        };

        let ctx = ResolutionContext::new(
            source.clone(),
            base,
            self.config.variables.clone(),
            cache,
        );
        let span = info_span!("resolve", session = %ctx.session_id, root = %source.display());

        let root = self.resolve(&source, &ctx).instrument(span).await?;

        let stats = ctx.cache.stats();
        info!(
            "Resolved {} ({} files parsed, {} cache hits)",
            source.display(),
            stats.parsed,
            stats.hits
        );

        Ok(ResolvedDocument { source, root })
    }

    /// Resolve the fragment at `path` under `ctx`.
    ///
    /// `ctx.file_stack` holds the files currently being resolved, not
    /// including `path`.
    pub fn resolve<'a>(
        &'a self,
        path: &'a Path,
        ctx: &'a ResolutionContext,
    ) -> BoxFuture<'a, ResolveResult<Node>> {
        async move {
            let path = paths::normalize(path);
            let key = CacheKey::new(&path, &ctx.variables);

            if let Some(hit) = ctx.cache.resolved(&key) {
                debug!("Cache hit for {:?}", path);
                return Ok(hit);
            }

            if let Some(position) = ctx.stack_position(&path) {
                let mut cycle_paths = ctx.file_stack[position..].to_vec();
                cycle_paths.push(path);
                return Err(ResolveError::Cycle {
                    cycle_paths,
                    chain: ctx.file_stack.clone(),
                });
            }

            if ctx.depth() > self.config.max_depth {
                return Err(ResolveError::DepthExceeded {
                    limit: self.config.max_depth,
                    path,
                    chain: ctx.file_stack.clone(),
                });
            }

            let raw = self.load(&path, ctx).await?;
            let inner = ctx.enter(&path);
            let resolved = self.resolve_node(raw, &inner).await?;

            ctx.cache.store_resolved(key, resolved.clone());
            Ok(resolved)
        }
        .boxed()
    }

    /// Raw tree for `path`, from the cache or the reader.
    async fn load(&self, path: &Path, ctx: &ResolutionContext) -> ResolveResult<Node> {
        if let Some(raw) = ctx.cache.parsed(path) {
            return Ok(raw);
        }

        debug!("Reading {:?} at depth {}", path, ctx.depth());
        let parsed = self
            .reader
            .parse(path)
            .await
            .map_err(|source| ResolveError::Read {
                path: path.to_path_buf(),
                referrer: ctx.referrer().map(Path::to_path_buf),
                chain: ctx.file_stack.clone(),
                source,
            })?;

        ctx.cache.store_parsed(path, parsed.root.clone());
        Ok(parsed.root)
    }

    /// Resolve one node of the file `ctx.current_file`.
    fn resolve_node<'a>(
        &'a self,
        node: Node,
        ctx: &'a ResolutionContext,
    ) -> BoxFuture<'a, ResolveResult<Node>> {
        async move {
            match node {
                Node::Scalar(Scalar::String(text)) => {
                    Ok(self.interpolator.interpolate(&text, &ctx.variables))
                }
                Node::Scalar(scalar) => Ok(Node::Scalar(scalar)),
                Node::Sequence(items) => self.resolve_sequence(items, ctx).await,
                Node::Mapping(entries) => self.resolve_mapping(entries, ctx).await,
                Node::Reference(reference) => self.resolve_reference(&reference, ctx).await,
                Node::Inclusion(inclusion) => self.resolve_inclusion(&inclusion, ctx).await,
            }
        }
        .boxed()
    }

    async fn resolve_sequence(
        &self,
        items: Vec<Node>,
        ctx: &ResolutionContext,
    ) -> ResolveResult<Node> {
        let mut resolved = Vec::with_capacity(items.len());

        for item in items {
            match item {
                // Merging inclusions of step lists splice their elements in place.
                Node::Inclusion(inclusion) if inclusion.merge => {
                    match self.resolve_inclusion(&inclusion, ctx).await? {
                        Node::Sequence(inner) => resolved.extend(inner),
                        other => resolved.push(other),
                    }
                }
                other => resolved.push(self.resolve_node(other, ctx).await?),
            }
        }

        Ok(Node::Sequence(resolved))
    }

    async fn resolve_mapping(
        &self,
        entries: Mapping,
        ctx: &ResolutionContext,
    ) -> ResolveResult<Node> {
        let mut base: Option<Node> = None;
        let mut own = Mapping::with_capacity(entries.len());

        for (key, value) in entries {
            match value {
                Node::Inclusion(inclusion) if inclusion.merge => {
                    let content = self.resolve_inclusion(&inclusion, ctx).await?;
                    if content.is_mapping() {
                        debug!("Merging {} into {:?}", inclusion.path, ctx.current_file);
                        base = Some(match base {
                            Some(layer) => merge(&layer, &content),
                            None => content,
                        });
                    } else {
                        own.insert(key, content);
                    }
                }
                other => {
                    let resolved = self.resolve_node(other, ctx).await?;
                    own.insert(key, resolved);
                }
            }
        }

        // Included content is the base layer; the mapping's own keys go on top.
        Ok(match base {
            Some(layer) => merge(&layer, &Node::Mapping(own)),
            None => Node::Mapping(own),
        })
    }

    async fn resolve_reference(
        &self,
        reference: &Reference,
        ctx: &ResolutionContext,
    ) -> ResolveResult<Node> {
        let target = paths::target_path(
            &reference.path,
            &ctx.current_file,
            &ctx.base_directory,
        );

        let target_ctx = if reference.params.is_empty() {
            ctx.clone()
        } else {
            // Params are evaluated where the reference is written.
            let params = match self
                .resolve_node(Node::Mapping(reference.params.clone()), ctx)
                .await?
            {
                Node::Mapping(params) => params,
                _ => Mapping::new(),
            };
            ctx.with_params(&params)
        };

        self.resolve(&target, &target_ctx).await
    }

    async fn resolve_inclusion(
        &self,
        inclusion: &Inclusion,
        ctx: &ResolutionContext,
    ) -> ResolveResult<Node> {
        let target = paths::target_path(
            &inclusion.path,
            &ctx.current_file,
            &ctx.base_directory,
        );
        self.resolve(&target, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cifold_fragment::MemoryFragmentReader;
    use std::path::PathBuf;

    fn engine(reader: &MemoryFragmentReader) -> ResolutionEngine {
        ResolutionEngine::new(Arc::new(reader.clone()), ResolverConfig::new("/tpl"))
    }

    #[tokio::test]
    async fn test_plain_file_unchanged() {
        let source = "name: ci\non: [push]\njobs:\n  lint:\n    steps:\n      - run: make lint\n";
        let reader = MemoryFragmentReader::new().with_fragment("/tpl/ci.yml", source);
        let expected = cifold_fragment::parse_fragment(source, Path::new("/tpl/ci.yml"))
            .unwrap()
            .root;

        let doc = engine(&reader).resolve_root("ci.yml").await.unwrap();
        assert_eq!(doc.source, PathBuf::from("/tpl/ci.yml"));
        assert_eq!(doc.root, expected);
    }

    #[tokio::test]
    async fn test_self_cycle() {
        let reader =
            MemoryFragmentReader::new().with_fragment("/tpl/a.yml", "again: !reference a.yml\n");

        let err = engine(&reader).resolve_root("a.yml").await.unwrap_err();
        match err {
            ResolveError::Cycle { cycle_paths, .. } => assert_eq!(
                cycle_paths,
                vec![PathBuf::from("/tpl/a.yml"), PathBuf::from("/tpl/a.yml")]
            ),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_include_in_sequence_splices_with_merge() {
        let reader = MemoryFragmentReader::new()
            .with_fragment(
                "/tpl/job.yml",
                "steps:\n  - checkout\n  - !include { path: steps/test.yml, merge: true }\n  - deploy\n",
            )
            .with_fragment("/tpl/steps/test.yml", "- lint\n- test\n");

        let doc = engine(&reader).resolve_root("job.yml").await.unwrap();
        assert_eq!(
            doc.root.get("steps"),
            Some(&Node::sequence(["checkout", "lint", "test", "deploy"]))
        );
    }

    #[tokio::test]
    async fn test_include_without_merge_nests() {
        let reader = MemoryFragmentReader::new()
            .with_fragment("/tpl/job.yml", "steps: !include steps/test.yml\n")
            .with_fragment("/tpl/steps/test.yml", "- lint\n- test\n");

        let doc = engine(&reader).resolve_root("job.yml").await.unwrap();
        assert_eq!(doc.root.get("steps"), Some(&Node::sequence(["lint", "test"])));
    }

    #[tokio::test]
    async fn test_params_are_interpolated_in_referrer() {
        let reader = MemoryFragmentReader::new()
            .with_fragment(
                "/tpl/ci.yml",
                "job: !reference { path: job.yml, params: { image: \"node:${version}\" } }\n",
            )
            .with_fragment("/tpl/job.yml", "image: ${image}\n");

        let engine = ResolutionEngine::new(
            Arc::new(reader),
            ResolverConfig::new("/tpl").with_variable("version", "20"),
        );

        let doc = engine.resolve_root("ci.yml").await.unwrap();
        assert_eq!(
            doc.root,
            Node::mapping([("job", Node::mapping([("image", "node:20")]))])
        );
    }
}
