//! Recursive dependency tree construction.
//!
//! The builder resolves a directory, then builds each immediate dependency's
//! subtree from that dependency's own directory. Sibling subtrees are built
//! on a bounded rayon pool and joined in oracle order before being attached
//! to their parent, so a node's `dependencies` go from unresolved straight to
//! fully populated.
//!
//! Shared modules (diamonds) are resolved once per path and duplicated in the
//! output. Real cycles are caught by tracking each branch's ancestry.

pub mod render;

use crate::artifact::{Artifact, DirectoryBinding, format_id};
use crate::error::{Result, TreeError};
use crate::oracle::ModuleOracle;
use crate::resolver::{Resolution, Resolver};
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// What to do when a module depends on one of its own ancestors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    /// Abort the run with the offending chain.
    #[default]
    Error,
    /// Emit the repeated module as a leaf and keep going.
    Prune,
}

#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// Worker threads used to resolve sibling subtrees.
    pub jobs: usize,
    /// Run manifest reconciliation before each listing.
    pub reconcile: bool,
    pub cycles: CyclePolicy,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            jobs: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            reconcile: true,
            cycles: CyclePolicy::default(),
        }
    }
}

/// Identity of a node for cycle detection.
#[derive(Debug, PartialEq, Eq)]
struct NodeKey<'n> {
    name: &'n str,
    version: &'n str,
    dir: &'n Path,
}

/// Path from a top-level module down to the node being built. Lives on the
/// stack of each recursive call and is only ever read, so worker threads
/// can share a parent's chain.
struct Ancestry<'p> {
    key: NodeKey<'p>,
    parent: Option<&'p Ancestry<'p>>,
}

impl Ancestry<'_> {
    fn contains(&self, key: &NodeKey<'_>) -> bool {
        let mut cur = Some(self);
        while let Some(node) = cur {
            if node.key == *key {
                return true;
            }
            cur = node.parent;
        }
        false
    }

    /// Root-first list of `name@version` ids.
    fn chain(&self) -> Vec<String> {
        let mut ids = Vec::new();
        let mut cur = Some(self);
        while let Some(node) = cur {
            ids.push(format_id(node.key.name, node.key.version));
            cur = node.parent;
        }
        ids.reverse();
        ids
    }
}

pub struct TreeBuilder<'a> {
    resolver: Resolver<'a>,
    pool: rayon::ThreadPool,
    cycles: CyclePolicy,
    progress: ProgressBar,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(oracle: &'a dyn ModuleOracle, options: BuildOptions) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.jobs.max(1))
            .thread_name(|i| format!("modtree-worker-{}", i))
            .build()
            .map_err(std::io::Error::other)?;

        Ok(Self {
            resolver: Resolver::new(oracle).reconcile(options.reconcile),
            pool,
            cycles: options.cycles,
            progress: ProgressBar::hidden(),
        })
    }

    /// Report each resolved module on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Resolve the project in `root` and build a subtree for each of its
    /// direct dependencies. A root without a manifest yields an empty forest.
    pub fn build_forest(&self, root: &Path) -> Result<Vec<Artifact>> {
        self.pool.install(|| {
            let bindings = match self.resolver.resolve(root)? {
                Resolution::NoManifest => return Ok(Vec::new()),
                Resolution::Resolved(bindings) => bindings,
            };
            bindings
                .into_par_iter()
                .map(|DirectoryBinding { mut artifact, dir }| {
                    self.populate_in(&mut artifact, &dir, None)?;
                    Ok(artifact)
                })
                .collect()
        })
    }

    /// Fill `artifact.dependencies` with the full subtree found under `dir`.
    ///
    /// On error `artifact` is left untouched.
    pub fn populate(&self, artifact: &mut Artifact, dir: &Path) -> Result<()> {
        self.pool.install(|| self.populate_in(artifact, dir, None))
    }

    fn populate_in(
        &self,
        artifact: &mut Artifact,
        dir: &Path,
        parent: Option<&Ancestry<'_>>,
    ) -> Result<()> {
        let node = Ancestry {
            key: NodeKey {
                name: &artifact.name,
                version: &artifact.version,
                dir,
            },
            parent,
        };

        let children = match self.resolver.resolve(dir)? {
            Resolution::NoManifest => Vec::new(),
            Resolution::Resolved(bindings) => bindings
                .into_par_iter()
                .map(|binding| self.build_child(binding, &node))
                .collect::<Result<Vec<_>>>()?,
        };

        self.progress.inc(1);
        self.progress.set_message(node.key.name.to_string());
        tracing::trace!(module = %node.key.name, children = children.len(), "populated");

        artifact.dependencies = Some(children);
        Ok(())
    }

    fn build_child(&self, binding: DirectoryBinding, parent: &Ancestry<'_>) -> Result<Artifact> {
        let DirectoryBinding { mut artifact, dir } = binding;
        let key = NodeKey {
            name: &artifact.name,
            version: &artifact.version,
            dir: &dir,
        };

        if parent.contains(&key) {
            let mut chain = parent.chain();
            chain.push(artifact.display_id());
            match self.cycles {
                CyclePolicy::Error => return Err(TreeError::Cycle { chain }),
                CyclePolicy::Prune => {
                    tracing::warn!(cycle = %chain.join(" -> "), "pruning dependency cycle");
                    artifact.dependencies = Some(Vec::new());
                    return Ok(artifact);
                }
            }
        }

        self.populate_in(&mut artifact, &dir, Some(parent))?;
        Ok(artifact)
    }
}

/// Convenience wrapper around [`TreeBuilder::build_forest`].
pub fn build_forest(
    oracle: &dyn ModuleOracle,
    root: impl Into<PathBuf>,
    options: BuildOptions,
) -> Result<Vec<Artifact>> {
    TreeBuilder::new(oracle, options)?.build_forest(&root.into())
}
