//! Directory dependency resolution.
//!
//! Given a directory, [`Resolver::resolve`] answers "what does this module
//! declare, and where does each of those modules live on disk?". A directory
//! without a manifest is not an error: it is the base case of the recursion.

use crate::artifact::{Artifact, DirectoryBinding};
use crate::error::{Result, TreeError};
use crate::oracle::ModuleOracle;
use std::path::{Path, PathBuf};

/// Outcome of resolving one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No manifest in the directory; nothing to recurse into.
    NoManifest,
    /// Immediate dependencies in oracle order, each bound to its directory.
    Resolved(Vec<DirectoryBinding>),
}

impl Resolution {
    /// Split into parallel sequences: `artifacts[i]` lives in `dirs[i]`.
    pub fn into_parts(self) -> (Vec<Artifact>, Vec<PathBuf>) {
        match self {
            Resolution::NoManifest => (Vec::new(), Vec::new()),
            Resolution::Resolved(bindings) => bindings
                .into_iter()
                .map(|b| (b.artifact, b.dir))
                .unzip(),
        }
    }

    pub fn is_no_manifest(&self) -> bool {
        matches!(self, Resolution::NoManifest)
    }
}

pub struct Resolver<'a> {
    oracle: &'a dyn ModuleOracle,
    reconcile: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(oracle: &'a dyn ModuleOracle) -> Self {
        Self {
            oracle,
            reconcile: true,
        }
    }

    /// Toggle the manifest reconciliation step that precedes every listing.
    pub fn reconcile(mut self, enabled: bool) -> Self {
        self.reconcile = enabled;
        self
    }

    pub fn resolve(&self, dir: &Path) -> Result<Resolution> {
        if !dir.is_dir() {
            return Err(TreeError::oracle(
                dir,
                "resolve",
                "module directory does not exist",
            ));
        }

        if !dir.join(self.oracle.manifest_name()).is_file() {
            tracing::debug!(dir = %dir.display(), "no manifest");
            return Ok(Resolution::NoManifest);
        }

        if self.reconcile {
            self.oracle.reconcile(dir)?;
        }

        let entries = self.oracle.list_modules(dir)?;
        let mut bindings = Vec::new();
        for entry in entries.into_iter().filter(|e| e.is_direct_dependency()) {
            let Some(module_dir) = entry.source_dir() else {
                return Err(TreeError::oracle(
                    dir,
                    "resolve",
                    format!("module {} has no local directory", entry.path),
                ));
            };
            let module_dir = if module_dir.is_relative() {
                dir.join(module_dir)
            } else {
                module_dir.to_path_buf()
            };
            bindings.push(DirectoryBinding::new(
                Artifact::new(entry.path, entry.version),
                module_dir,
            ));
        }

        tracing::debug!(
            dir = %dir.display(),
            count = bindings.len(),
            "resolved immediate dependencies"
        );
        Ok(Resolution::Resolved(bindings))
    }
}
