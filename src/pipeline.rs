//! End-to-end run: checkout, download, build.
//!
//! Each stage is fatal on failure. Nothing is returned (and so nothing is
//! printed) unless the whole forest was built.

use crate::artifact::Artifact;
use crate::checkout::CheckoutProvider;
use crate::error::Result;
use crate::oracle::{ModuleOracle, PackageFetcher};
use crate::tree::{BuildOptions, TreeBuilder};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

/// What to check out and where.
#[derive(Debug, Clone)]
pub struct Request {
    pub source: String,
    pub selector: String,
    pub dest: PathBuf,
}

pub struct Pipeline<'a> {
    pub checkout: &'a dyn CheckoutProvider,
    pub fetcher: &'a dyn PackageFetcher,
    pub oracle: &'a dyn ModuleOracle,
    pub options: BuildOptions,
    /// Show a spinner while the tree is built.
    pub progress: bool,
}

impl Pipeline<'_> {
    pub fn run(&self, request: &Request) -> Result<Vec<Artifact>> {
        let root = self
            .checkout
            .checkout(&request.source, &request.selector, &request.dest)?;

        self.fetcher.download(&root)?;
        eprintln!("{} Dependencies downloaded", "✓".green());

        let mut builder = TreeBuilder::new(self.oracle, self.options)?;
        let pb = if self.progress {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.blue} [{pos} resolved] {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            builder = builder.with_progress(pb.clone());
            Some(pb)
        } else {
            None
        };

        let result = builder.build_forest(&root);
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        let forest = result?;

        eprintln!(
            "{} Resolved {} direct dependencies of {}",
            "✓".green(),
            forest.len(),
            request.source.bold()
        );
        Ok(forest)
    }
}
