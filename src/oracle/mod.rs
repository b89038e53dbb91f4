//! Module graph oracle and package fetcher interfaces.
//!
//! The tree builder never talks to the Go toolchain directly. It goes through
//! [`ModuleOracle`] for "what does this directory depend on" and through
//! [`PackageFetcher`] for "make sure the modules are on disk". The Go-backed
//! implementation lives in [`go`]; tests use the in-memory fakes from
//! `test_utils`.
//!
//! Every call takes the target directory explicitly. Implementations must not
//! rely on (or change) the process working directory, which is what lets the
//! builder resolve sibling subtrees in parallel.

pub mod go;

pub use go::GoToolchain;

use crate::error::{Result, TreeError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One record of a module listing, as printed by `go list -m -json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModuleEntry {
    pub path: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub main: bool,
    #[serde(default)]
    pub indirect: bool,
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub replace: Option<Replacement>,
}

/// Target of a `replace` directive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Replacement {
    pub path: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl ModuleEntry {
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// A declared, non-root dependency: the only entries that become nodes.
    pub fn is_direct_dependency(&self) -> bool {
        !self.indirect && !self.main
    }

    /// Directory holding this module's sources. A replacement's directory
    /// takes precedence since that is what the build actually uses.
    pub fn source_dir(&self) -> Option<&Path> {
        self.replace
            .as_ref()
            .and_then(|r| r.dir.as_deref())
            .or(self.dir.as_deref())
    }
}

/// Answers module graph queries for a directory.
pub trait ModuleOracle: Send + Sync {
    /// File whose presence marks a directory as a resolvable module root.
    fn manifest_name(&self) -> &str;

    /// Align the manifest in `dir` with its resolved state. Directory
    /// annotations from [`list_modules`](Self::list_modules) are only
    /// trusted after this ran.
    fn reconcile(&self, dir: &Path) -> Result<()>;

    /// Full module listing for `dir`, in the order the ecosystem reports it.
    fn list_modules(&self, dir: &Path) -> Result<Vec<ModuleEntry>>;
}

/// Materializes declared dependencies on local disk.
pub trait PackageFetcher: Send + Sync {
    fn download(&self, dir: &Path) -> Result<()>;
}

/// Parse the output of `go list -m -json`: a sequence of JSON objects that
/// are concatenated rather than wrapped in an array.
pub fn parse_module_stream(dir: &Path, command: &str, raw: &[u8]) -> Result<Vec<ModuleEntry>> {
    serde_json::Deserializer::from_slice(raw)
        .into_iter::<ModuleEntry>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| {
            TreeError::oracle(
                dir,
                command,
                format!(
                    "unparsable module listing: {}\n{}",
                    e,
                    String::from_utf8_lossy(raw)
                ),
            )
        })
}
