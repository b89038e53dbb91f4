//! Test helpers: in-memory collaborators and temporary module layouts.
//!
//! Enabled for unit tests and, through the `test-utils` feature, for the
//! integration tests and benchmarks.

use crate::checkout::CheckoutProvider;
use crate::error::{AcquisitionStage, Result, TreeError};
use crate::oracle::{ModuleEntry, ModuleOracle, PackageFetcher};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Route `tracing` output through the test writer when `RUST_LOG` is set.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

impl ModuleEntry {
    /// The root module of a listing.
    pub fn main(path: impl Into<String>, dir: &Path) -> Self {
        let mut entry = Self::new(path, "");
        entry.main = true;
        entry.dir = Some(dir.to_path_buf());
        entry
    }

    pub fn dependency(path: impl Into<String>, version: impl Into<String>, dir: &Path) -> Self {
        let mut entry = Self::new(path, version);
        entry.dir = Some(dir.to_path_buf());
        entry
    }

    pub fn indirect(path: impl Into<String>, version: impl Into<String>, dir: &Path) -> Self {
        let mut entry = Self::dependency(path, version, dir);
        entry.indirect = true;
        entry
    }
}

/// Module oracle answering from a directory → listing table.
#[derive(Default)]
pub struct FakeOracle {
    listings: Mutex<HashMap<PathBuf, std::result::Result<Vec<ModuleEntry>, String>>>,
    reconcile_failures: Mutex<HashMap<PathBuf, String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_listing(&self, dir: &Path, entries: Vec<ModuleEntry>) {
        self.listings
            .lock()
            .unwrap()
            .insert(dir.to_path_buf(), Ok(entries));
    }

    pub fn fail_listing(&self, dir: &Path, diagnostic: &str) {
        self.listings
            .lock()
            .unwrap()
            .insert(dir.to_path_buf(), Err(diagnostic.to_string()));
    }

    pub fn fail_reconcile(&self, dir: &Path, diagnostic: &str) {
        self.reconcile_failures
            .lock()
            .unwrap()
            .insert(dir.to_path_buf(), diagnostic.to_string());
    }

    /// Every call made so far, as `"<op> <dir>"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of listings requested for `dir`.
    pub fn list_count(&self, dir: &Path) -> usize {
        let needle = format!("list {}", dir.display());
        self.calls().iter().filter(|c| **c == needle).count()
    }

    fn record(&self, op: &str, dir: &Path) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", op, dir.display()));
    }
}

impl ModuleOracle for FakeOracle {
    fn manifest_name(&self) -> &str {
        "go.mod"
    }

    fn reconcile(&self, dir: &Path) -> Result<()> {
        self.record("reconcile", dir);
        match self.reconcile_failures.lock().unwrap().get(dir) {
            Some(diagnostic) => Err(TreeError::oracle(dir, "go mod tidy", diagnostic.clone())),
            None => Ok(()),
        }
    }

    fn list_modules(&self, dir: &Path) -> Result<Vec<ModuleEntry>> {
        self.record("list", dir);
        match self.listings.lock().unwrap().get(dir) {
            Some(Ok(entries)) => Ok(entries.clone()),
            Some(Err(diagnostic)) => Err(TreeError::oracle(
                dir,
                "go list -m -json all",
                diagnostic.clone(),
            )),
            None => Ok(Vec::new()),
        }
    }
}

/// Fetcher that records where it was asked to download.
#[derive(Default)]
pub struct FakeFetcher {
    pub fail_with: Option<String>,
    downloads: Mutex<Vec<PathBuf>>,
}

impl FakeFetcher {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn downloads(&self) -> Vec<PathBuf> {
        self.downloads.lock().unwrap().clone()
    }
}

impl PackageFetcher for FakeFetcher {
    fn download(&self, dir: &Path) -> Result<()> {
        self.downloads.lock().unwrap().push(dir.to_path_buf());
        match &self.fail_with {
            Some(message) => Err(TreeError::acquisition(AcquisitionStage::Download, message)),
            None => Ok(()),
        }
    }
}

/// Checkout provider that hands back a prepared directory.
pub struct FakeCheckout {
    pub dir: PathBuf,
    pub fail_with: Option<String>,
}

impl CheckoutProvider for FakeCheckout {
    fn checkout(&self, source: &str, selector: &str, _dest: &Path) -> Result<PathBuf> {
        match &self.fail_with {
            Some(message) => Err(TreeError::acquisition(
                AcquisitionStage::Checkout,
                format!("{} ({}): {}", source, selector, message),
            )),
            None => Ok(self.dir.clone()),
        }
    }
}

/// Temporary directory tree standing in for a checkout plus module cache.
pub struct ProjectLayout {
    root: TempDir,
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectLayout {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Create `<root>/<name>`, optionally with an empty `go.mod`.
    pub fn module_dir(&self, name: &str, with_manifest: bool) -> PathBuf {
        let dir = self.root.path().join(name);
        fs::create_dir_all(&dir).expect("failed to create module dir");
        if with_manifest {
            fs::write(dir.join("go.mod"), format!("module {}\n", name))
                .expect("failed to write go.mod");
        }
        dir
    }
}
