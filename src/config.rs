//! Configuration file parsing (`modtree.toml`).
//!
//! Settings are read from the first file found among:
//!
//! 1. the path given with `--config`
//! 2. `./modtree.toml`
//! 3. `~/.modtree/config.toml`
//!
//! Command-line flags override whatever the file sets.
//!
//! ```toml
//! go = "/usr/local/go/bin/go"
//! jobs = 8
//! tidy = true
//! cycles = "prune"
//! format = "json"
//!
//! [env]
//! GOFLAGS = "-mod=mod"
//! ```

use crate::error::{Result, TreeError};
use crate::output::OutputFormat;
use crate::tree::{BuildOptions, CyclePolicy};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "modtree.toml";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Go binary used for every oracle and fetcher call.
    pub go: PathBuf,
    pub jobs: Option<usize>,
    pub tidy: bool,
    pub cycles: CyclePolicy,
    pub format: OutputFormat,
    /// Extra environment for `go` invocations.
    pub env: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            go: PathBuf::from("go"),
            jobs: None,
            tidy: true,
            cycles: CyclePolicy::default(),
            format: OutputFormat::default(),
            env: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when no file exists. An
    /// explicit path that does not exist is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(TreeError::Config {
                    path: path.to_path_buf(),
                    message: "file not found".to_string(),
                });
            }
            return Self::from_file(path);
        }

        match Self::search_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| TreeError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let settings = Self::parse(&content).map_err(|message| TreeError::Config {
            path: path.to_path_buf(),
            message,
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(settings)
    }

    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".modtree").join("config.toml"));
        }
        paths
    }

    pub fn build_options(&self) -> BuildOptions {
        let defaults = BuildOptions::default();
        BuildOptions {
            jobs: self.jobs.unwrap_or(defaults.jobs),
            reconcile: self.tidy,
            cycles: self.cycles,
        }
    }
}
