//! Go toolchain backed oracle and fetcher.
//!
//! - `go mod download` materializes the module cache
//! - `go mod tidy` reconciles a directory's `go.mod`
//! - `go list -m -json all` lists the module graph
//!
//! Each command runs with `current_dir` set to the directory being queried.

use super::{ModuleEntry, ModuleOracle, PackageFetcher, parse_module_stream};
use crate::error::{AcquisitionStage, Result, TreeError};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::{Arc, Mutex};

const LIST_ARGS: [&str; 4] = ["list", "-m", "-json", "all"];
const TIDY_ARGS: [&str; 2] = ["mod", "tidy"];
const DOWNLOAD_ARGS: [&str; 2] = ["mod", "download"];

pub struct GoToolchain {
    go: PathBuf,
    env: BTreeMap<String, String>,
    /// One lock per directory. The flag records whether tidy already ran, so
    /// a module reached through several paths is reconciled once.
    reconciled: Mutex<HashMap<PathBuf, Arc<Mutex<bool>>>>,
}

impl Default for GoToolchain {
    fn default() -> Self {
        Self::new("go")
    }
}

impl GoToolchain {
    pub fn new(go: impl Into<PathBuf>) -> Self {
        Self {
            go: go.into(),
            env: BTreeMap::new(),
            reconciled: Mutex::new(HashMap::new()),
        }
    }

    /// Extra environment applied to every `go` invocation (e.g. `GOFLAGS`).
    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    fn command_line(&self, args: &[&str]) -> String {
        format!("{} {}", self.go.display(), args.join(" "))
    }

    fn run(&self, dir: &Path, args: &[&str]) -> std::io::Result<Output> {
        tracing::trace!(dir = %dir.display(), command = %self.command_line(args), "running");
        Command::new(&self.go)
            .args(args)
            .envs(&self.env)
            .current_dir(dir)
            .output()
    }

    /// Run a query command, turning spawn failures and nonzero exits into
    /// oracle errors carrying the tool's own output.
    fn query(&self, dir: &Path, args: &[&str]) -> Result<Vec<u8>> {
        let command = self.command_line(args);
        let output = self
            .run(dir, args)
            .map_err(|e| TreeError::oracle(dir, &command, format!("failed to spawn: {}", e)))?;

        if !output.status.success() {
            return Err(TreeError::oracle(dir, command, combined_output(&output)));
        }
        Ok(output.stdout)
    }

    fn dir_lock(&self, dir: &Path) -> Arc<Mutex<bool>> {
        let mut table = self.reconciled.lock().unwrap_or_else(|e| e.into_inner());
        table
            .entry(dir.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(false)))
            .clone()
    }
}

impl ModuleOracle for GoToolchain {
    fn manifest_name(&self) -> &str {
        "go.mod"
    }

    fn reconcile(&self, dir: &Path) -> Result<()> {
        let lock = self.dir_lock(dir);
        let mut done = lock.lock().unwrap_or_else(|e| e.into_inner());
        if *done {
            return Ok(());
        }
        self.query(dir, &TIDY_ARGS)?;
        *done = true;
        Ok(())
    }

    fn list_modules(&self, dir: &Path) -> Result<Vec<ModuleEntry>> {
        let stdout = self.query(dir, &LIST_ARGS)?;
        parse_module_stream(dir, &self.command_line(&LIST_ARGS), &stdout)
    }
}

impl PackageFetcher for GoToolchain {
    fn download(&self, dir: &Path) -> Result<()> {
        let output = self.run(dir, &DOWNLOAD_ARGS).map_err(|e| {
            TreeError::acquisition(
                AcquisitionStage::Download,
                format!("failed to run {}: {}", self.command_line(&DOWNLOAD_ARGS), e),
            )
        })?;

        if !output.status.success() {
            return Err(TreeError::acquisition(
                AcquisitionStage::Download,
                combined_output(&output),
            ));
        }
        Ok(())
    }
}

fn combined_output(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let text = format!("{}{}", stderr, stdout).trim().to_string();
    if text.is_empty() {
        format!("exited with {}", output.status)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_uses_configured_binary() {
        let go = GoToolchain::new("/opt/go/bin/go");
        assert_eq!(go.command_line(&LIST_ARGS), "/opt/go/bin/go list -m -json all");
    }

    #[test]
    fn test_missing_binary_is_oracle_error() {
        let dir = tempfile::tempdir().unwrap();
        let go = GoToolchain::new("modtree-no-such-go-binary");
        let err = go.list_modules(dir.path()).unwrap_err();
        match err {
            TreeError::Oracle { command, diagnostic, .. } => {
                assert!(command.starts_with("modtree-no-such-go-binary list"));
                assert!(diagnostic.contains("failed to spawn"));
            }
            other => panic!("expected oracle error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_binary_download_is_acquisition_error() {
        let dir = tempfile::tempdir().unwrap();
        let go = GoToolchain::new("modtree-no-such-go-binary");
        let err = go.download(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            TreeError::Acquisition {
                stage: AcquisitionStage::Download,
                ..
            }
        ));
    }

    /// A stand-in `go` binary: a shell script with the given body.
    #[cfg(unix)]
    fn script(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("fakego");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_oracle_error_with_output() {
        let bin = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let go = GoToolchain::new(script(bin.path(), "echo 'go: boom' >&2\nexit 1"));

        let err = go.list_modules(work.path()).unwrap_err();
        match err {
            TreeError::Oracle { dir, command, diagnostic } => {
                assert_eq!(dir, work.path());
                assert!(command.ends_with("fakego list -m -json all"));
                assert_eq!(diagnostic, "go: boom");
            }
            other => panic!("expected oracle error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_reconcile_runs_once_per_directory() {
        let bin = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let log = bin.path().join("calls.log");
        let go = GoToolchain::new(script(
            bin.path(),
            &format!("echo \"$*\" >> '{}'", log.display()),
        ));

        go.reconcile(work.path()).unwrap();
        go.reconcile(work.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&log).unwrap(), "mod tidy\n");

        go.reconcile(other.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&log).unwrap(), "mod tidy\nmod tidy\n");
    }

    #[test]
    fn test_dir_lock_is_shared_per_directory() {
        let go = GoToolchain::default();
        let a = go.dir_lock(Path::new("/m/a"));
        let a2 = go.dir_lock(Path::new("/m/a"));
        let b = go.dir_lock(Path::new("/m/b"));
        assert!(Arc::ptr_eq(&a, &a2));
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
