//! Project acquisition.
//!
//! Clones the project repository with git2 and checks out the requested
//! branch, tag or commit. An existing repository at the destination is
//! reused instead of cloned again.

use crate::error::{AcquisitionStage, Result, TreeError};
use colored::*;
use git2::Repository;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

/// Materializes a local checkout of a project.
pub trait CheckoutProvider {
    /// Make `source` at `selector` available under `dest` and return the
    /// directory to resolve from.
    fn checkout(&self, source: &str, selector: &str, dest: &Path) -> Result<PathBuf>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GitCheckout;

impl CheckoutProvider for GitCheckout {
    fn checkout(&self, source: &str, selector: &str, dest: &Path) -> Result<PathBuf> {
        let repo = open_or_clone_repo(source, dest)?;
        let Some((oid, checkout_msg)) = select_checkout_target(&repo, selector) else {
            return Err(checkout_error(format!(
                "'{}' is not a branch, tag or commit of {}",
                selector, source
            )));
        };
        checkout_repo_target(&repo, oid, &checkout_msg)?;
        Ok(dest.to_path_buf())
    }
}

/// Default checkout location: the last path segment of `source` (without a
/// `.git` suffix) under the current directory.
pub fn default_dest(source: &str) -> Result<PathBuf> {
    let name = source
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(source)
        .trim_end_matches(".git");
    if name.is_empty() {
        return Err(checkout_error(format!(
            "cannot derive a directory name from '{}'",
            source
        )));
    }
    Ok(std::env::current_dir()?.join(name))
}

fn checkout_error(message: impl Into<String>) -> TreeError {
    TreeError::acquisition(AcquisitionStage::Checkout, message)
}

fn open_or_clone_repo(source: &str, dest: &Path) -> Result<Repository> {
    if dest.exists() {
        eprintln!("{}", reuse_line(dest));
        return Repository::open(dest)
            .map_err(|e| checkout_error(format!("{} is not a git repository: {}", dest.display(), e)));
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Cloning {}...", source));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    match Repository::clone(source, dest) {
        Ok(repo) => {
            pb.finish_with_message(format!("{} Cloned {}", "✓".green(), source));
            Ok(repo)
        }
        Err(err) => {
            pb.finish_with_message(format!("{} Failed {}", "x".red(), source));
            Err(checkout_error(format!(
                "failed to clone repository {}: {}",
                source, err
            )))
        }
    }
}

/// Tags win over branches, local branches over remote ones, and a commit id
/// (full or abbreviated) is the last resort.
fn select_checkout_target(repo: &Repository, selector: &str) -> Option<(git2::Oid, String)> {
    let refname = format!("refs/tags/{}", selector);
    if let Ok(reference) = repo.find_reference(&refname)
        && let Ok(commit) = reference.peel_to_commit()
    {
        return Some((commit.id(), format!("tag {}", selector)));
    }

    if let Some(branch_oid) = find_branch_commit(repo, selector) {
        return Some((branch_oid, format!("branch {}", selector)));
    }

    if let Ok(object) = repo.revparse_single(selector)
        && let Ok(commit) = object.peel_to_commit()
    {
        return Some((commit.id(), format!("commit {}", short_hash(selector))));
    }

    None
}

fn find_branch_commit(repo: &Repository, branch: &str) -> Option<git2::Oid> {
    if let Ok(reference) = repo.find_branch(branch, git2::BranchType::Local)
        && let Ok(commit) = reference.get().peel_to_commit()
    {
        return Some(commit.id());
    }

    let remote_ref = format!("origin/{}", branch);
    if let Ok(reference) = repo.find_branch(&remote_ref, git2::BranchType::Remote)
        && let Ok(commit) = reference.get().peel_to_commit()
    {
        return Some(commit.id());
    }

    None
}

/// First seven characters of `rev`, cut on a char boundary.
fn short_hash(rev: &str) -> &str {
    rev.char_indices().nth(7).map_or(rev, |(i, _)| &rev[..i])
}

fn reuse_line(dest: &Path) -> String {
    format!("   {} Using existing checkout: {}", "~".yellow(), dest.display())
}

fn checked_out_line(checkout_msg: &str) -> String {
    format!("   {} Checked out {}", "✓".green(), checkout_msg)
}

fn checkout_repo_target(repo: &Repository, oid: git2::Oid, checkout_msg: &str) -> Result<()> {
    let fail = |e: git2::Error| checkout_error(format!("failed to checkout {}: {}", checkout_msg, e));

    let obj = repo.find_object(oid, None).map_err(fail)?;
    let mut checkout_opts = git2::build::CheckoutBuilder::new();
    checkout_opts.force();
    repo.checkout_tree(&obj, Some(&mut checkout_opts))
        .map_err(fail)?;
    repo.set_head_detached(oid).map_err(fail)?;
    eprintln!("{}", checked_out_line(checkout_msg));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn init_repo_with_commit(dir: &Path) -> (Repository, git2::Oid) {
        let repo = Repository::init(dir).unwrap();
        fs::write(dir.join("go.mod"), "module example.com/app\n").unwrap();
        let oid = {
            let mut index = repo.index().unwrap();
            index.add_path(Path::new("go.mod")).unwrap();
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            let sig = git2::Signature::now("Test", "test@example.com").unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
                .unwrap()
        };
        (repo, oid)
    }

    #[test]
    fn test_default_dest_strips_git_suffix() {
        let dest = default_dest("https://github.com/spf13/cobra.git").unwrap();
        assert!(dest.is_absolute());
        assert!(dest.ends_with("cobra"));

        let dest = default_dest("git@github.com:spf13/cobra/").unwrap();
        assert!(dest.ends_with("cobra"));
    }

    #[test]
    fn test_default_dest_rejects_empty_name() {
        assert!(default_dest("/").is_err());
    }

    #[test]
    fn test_select_tag_and_commit() {
        let tmp = tempfile::tempdir().unwrap();
        let (repo, oid) = init_repo_with_commit(tmp.path());
        let commit = repo.find_commit(oid).unwrap();
        repo.tag_lightweight("v1.0.0", commit.as_object(), false)
            .unwrap();

        let (tag_oid, msg) = select_checkout_target(&repo, "v1.0.0").unwrap();
        assert_eq!(tag_oid, oid);
        assert_eq!(msg, "tag v1.0.0");

        let full = oid.to_string();
        let (commit_oid, msg) = select_checkout_target(&repo, &full).unwrap();
        assert_eq!(commit_oid, oid);
        assert_eq!(msg, format!("commit {}", &full[..7]));
    }

    #[test]
    fn test_short_hash_respects_char_boundaries() {
        assert_eq!(short_hash("abcdefñ~0"), "abcdefñ");
        assert_eq!(short_hash("0123456789abcdef"), "0123456");
        assert_eq!(short_hash("HEAD~1"), "HEAD~1");
    }

    #[test]
    fn test_commit_selector_with_multibyte_name() {
        let tmp = tempfile::tempdir().unwrap();
        let (repo, oid) = init_repo_with_commit(tmp.path());
        let commit = repo.find_commit(oid).unwrap();
        repo.branch("abcdefñ", &commit, false).unwrap();

        let (target, msg) = select_checkout_target(&repo, "abcdefñ~0").unwrap();
        assert_eq!(target, oid);
        assert_eq!(msg, "commit abcdefñ");
    }

    #[test]
    fn test_status_lines_use_plain_markers() {
        colored::control::set_override(false);
        assert_eq!(
            reuse_line(Path::new("/work/app")),
            "   ~ Using existing checkout: /work/app"
        );
        assert_eq!(checked_out_line("tag v1.0.0"), "   ✓ Checked out tag v1.0.0");
        colored::control::unset_override();
    }

    #[test]
    fn test_unknown_selector_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let (repo, _) = init_repo_with_commit(tmp.path());
        assert!(select_checkout_target(&repo, "no-such-branch").is_none());
    }

    #[test]
    fn test_clone_local_repository_at_branch() {
        let upstream = tempfile::tempdir().unwrap();
        let (repo, oid) = init_repo_with_commit(upstream.path());
        let commit = repo.find_commit(oid).unwrap();
        repo.branch("release", &commit, false).unwrap();

        let work = tempfile::tempdir().unwrap();
        let dest = work.path().join("app");
        let source = upstream.path().to_string_lossy().to_string();

        let dir = GitCheckout.checkout(&source, "release", &dest).unwrap();
        assert_eq!(dir, dest);
        assert!(dest.join("go.mod").is_file());

        let cloned = Repository::open(&dest).unwrap();
        assert_eq!(cloned.head().unwrap().peel_to_commit().unwrap().id(), oid);
    }

    #[test]
    fn test_clone_failure_is_acquisition_error() {
        let work = tempfile::tempdir().unwrap();
        let missing = work.path().join("does-not-exist");
        let err = GitCheckout
            .checkout(&missing.to_string_lossy(), "main", &work.path().join("out"))
            .unwrap_err();
        assert!(matches!(
            err,
            TreeError::Acquisition {
                stage: AcquisitionStage::Checkout,
                ..
            }
        ));
    }
}
