//! # repokeeper-vcs
//!
//! The version-control contract the pipeline is written against ([`Vcs`]) and
//! its production implementation, [`GitCli`], which shells out to `git`.

mod error;
mod git;

pub use error::VcsError;
pub use git::GitCli;

use std::path::{Path, PathBuf};

/// Operations the pipeline needs from a version-control system.
///
/// Every call names the repository working tree explicitly, so one value can
/// serve every project in a run. All calls block until the underlying
/// operation completes.
pub trait Vcs {
    /// Whether `repo` carries version-control metadata.
    fn is_repository(&self, repo: &Path) -> bool;

    /// Fetch all refs from `remote`.
    fn fetch(&self, repo: &Path, remote: &str) -> Result<(), VcsError>;

    /// Reset tracked files and the index to HEAD, dropping any uncommitted
    /// edits. Untracked files are left in place.
    fn discard_local_changes(&self, repo: &Path) -> Result<(), VcsError>;

    /// Check out an existing branch or ref.
    fn checkout(&self, repo: &Path, reference: &str) -> Result<(), VcsError>;

    /// Fast-forward the current branch to `remote/branch`; fails on divergence.
    fn pull_fast_forward_only(&self, repo: &Path, remote: &str, branch: &str)
        -> Result<(), VcsError>;

    /// Point `name` at the current HEAD and check it out, discarding whatever
    /// the branch held before.
    fn create_or_reset_branch(&self, repo: &Path, name: &str) -> Result<(), VcsError>;

    /// Name of the checked-out branch.
    fn current_branch(&self, repo: &Path) -> Result<String, VcsError>;

    /// Tracked files, relative to `repo`.
    fn tracked_files(&self, repo: &Path) -> Result<Vec<PathBuf>, VcsError>;

    /// Untracked, non-ignored files, relative to `repo`.
    fn untracked_files(&self, repo: &Path) -> Result<Vec<PathBuf>, VcsError>;

    /// Four-digit year of the most recent commit touching `path`, or `None`
    /// when the file has no history.
    fn last_change_year(&self, repo: &Path, path: &Path) -> Result<Option<i32>, VcsError>;

    /// Whether tracked files differ from the last commit. Untracked files are ignored.
    fn working_tree_differs(&self, repo: &Path) -> Result<bool, VcsError>;

    /// Stage modifications and deletions of tracked files only.
    fn stage_modified(&self, repo: &Path) -> Result<(), VcsError>;

    /// Record one commit from the index.
    fn commit(&self, repo: &Path, title: &str, body: &str) -> Result<(), VcsError>;

    /// Push `branch` to `refs/heads/<remote_ref>` on `remote`, overwriting it.
    fn force_push(
        &self,
        repo: &Path,
        remote: &str,
        branch: &str,
        remote_ref: &str,
    ) -> Result<(), VcsError>;
}
