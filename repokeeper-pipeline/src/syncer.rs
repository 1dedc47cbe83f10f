//! Bring a checkout to a clean work branch at the remote mainline tip.

use std::path::Path;

use repokeeper_core::BranchName;
use repokeeper_vcs::Vcs;

use crate::error::PipelineError;

/// Fetch → discard uncommitted edits → checkout mainline → fast-forward-only
/// pull → create-or-reset the work branch.
///
/// Edits left behind by an interrupted run never reach the work branch.
/// Repeating a sync against an unchanged remote lands on the same branch tip.
/// A diverged local mainline fails the pull; nothing is merged or rebased.
pub struct RepositorySyncer<'a> {
    vcs: &'a dyn Vcs,
    remote: &'a str,
    mainline: &'a str,
}

impl<'a> RepositorySyncer<'a> {
    pub fn new(vcs: &'a dyn Vcs, remote: &'a str, mainline: &'a str) -> Self {
        Self {
            vcs,
            remote,
            mainline,
        }
    }

    pub fn sync(&self, repo: &Path, branch: &BranchName) -> Result<(), PipelineError> {
        tracing::info!(project = %repo.display(), remote = self.remote, "fetching");
        self.vcs
            .fetch(repo, self.remote)
            .map_err(PipelineError::Sync)?;
        self.vcs
            .discard_local_changes(repo)
            .map_err(PipelineError::Sync)?;
        self.vcs
            .checkout(repo, self.mainline)
            .map_err(PipelineError::Sync)?;
        self.vcs
            .pull_fast_forward_only(repo, self.remote, self.mainline)
            .map_err(PipelineError::Sync)?;
        self.vcs
            .create_or_reset_branch(repo, branch.as_str())
            .map_err(PipelineError::Sync)?;
        tracing::info!(
            project = %repo.display(),
            branch = %branch,
            "work branch reset to {}",
            self.mainline
        );
        Ok(())
    }
}
