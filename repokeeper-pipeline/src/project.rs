//! The four-stage pipeline for a single project.

use std::path::Path;

use repokeeper_core::RunConfig;
use repokeeper_headers::{HeaderRules, Mode};
use repokeeper_job::AnnotationJob;
use repokeeper_vcs::Vcs;

use crate::committer::{ChangeCommitter, CommitOutcome, MessageVars};
use crate::error::PipelineError;
use crate::reconcile::reconcile_repository;
use crate::syncer::RepositorySyncer;

/// Operator switches that narrow what a run does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Launch the annotation job (off: headers only).
    pub run_job: bool,
    /// Push the work branch after committing.
    pub push: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            run_job: true,
            push: true,
        }
    }
}

/// How a project's pipeline ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectOutcome {
    /// The path has no version-control metadata and was left alone.
    NotVersioned,
    /// Job and reconciliation left tracked files identical to the last commit.
    NoChange,
    /// One commit was created on the work branch.
    Committed { reconciled: usize, pushed: bool },
}

/// Runs sync → annotate → reconcile → commit for one project.
pub struct ProjectPipeline<'a> {
    config: &'a RunConfig,
    vcs: &'a dyn Vcs,
    job: &'a dyn AnnotationJob,
    rules: &'a HeaderRules,
    options: RunOptions,
}

impl<'a> ProjectPipeline<'a> {
    pub fn new(
        config: &'a RunConfig,
        vcs: &'a dyn Vcs,
        job: &'a dyn AnnotationJob,
        rules: &'a HeaderRules,
        options: RunOptions,
    ) -> Self {
        Self {
            config,
            vcs,
            job,
            rules,
            options,
        }
    }

    pub fn run(&self, repo: &Path) -> Result<ProjectOutcome, PipelineError> {
        if !self.vcs.is_repository(repo) {
            tracing::warn!(project = %repo.display(), "not a git repository; skipping");
            return Ok(ProjectOutcome::NotVersioned);
        }
        let branch = self.config.work_branch();

        // Start → Synced
        RepositorySyncer::new(self.vcs, &self.config.remote, &self.config.mainline)
            .sync(repo, &branch)?;

        // Synced → Annotated
        if self.options.run_job {
            self.job.run(&self.config.model.0, repo)?;
            self.remove_job_leftovers(repo);
        } else {
            tracing::info!(project = %repo.display(), "annotation job skipped");
        }

        // Annotated → Reconciled
        let report = reconcile_repository(self.vcs, repo, self.rules, Mode::Apply)?;

        // Reconciled → Committed | NoChange
        let project_name = repo
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| repo.display().to_string());
        let vars = MessageVars {
            issue: &self.config.issue.0,
            branch: branch.as_str(),
            model: &self.config.model.0,
            project: &project_name,
        };
        let outcome = ChangeCommitter::new(self.vcs, &self.config.remote, self.options.push)
            .commit(repo, &branch, &self.config.commit, &vars)?;

        Ok(match outcome {
            CommitOutcome::NoChange => ProjectOutcome::NoChange,
            CommitOutcome::Committed { pushed } => ProjectOutcome::Committed {
                reconciled: report.changed(),
                pushed,
            },
        })
    }

    /// Delete untracked files the job left behind whose names end in one of
    /// the configured suffixes. Failures are logged, never fatal.
    fn remove_job_leftovers(&self, repo: &Path) {
        let suffixes = &self.config.job.cleanup_suffixes;
        if suffixes.is_empty() {
            return;
        }
        let untracked = match self.vcs.untracked_files(repo) {
            Ok(files) => files,
            Err(err) => {
                tracing::warn!(project = %repo.display(), error = %err, "cannot list job leftovers");
                return;
            }
        };
        for relative in untracked {
            let name = relative.to_string_lossy();
            if !suffixes.iter().any(|s| name.ends_with(s.as_str())) {
                continue;
            }
            match std::fs::remove_file(repo.join(&relative)) {
                Ok(()) => tracing::debug!(path = %relative.display(), "removed job leftover"),
                Err(err) => {
                    tracing::warn!(path = %relative.display(), error = %err, "cannot remove job leftover")
                }
            }
        }
    }
}
