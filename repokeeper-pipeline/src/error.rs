//! Error types for repokeeper-pipeline.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use repokeeper_headers::HeaderError;
use repokeeper_job::JobError;
use repokeeper_vcs::VcsError;

/// Pipeline stage, used to label progress and failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Sync,
    Annotate,
    Reconcile,
    Commit,
    Push,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Sync => write!(f, "sync"),
            Stage::Annotate => write!(f, "annotate"),
            Stage::Reconcile => write!(f, "reconcile"),
            Stage::Commit => write!(f, "commit"),
            Stage::Push => write!(f, "push"),
        }
    }
}

/// All fatal errors a project pipeline can hit.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Fetch, checkout, fast-forward pull, or branch reset failed.
    #[error("repository sync failed: {0}")]
    Sync(#[source] VcsError),

    /// The annotation job could not start or exited non-zero.
    #[error("annotation job failed: {0}")]
    Job(#[from] JobError),

    /// Tracked files could not be listed for header scanning.
    #[error("cannot list tracked files: {0}")]
    Listing(#[source] VcsError),

    /// A header rewrite could not be written, or the header rules are invalid.
    #[error("header reconciliation failed: {0}")]
    Reconcile(#[from] HeaderError),

    /// The commit message template could not be rendered.
    #[error("commit template error: {0}")]
    Template(#[from] tera::Error),

    /// Drift detection, staging, or committing failed.
    #[error("commit failed: {0}")]
    Commit(#[source] VcsError),

    /// The work branch could not be pushed.
    #[error("push failed: {0}")]
    Push(#[source] VcsError),
}

impl PipelineError {
    /// The stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Sync(_) => Stage::Sync,
            PipelineError::Job(_) => Stage::Annotate,
            PipelineError::Listing(_) | PipelineError::Reconcile(_) => Stage::Reconcile,
            PipelineError::Template(_) | PipelineError::Commit(_) => Stage::Commit,
            PipelineError::Push(_) => Stage::Push,
        }
    }
}

/// A pipeline error attributed to the project it happened in.
#[derive(Debug, Error)]
#[error("{}: {stage} stage failed: {source}", .project.display())]
pub struct ProjectFailure {
    pub project: PathBuf,
    pub stage: Stage,
    #[source]
    pub source: PipelineError,
}

impl ProjectFailure {
    pub fn new(project: impl Into<PathBuf>, source: PipelineError) -> Self {
        Self {
            project: project.into(),
            stage: source.stage(),
            source,
        }
    }
}
