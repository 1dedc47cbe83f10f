//! # repokeeper-pipeline
//!
//! Per-project reconciliation pipeline and the multi-project driver.
//!
//! One project moves through
//! `Start → Synced → Annotated → Reconciled → {Committed | NoChange}`; any stage
//! may fail instead. [`ProjectOrchestrator`] walks the configured project list
//! in order and applies the configured [`FailurePolicy`](repokeeper_core::FailurePolicy)
//! to failures.

pub mod committer;
pub mod error;
pub mod orchestrator;
pub mod project;
pub mod reconcile;
pub mod syncer;

pub use committer::{ChangeCommitter, CommitMessage, CommitOutcome, MessageVars};
pub use error::{PipelineError, ProjectFailure, Stage};
pub use orchestrator::{ProjectOrchestrator, ProjectReport, RunReport};
pub use project::{ProjectOutcome, ProjectPipeline, RunOptions};
pub use syncer::RepositorySyncer;
