//! Header reconciliation wired to version-control history.

use std::path::Path;

use repokeeper_headers::{HeaderRules, Mode, ReconcileReport, Reconciler, YearSource};
use repokeeper_vcs::Vcs;

use crate::error::PipelineError;

/// [`YearSource`] answering from the repository's commit history.
///
/// History lookups that fail are treated like files without history: the file
/// is skipped rather than failing the run.
pub struct HistoryYears<'a> {
    vcs: &'a dyn Vcs,
    repo: &'a Path,
}

impl<'a> HistoryYears<'a> {
    pub fn new(vcs: &'a dyn Vcs, repo: &'a Path) -> Self {
        Self { vcs, repo }
    }
}

impl YearSource for HistoryYears<'_> {
    fn last_change_year(&self, path: &Path) -> Option<i32> {
        match self.vcs.last_change_year(self.repo, path) {
            Ok(year) => year,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "history lookup failed");
                None
            }
        }
    }
}

/// Reconcile the copyright headers of every tracked file in `repo`.
pub fn reconcile_repository(
    vcs: &dyn Vcs,
    repo: &Path,
    rules: &HeaderRules,
    mode: Mode,
) -> Result<ReconcileReport, PipelineError> {
    tracing::info!(project = %repo.display(), ?mode, "reconciling headers");
    let files = vcs.tracked_files(repo).map_err(PipelineError::Listing)?;
    let years = HistoryYears::new(vcs, repo);
    let report = Reconciler::new(repo, rules.clone()).reconcile(&files, &years, mode)?;
    tracing::info!(
        project = %repo.display(),
        inspected = report.inspected,
        changed = report.changed(),
        "headers reconciled"
    );
    Ok(report)
}
