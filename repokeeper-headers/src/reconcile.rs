//! Walk a repository's tracked files and bring copyright years up to date.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use crate::error::{io_err, HeaderError};
use crate::rules::{apply_year, find_notice, HeaderRules};

/// Supplies the year a file was last changed according to history.
///
/// `None` means the year is unknown and the file is left alone.
pub trait YearSource {
    fn last_change_year(&self, path: &Path) -> Option<i32>;
}

impl<F> YearSource for F
where
    F: Fn(&Path) -> Option<i32>,
{
    fn last_change_year(&self, path: &Path) -> Option<i32> {
        self(path)
    }
}

/// Whether corrections are written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Apply,
    DryRun,
}

/// One corrected notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderChange {
    /// Relative to the repository root.
    pub path: PathBuf,
    pub line: usize,
    pub old_year: String,
    pub new_year: i32,
    pub original: Vec<u8>,
    pub updated: Vec<u8>,
}

impl HeaderChange {
    /// `a/` → `b/` unified diff of the change, for display.
    pub fn unified_diff(&self) -> String {
        let old = String::from_utf8_lossy(&self.original);
        let new = String::from_utf8_lossy(&self.updated);
        let old_header = format!("a/{}", self.path.display());
        let new_header = format!("b/{}", self.path.display());
        TextDiff::from_lines(old.as_ref(), new.as_ref())
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string()
    }
}

/// Summary of a reconciliation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Files that passed the extension filter.
    pub inspected: usize,
    pub up_to_date: usize,
    pub no_notice: usize,
    pub no_history: usize,
    pub unreadable: usize,
    /// Symlinks and other non-regular entries; never followed or rewritten.
    pub not_regular: usize,
    pub changes: Vec<HeaderChange>,
}

impl ReconcileReport {
    pub fn changed(&self) -> usize {
        self.changes.len()
    }
}

/// Applies [`HeaderRules`] to files under one repository root.
#[derive(Debug, Clone)]
pub struct Reconciler {
    root: PathBuf,
    rules: HeaderRules,
}

impl Reconciler {
    pub fn new(root: impl Into<PathBuf>, rules: HeaderRules) -> Self {
        Self {
            root: root.into(),
            rules,
        }
    }

    /// Reconcile every file in `files` (paths relative to the root).
    ///
    /// Files outside the extension set are not opened and symlinks are never
    /// followed. History is only consulted for files that carry a notice in
    /// the scan window. Files without a history year, or that cannot be read,
    /// are skipped. Only a failed write is an error.
    pub fn reconcile<Y>(
        &self,
        files: &[PathBuf],
        years: &Y,
        mode: Mode,
    ) -> Result<ReconcileReport, HeaderError>
    where
        Y: YearSource + ?Sized,
    {
        let mut report = ReconcileReport::default();

        for relative in files.iter().filter(|f| self.rules.applies_to(f)) {
            report.inspected += 1;
            let absolute = self.root.join(relative);

            match std::fs::symlink_metadata(&absolute) {
                Ok(meta) if meta.file_type().is_file() => {}
                Ok(_) => {
                    tracing::debug!(path = %relative.display(), "not a regular file; skipping");
                    report.not_regular += 1;
                    continue;
                }
                Err(err) => {
                    tracing::debug!(path = %relative.display(), error = %err, "skipping unreadable file");
                    report.unreadable += 1;
                    continue;
                }
            }
            let original = match std::fs::read(&absolute) {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::debug!(path = %relative.display(), error = %err, "skipping unreadable file");
                    report.unreadable += 1;
                    continue;
                }
            };

            let Some(notice) = find_notice(&self.rules, &original) else {
                report.no_notice += 1;
                continue;
            };
            let Some(year) = years.last_change_year(relative) else {
                tracing::debug!(path = %relative.display(), "no history year; skipping");
                report.no_history += 1;
                continue;
            };

            let Some(content) = apply_year(&original, &notice, year) else {
                report.up_to_date += 1;
                continue;
            };
            if mode == Mode::Apply {
                replace_file(&absolute, &content)?;
            }
            let old_year = String::from_utf8_lossy(notice.year(&original)).into_owned();
            tracing::info!(
                path = %relative.display(),
                line = notice.line,
                "copyright year {old_year} -> {year}"
            );
            report.changes.push(HeaderChange {
                path: relative.clone(),
                line: notice.line,
                old_year,
                new_year: year,
                original,
                updated: content,
            });
        }

        Ok(report)
    }
}

/// Write `content` to a `.repokeeper.tmp` sibling, copy the original
/// permissions onto it, then rename over `path`.
fn replace_file(path: &Path, content: &[u8]) -> Result<(), HeaderError> {
    let tmp = PathBuf::from(format!("{}.repokeeper.tmp", path.display()));
    let permissions = match std::fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(err) => return Err(io_err(path, err)),
    };

    std::fs::write(&tmp, content).map_err(|e| io_err(&tmp, e))?;
    if let Some(permissions) = permissions {
        if let Err(e) = std::fs::set_permissions(&tmp, permissions) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(&tmp, e));
        }
    }

    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}
