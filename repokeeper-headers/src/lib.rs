//! # repokeeper-headers
//!
//! Copyright-year reconciliation for source headers.
//!
//! [`HeaderRules`] decides which files are inspected and what a copyright
//! notice looks like; [`rewrite_header`] is the pure single-file transform;
//! [`Reconciler`] walks a file list, asks a [`YearSource`] for each file's
//! last-change year, and rewrites stale notices in place.

mod error;
mod reconcile;
mod rules;

pub use error::HeaderError;
pub use reconcile::{HeaderChange, Mode, ReconcileReport, Reconciler, YearSource};
pub use rules::{apply_year, find_notice, rewrite_header, HeaderRules, Notice, Rewrite};
