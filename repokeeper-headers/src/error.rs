use std::path::PathBuf;

use thiserror::Error;

/// Errors from building header rules or rewriting files.
#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("invalid copyright pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("copyright pattern `{pattern}` has no named `year` group")]
    MissingYearGroup { pattern: String },

    #[error("scan window must cover at least one line")]
    EmptyScanWindow,

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> HeaderError {
    HeaderError::Io {
        path: path.into(),
        source,
    }
}
