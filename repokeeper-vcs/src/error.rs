use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failures from version-control operations.
#[derive(Debug, Error)]
pub enum VcsError {
    /// The VCS executable could not be started.
    #[error("failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran and reported failure.
    #[error("`git {args}` failed ({status}): {stderr}")]
    Command {
        args: String,
        status: ExitStatus,
        stderr: String,
    },

    /// Command output could not be interpreted.
    #[error("unexpected output from `git {args}`: {detail}")]
    Output { args: String, detail: String },
}
