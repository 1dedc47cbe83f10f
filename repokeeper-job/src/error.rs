use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failures launching or running the annotation job.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("annotation job exited with {status}")]
    Failed { status: ExitStatus },

    #[error("cannot bind workspace {path}: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
