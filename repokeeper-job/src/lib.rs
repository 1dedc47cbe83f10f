//! # repokeeper-job
//!
//! Launches the external annotation container against one project's working
//! tree and waits for it to exit. What the container does to the files is
//! not interpreted here.

mod container;
mod error;

pub use container::ContainerJob;
pub use error::JobError;

use std::path::Path;

/// A blocking, single-shot annotation run over `workspace`.
pub trait AnnotationJob {
    /// Run with `model` and return once the job has exited successfully.
    fn run(&self, model: &str, workspace: &Path) -> Result<(), JobError>;
}
