use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use repokeeper_core::JobConfig;

use crate::{AnnotationJob, JobError};

/// Runs the annotation image with a container runtime (`docker run` style CLI).
///
/// The project working tree is the only bind mount, read-write, at
/// `workspace_mount`; the model id travels in the `model_env` variable.
#[derive(Debug, Clone)]
pub struct ContainerJob {
    runtime: String,
    image: String,
    workspace_mount: PathBuf,
    model_env: String,
    env: BTreeMap<String, String>,
    args: Vec<String>,
    extra_runtime_args: Vec<String>,
}

impl ContainerJob {
    pub fn from_config(config: &JobConfig) -> Self {
        Self {
            runtime: config.runtime.clone(),
            image: config.image.clone(),
            workspace_mount: config.workspace_mount.clone(),
            model_env: config.model_env.clone(),
            env: config.env.clone(),
            args: config.effective_args(),
            extra_runtime_args: config.extra_runtime_args.clone(),
        }
    }

    /// The full command line for a run over `workspace` (must be absolute).
    pub fn command(&self, model: &str, workspace: &Path) -> Command {
        let mount = self.workspace_mount.display().to_string();
        let mut cmd = Command::new(&self.runtime);
        cmd.arg("run")
            .arg("--rm")
            .arg("-v")
            .arg(format!("{}:{mount}:rw", workspace.display()))
            .arg("-w")
            .arg(&mount)
            .arg("-e")
            .arg(format!("{}={model}", self.model_env));
        for (key, value) in &self.env {
            cmd.arg("-e").arg(format!("{key}={value}"));
        }
        cmd.args(&self.extra_runtime_args)
            .arg(&self.image)
            .args(&self.args);
        cmd
    }
}

impl AnnotationJob for ContainerJob {
    fn run(&self, model: &str, workspace: &Path) -> Result<(), JobError> {
        let workspace = workspace
            .canonicalize()
            .map_err(|source| JobError::Workspace {
                path: workspace.to_path_buf(),
                source,
            })?;

        tracing::info!(
            image = %self.image,
            model,
            workspace = %workspace.display(),
            "starting annotation job"
        );
        let status = self
            .command(model, &workspace)
            .status()
            .map_err(|source| JobError::Spawn {
                program: self.runtime.clone(),
                source,
            })?;

        if !status.success() {
            return Err(JobError::Failed { status });
        }
        tracing::info!(workspace = %workspace.display(), "annotation job finished");
        Ok(())
    }
}
