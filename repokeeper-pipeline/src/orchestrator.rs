//! Sequential multi-project driver.
//!
//! Projects run strictly one after another, in list order. Whether a failure
//! stops the run is decided here from [`FailurePolicy`], never inside a stage.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use repokeeper_core::{FailurePolicy, RunConfig};
use repokeeper_headers::HeaderRules;
use repokeeper_job::AnnotationJob;
use repokeeper_vcs::Vcs;

use crate::error::{PipelineError, ProjectFailure};
use crate::project::{ProjectOutcome, ProjectPipeline, RunOptions};

/// Result for one processed project.
#[derive(Debug)]
pub struct ProjectReport {
    pub project: PathBuf,
    pub result: Result<ProjectOutcome, ProjectFailure>,
}

/// Everything that happened during one run.
#[derive(Debug)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// In processing order. Under [`FailurePolicy::Abort`] the last entry is
    /// the failure that stopped the run.
    pub projects: Vec<ProjectReport>,
}

impl RunReport {
    /// True when no project failed.
    pub fn succeeded(&self) -> bool {
        self.projects.iter().all(|p| p.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ProjectFailure> {
        self.projects.iter().filter_map(|p| p.result.as_ref().err())
    }

    pub fn first_failure(&self) -> Option<&ProjectFailure> {
        self.failures().next()
    }

    pub fn outcomes(&self) -> impl Iterator<Item = (&Path, &ProjectOutcome)> {
        self.projects
            .iter()
            .filter_map(|p| p.result.as_ref().ok().map(|o| (p.project.as_path(), o)))
    }
}

/// Drives [`ProjectPipeline`] over a project list.
pub struct ProjectOrchestrator<'a> {
    config: &'a RunConfig,
    vcs: &'a dyn Vcs,
    job: &'a dyn AnnotationJob,
    rules: HeaderRules,
    options: RunOptions,
}

impl<'a> ProjectOrchestrator<'a> {
    /// Compiles the header rules up front so a bad pattern fails before any
    /// repository is touched.
    pub fn new(
        config: &'a RunConfig,
        vcs: &'a dyn Vcs,
        job: &'a dyn AnnotationJob,
        options: RunOptions,
    ) -> Result<Self, PipelineError> {
        let rules = HeaderRules::new(
            &config.headers.extensions,
            &config.headers.pattern,
            config.headers.scan_lines,
        )?;
        Ok(Self {
            config,
            vcs,
            job,
            rules,
            options,
        })
    }

    /// Process every configured project.
    pub fn run_all(&self) -> RunReport {
        self.run(&self.config.projects)
    }

    /// Process `projects` in order, honouring the failure policy.
    pub fn run(&self, projects: &[PathBuf]) -> RunReport {
        let started_at = Utc::now();
        let pipeline = ProjectPipeline::new(
            self.config,
            self.vcs,
            self.job,
            &self.rules,
            self.options,
        );
        let total = projects.len();
        let mut reports = Vec::with_capacity(total);

        for (index, project) in projects.iter().enumerate() {
            tracing::info!(
                project = %project.display(),
                "processing project {}/{total}",
                index + 1
            );
            let result = pipeline
                .run(project)
                .map_err(|err| ProjectFailure::new(project, err));

            let failed = match &result {
                Ok(outcome) => {
                    tracing::info!(project = %project.display(), ?outcome, "project done");
                    false
                }
                Err(failure) => {
                    tracing::error!(
                        project = %project.display(),
                        stage = %failure.stage,
                        error = %failure.source,
                        "project failed"
                    );
                    true
                }
            };
            reports.push(ProjectReport {
                project: project.clone(),
                result,
            });

            if failed && self.config.on_error == FailurePolicy::Abort {
                let remaining = total - index - 1;
                if remaining > 0 {
                    tracing::error!("aborting run; {remaining} project(s) not processed");
                }
                break;
            }
        }

        RunReport {
            started_at,
            finished_at: Utc::now(),
            projects: reports,
        }
    }
}
