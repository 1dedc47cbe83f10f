//! `repokeeper run`: the full batch.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use repokeeper_job::ContainerJob;
use repokeeper_pipeline::{ProjectOrchestrator, ProjectOutcome, RunOptions, RunReport};
use repokeeper_vcs::GitCli;

use super::ConfigSource;

/// Arguments for `repokeeper run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigSource,

    /// Process only projects with this directory name (repeatable).
    #[arg(long = "only", value_name = "NAME")]
    pub only: Vec<String>,

    /// Do not launch the annotation container; reconcile headers only.
    #[arg(long)]
    pub skip_job: bool,

    /// Commit locally but do not push the work branch.
    #[arg(long)]
    pub no_push: bool,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let cfg = self.config.load()?;
        let projects = select_projects(&cfg.projects, &self.only)?;

        let vcs = GitCli::new();
        let job = ContainerJob::from_config(&cfg.job);
        let options = RunOptions {
            run_job: !self.skip_job,
            push: !self.no_push,
        };
        let orchestrator = ProjectOrchestrator::new(&cfg, &vcs, &job, options)
            .context("invalid header configuration")?;

        tracing::info!(
            projects = projects.len(),
            branch = %cfg.work_branch(),
            model = %cfg.model,
            "starting run"
        );
        let report = orchestrator.run(&projects);
        print_summary(&report, projects.len());

        let failed = report.failures().count();
        if let Some(failure) = report.first_failure() {
            if failed > 1 {
                bail!("{failed} projects failed; first: {failure}");
            }
            bail!("{failure}");
        }
        Ok(())
    }
}

/// Narrow `projects` to those whose final path component is listed in `only`.
/// Every requested name must match at least one project.
fn select_projects(projects: &[PathBuf], only: &[String]) -> Result<Vec<PathBuf>> {
    if only.is_empty() {
        return Ok(projects.to_vec());
    }
    if let Some(missing) = only
        .iter()
        .find(|name| !projects.iter().any(|p| dir_name(p) == name.as_str()))
    {
        bail!("no configured project named `{missing}`");
    }
    Ok(projects
        .iter()
        .filter(|p| only.iter().any(|name| dir_name(p) == name.as_str()))
        .cloned()
        .collect())
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn print_summary(report: &RunReport, requested: usize) {
    for entry in &report.projects {
        let name = entry.project.display();
        match &entry.result {
            Ok(ProjectOutcome::NotVersioned) => {
                println!("{} {name} — skipped (not a git repository)", "-".dimmed())
            }
            Ok(ProjectOutcome::NoChange) => println!("{} {name} — no changes", "·".dimmed()),
            Ok(ProjectOutcome::Committed { reconciled, pushed }) => {
                let push = if *pushed { "pushed" } else { "not pushed" };
                println!(
                    "{} {name} — committed ({reconciled} header(s) updated, {push})",
                    "✓".green()
                )
            }
            Err(failure) => println!(
                "{} {name} — failed during {}",
                "✗".red(),
                failure.stage.to_string().bold()
            ),
        }
    }

    let skipped = requested - report.projects.len();
    let elapsed = report.finished_at - report.started_at;
    let mut line = format!(
        "{} of {requested} project(s) processed in {}s",
        report.projects.len(),
        elapsed.num_seconds()
    );
    if skipped > 0 {
        line.push_str(&format!(", {skipped} not attempted"));
    }
    println!("{}", line.dimmed());
}
