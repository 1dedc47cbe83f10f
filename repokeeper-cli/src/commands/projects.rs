//! `repokeeper projects`: what a run would touch.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use repokeeper_vcs::{GitCli, Vcs};

use super::ConfigSource;

/// Arguments for `repokeeper projects`.
#[derive(Args, Debug)]
pub struct ProjectsArgs {
    #[command(flatten)]
    pub config: ConfigSource,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct ProjectRow {
    #[tabled(rename = "PROJECT")]
    name: String,
    #[tabled(rename = "PATH")]
    path: String,
    #[tabled(rename = "GIT")]
    versioned: bool,
    #[tabled(rename = "BRANCH")]
    branch: String,
}

impl ProjectsArgs {
    pub fn run(self) -> Result<()> {
        let cfg = self.config.load()?;
        let vcs = GitCli::new();

        let rows: Vec<ProjectRow> = cfg
            .projects
            .iter()
            .map(|path| {
                let versioned = vcs.is_repository(path);
                let branch = if versioned {
                    vcs.current_branch(path).unwrap_or_else(|_| "?".to_string())
                } else {
                    "-".to_string()
                };
                ProjectRow {
                    name: path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    path: path.display().to_string(),
                    versioned,
                    branch,
                }
            })
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }
        if rows.is_empty() {
            println!("No projects configured.");
            return Ok(());
        }
        println!("{}", Table::new(&rows).with(Style::rounded()));
        println!("work branch: {}", cfg.work_branch());
        Ok(())
    }
}
