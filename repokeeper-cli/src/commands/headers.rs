//! `repokeeper headers`: reconcile copyright years in one checkout.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use repokeeper_headers::{HeaderRules, Mode};
use repokeeper_pipeline::reconcile::reconcile_repository;
use repokeeper_vcs::{GitCli, Vcs};

use super::ConfigSource;

/// Arguments for `repokeeper headers`.
#[derive(Args, Debug)]
pub struct HeadersArgs {
    /// Repository to reconcile.
    pub path: PathBuf,

    #[command(flatten)]
    pub config: ConfigSource,

    /// Print the diffs that would be applied without writing anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl HeadersArgs {
    pub fn run(self) -> Result<()> {
        let cfg = self.config.load_or_default()?;
        let rules = HeaderRules::new(
            &cfg.headers.extensions,
            &cfg.headers.pattern,
            cfg.headers.scan_lines,
        )
        .context("invalid header configuration")?;

        let vcs = GitCli::new();
        if !vcs.is_repository(&self.path) {
            bail!("{} is not a git repository", self.path.display());
        }

        let mode = if self.dry_run { Mode::DryRun } else { Mode::Apply };
        let report = reconcile_repository(&vcs, &self.path, &rules, mode)?;

        if self.dry_run {
            for change in &report.changes {
                print!("{}", change.unified_diff());
            }
            println!(
                "{} file(s) would change ({} inspected)",
                report.changed(),
                report.inspected
            );
            return Ok(());
        }

        for change in &report.changes {
            println!(
                "{} {}:{} {} → {}",
                "✓".green(),
                change.path.display(),
                change.line,
                change.old_year,
                change.new_year
            );
        }
        println!(
            "{}",
            format!(
                "{} header(s) updated, {} up to date, {} without history",
                report.changed(),
                report.up_to_date,
                report.no_history
            )
            .dimmed()
        );
        Ok(())
    }
}
