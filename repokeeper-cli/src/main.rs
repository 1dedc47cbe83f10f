//! Repokeeper: batch test annotation and copyright-year upkeep across a fleet
//! of git repositories.
//!
//! # Usage
//!
//! ```text
//! repokeeper run [--config <file>] [--only <name>]... [--skip-job] [--no-push]
//! repokeeper headers <path> [--config <file>] [--dry-run]
//! repokeeper projects [--config <file>] [--json]
//! repokeeper config init|show|path [--config <file>]
//! ```

mod commands;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    config::ConfigCommand, headers::HeadersArgs, projects::ProjectsArgs, run::RunArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "repokeeper",
    version,
    about = "Annotate tests and refresh copyright years across many repositories",
    long_about = None,
)]
struct Cli {
    /// Log at debug level (RUST_LOG still takes precedence).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sync, annotate, reconcile headers, and push every configured project.
    Run(RunArgs),

    /// Reconcile copyright headers in one repository without syncing or pushing.
    Headers(HeadersArgs),

    /// List configured projects and their repository state.
    Projects(ProjectsArgs),

    /// Create, show, or locate the configuration file.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Headers(args) => args.run(),
        Commands::Projects(args) => args.run(),
        Commands::Config { command } => commands::config::run(command),
    }
}
