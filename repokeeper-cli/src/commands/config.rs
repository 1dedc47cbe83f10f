//! `repokeeper config`: manage the configuration file.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use repokeeper_core::{config as config_file, RunConfig};

use super::ConfigSource;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a default config file unless one already exists.
    Init(ConfigSource),
    /// Print the effective configuration as YAML.
    Show(ConfigSource),
    /// Print the config file location.
    Path(ConfigSource),
}

pub fn run(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Init(source) => init(&source),
        ConfigCommand::Show(source) => {
            let cfg = source.load()?;
            print!("{}", serde_yaml::to_string(&cfg)?);
            Ok(())
        }
        ConfigCommand::Path(source) => {
            println!("{}", source.resolve()?.display());
            Ok(())
        }
    }
}

fn init(source: &ConfigSource) -> Result<()> {
    let path = source.resolve()?;
    let created = match &source.path {
        Some(explicit) => init_explicit(explicit)?,
        None => {
            let (_, created) = config_file::init().context("failed to initialise config")?;
            created
        }
    };
    if created {
        println!("{} Created {}", "✓".green(), path.display());
        println!("  Edit `projects` and `job.image`, then run `repokeeper run`.");
    } else {
        println!("Config already exists at {}", path.display());
    }
    Ok(())
}

fn init_explicit(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    config_file::save_at(path, &RunConfig::default())
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}
