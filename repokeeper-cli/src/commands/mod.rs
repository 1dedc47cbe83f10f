//! Subcommand implementations.

pub mod config;
pub mod headers;
pub mod projects;
pub mod run;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use repokeeper_core::{config as config_file, ConfigError, RunConfig};

/// `--config <file>` shared by every command that reads configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigSource {
    /// Config file to use instead of ~/.repokeeper/config.yaml.
    #[arg(id = "config", long = "config", short = 'c', value_name = "FILE")]
    pub path: Option<PathBuf>,
}

impl ConfigSource {
    /// The file this source points at.
    pub fn resolve(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => config_file::config_path().context("could not determine home directory"),
        }
    }

    /// Load and validate the configuration.
    pub fn load(&self) -> Result<RunConfig> {
        let path = self.resolve()?;
        config_file::load_at(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))
    }

    /// Like [`load`](Self::load), but fall back to defaults when the default
    /// config file does not exist. An explicit `--config` must exist.
    pub fn load_or_default(&self) -> Result<RunConfig> {
        let path = self.resolve()?;
        match config_file::load_at(&path) {
            Ok(cfg) => Ok(cfg),
            Err(ConfigError::NotFound { .. }) if self.path.is_none() => Ok(RunConfig::default()),
            Err(err) => Err(err)
                .with_context(|| format!("failed to load config from {}", path.display())),
        }
    }
}
