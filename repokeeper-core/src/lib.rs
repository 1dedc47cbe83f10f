//! Repokeeper core library: run configuration types, config persistence, errors.
//!
//! - [`types`]: newtypes and the [`RunConfig`] structure
//! - [`error`]: [`ConfigError`]
//! - [`config`]: load / save / init of `~/.repokeeper/config.yaml`

pub mod config;
pub mod error;
pub mod types;

pub use error::ConfigError;
pub use types::{
    BranchName, CommitTemplate, FailurePolicy, HeaderConfig, IssueId, JobConfig, ModelId,
    RunConfig,
};
