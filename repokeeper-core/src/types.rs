//! Domain types for a repokeeper run.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! All types are serializable/deserializable via serde + serde_yaml.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{invalid, ConfigError};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Issue identifier used for the work-branch name and the commit trailer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueId(pub String);

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for IssueId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for IssueId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Name of the disposable work branch recreated on every run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchName(pub String);

impl BranchName {
    /// `feature/<issue>`
    pub fn for_issue(issue: &IssueId) -> Self {
        Self(format!("feature/{}", issue.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for BranchName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BranchName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Model identifier handed to the annotation container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelId(pub String);

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ModelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What the orchestrator does after a project fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the whole run at the first failing project.
    #[default]
    Abort,
    /// Record the failure and move on to the next project.
    Continue,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Abort => write!(f, "abort"),
            FailurePolicy::Continue => write!(f, "continue"),
        }
    }
}

// ---------------------------------------------------------------------------
// Config sections
// ---------------------------------------------------------------------------

/// Commit message templates.
///
/// `title` and `body` may reference `{{ issue }}`, `{{ branch }}`, `{{ model }}`
/// and `{{ project }}`. The `<trailer_key>: <issue>` trailer is appended to the
/// rendered body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitTemplate {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default = "default_trailer_key")]
    pub trailer_key: String,
}

impl Default for CommitTemplate {
    fn default() -> Self {
        Self {
            title: "Annotate unit tests and refresh copyright years".to_string(),
            body: "Generated with model {{ model }} for {{ project }}.".to_string(),
            trailer_key: default_trailer_key(),
        }
    }
}

/// How the annotation container is launched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Container runtime executable (`docker`, `podman`, ...).
    #[serde(default = "default_runtime")]
    pub runtime: String,
    pub image: String,
    /// Mount point of the project working tree inside the container.
    #[serde(default = "default_workspace_mount")]
    pub workspace_mount: PathBuf,
    /// Environment variable that carries the model identifier.
    #[serde(default = "default_model_env")]
    pub model_env: String,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Arguments passed to the image entry point. Defaults to the mount point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    /// Extra flags placed between `run` and the image name (e.g. `--network host`).
    #[serde(default)]
    pub extra_runtime_args: Vec<String>,
    /// Untracked files ending in one of these suffixes are removed after the job.
    #[serde(default)]
    pub cleanup_suffixes: Vec<String>,
}

impl JobConfig {
    /// Entry point arguments with the mount-point default applied.
    pub fn effective_args(&self) -> Vec<String> {
        match &self.args {
            Some(args) => args.clone(),
            None => vec![self.workspace_mount.to_string_lossy().into_owned()],
        }
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
            image: "annotator:latest".to_string(),
            workspace_mount: default_workspace_mount(),
            model_env: default_model_env(),
            env: BTreeMap::new(),
            args: None,
            extra_runtime_args: vec![],
            cleanup_suffixes: vec![],
        }
    }
}

/// Copyright header scanning rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderConfig {
    /// File suffixes (without the dot) that are inspected.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Regex with a named `year` group.
    #[serde(default = "default_pattern")]
    pub pattern: String,
    /// How many leading lines of each file are searched.
    #[serde(default = "default_scan_lines")]
    pub scan_lines: usize,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            pattern: default_pattern(),
            scan_lines: default_scan_lines(),
        }
    }
}

// ---------------------------------------------------------------------------
// RunConfig
// ---------------------------------------------------------------------------

/// Everything one `repokeeper run` needs. Loaded from `config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Processed in this order. Relative entries are resolved against the
    /// directory holding the config file.
    #[serde(default)]
    pub projects: Vec<PathBuf>,
    pub issue: IssueId,
    /// Explicit work-branch name; derived from `issue` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<BranchName>,
    #[serde(default = "default_remote")]
    pub remote: String,
    #[serde(default = "default_mainline")]
    pub mainline: String,
    #[serde(default)]
    pub commit: CommitTemplate,
    pub model: ModelId,
    #[serde(default)]
    pub job: JobConfig,
    #[serde(default)]
    pub headers: HeaderConfig,
    #[serde(default)]
    pub on_error: FailurePolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            projects: vec![],
            issue: IssueId::from("PROJ-0000"),
            branch: None,
            remote: default_remote(),
            mainline: default_mainline(),
            commit: CommitTemplate::default(),
            model: ModelId::from("qwen3:4b"),
            job: JobConfig::default(),
            headers: HeaderConfig::default(),
            on_error: FailurePolicy::default(),
        }
    }
}

impl RunConfig {
    /// The work branch: explicit `branch` or `feature/<issue>`.
    pub fn work_branch(&self) -> BranchName {
        self.branch
            .clone()
            .unwrap_or_else(|| BranchName::for_issue(&self.issue))
    }

    /// Rewrite relative project paths so they are anchored at `base`.
    pub fn resolve_projects(&mut self, base: &Path) {
        for project in &mut self.projects {
            if project.is_relative() {
                *project = base.join(&*project);
            }
        }
    }

    /// Reject values that would make a run meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issue.0.trim().is_empty() {
            return Err(invalid("issue", "must not be empty"));
        }
        if let Some(branch) = &self.branch {
            if branch.0.trim().is_empty() {
                return Err(invalid("branch", "must not be empty when set"));
            }
        }
        if self.model.0.trim().is_empty() {
            return Err(invalid("model", "must not be empty"));
        }
        if self.remote.trim().is_empty() {
            return Err(invalid("remote", "must not be empty"));
        }
        if self.mainline.trim().is_empty() {
            return Err(invalid("mainline", "must not be empty"));
        }
        if self.commit.title.trim().is_empty() {
            return Err(invalid("commit.title", "must not be empty"));
        }
        if self.job.image.trim().is_empty() {
            return Err(invalid("job.image", "must not be empty"));
        }
        if self.job.runtime.trim().is_empty() {
            return Err(invalid("job.runtime", "must not be empty"));
        }
        if self.headers.extensions.is_empty() {
            return Err(invalid("headers.extensions", "at least one extension is required"));
        }
        if self.headers.scan_lines == 0 {
            return Err(invalid("headers.scan_lines", "must be greater than zero"));
        }
        Ok(())
    }
}

fn default_trailer_key() -> String {
    "Issue".to_string()
}

fn default_runtime() -> String {
    "docker".to_string()
}

fn default_workspace_mount() -> PathBuf {
    PathBuf::from("/workspace")
}

fn default_model_env() -> String {
    "MODEL_NAME".to_string()
}

fn default_extensions() -> Vec<String> {
    ["c", "cc", "cpp", "cxx", "h", "hh", "hpp", "hxx"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_pattern() -> String {
    r"Copyright ©\s*(?P<year>\d{4})".to_string()
}

fn default_scan_lines() -> usize {
    10
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_mainline() -> String {
    "main".to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
