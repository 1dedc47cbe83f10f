//! Detect working-tree drift and turn it into one pushed commit.

use std::path::Path;

use serde::Serialize;
use tera::{Context, Tera};

use repokeeper_core::{BranchName, CommitTemplate};
use repokeeper_vcs::Vcs;

use crate::error::PipelineError;

/// Values available to commit templates.
#[derive(Debug, Clone, Serialize)]
pub struct MessageVars<'a> {
    pub issue: &'a str,
    pub branch: &'a str,
    pub model: &'a str,
    pub project: &'a str,
}

/// A rendered commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    pub title: String,
    pub body: String,
}

impl CommitMessage {
    /// Render `template` and append the `<trailer_key>: <issue>` trailer
    /// unless the body already ends with it.
    pub fn render(template: &CommitTemplate, vars: &MessageVars<'_>) -> Result<Self, PipelineError> {
        let ctx = Context::from_serialize(vars)?;
        let title = Tera::one_off(&template.title, &ctx, false)?.trim().to_string();
        let body = Tera::one_off(&template.body, &ctx, false)?;
        let body = body.trim_end();

        let trailer = format!("{}: {}", template.trailer_key, vars.issue);
        let has_trailer = body
            .lines()
            .last()
            .map(|line| line.trim() == trailer)
            .unwrap_or(false);
        let body = if has_trailer {
            body.to_string()
        } else if body.trim().is_empty() {
            trailer
        } else {
            format!("{body}\n\n{trailer}")
        };

        Ok(Self { title, body })
    }
}

/// What the committer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Tracked files match the last commit; nothing was committed or pushed.
    NoChange,
    Committed { pushed: bool },
}

/// Stages tracked modifications, commits once, and force-pushes the work branch.
pub struct ChangeCommitter<'a> {
    vcs: &'a dyn Vcs,
    remote: &'a str,
    push: bool,
}

impl<'a> ChangeCommitter<'a> {
    pub fn new(vcs: &'a dyn Vcs, remote: &'a str, push: bool) -> Self {
        Self { vcs, remote, push }
    }

    /// The message is rendered only once drift has been found, so a template
    /// problem cannot fail a project with nothing to commit.
    pub fn commit(
        &self,
        repo: &Path,
        branch: &BranchName,
        template: &CommitTemplate,
        vars: &MessageVars<'_>,
    ) -> Result<CommitOutcome, PipelineError> {
        tracing::info!(project = %repo.display(), "checking for changes");
        let differs = self
            .vcs
            .working_tree_differs(repo)
            .map_err(PipelineError::Commit)?;
        if !differs {
            tracing::info!(project = %repo.display(), "no changes");
            return Ok(CommitOutcome::NoChange);
        }
        let message = CommitMessage::render(template, vars)?;

        self.vcs.stage_modified(repo).map_err(PipelineError::Commit)?;
        self.vcs
            .commit(repo, &message.title, &message.body)
            .map_err(PipelineError::Commit)?;
        tracing::info!(project = %repo.display(), title = %message.title, "committed");

        if !self.push {
            tracing::info!(project = %repo.display(), "push skipped");
            return Ok(CommitOutcome::Committed { pushed: false });
        }

        self.vcs
            .force_push(repo, self.remote, branch.as_str(), branch.as_str())
            .map_err(PipelineError::Push)?;
        tracing::info!(
            project = %repo.display(),
            "pushed {branch} to {}/{branch}",
            self.remote
        );
        Ok(CommitOutcome::Committed { pushed: true })
    }
}
