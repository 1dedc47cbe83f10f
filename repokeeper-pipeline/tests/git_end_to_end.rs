//! Full pipeline over a real git checkout and bare remote.
//!
//! The annotation container is replaced by an in-process job; everything
//! else (sync, history years, commit, force push) runs through `GitCli`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use repokeeper_core::{IssueId, RunConfig};
use repokeeper_job::{AnnotationJob, JobError};
use repokeeper_pipeline::{ProjectOrchestrator, ProjectOutcome, RunOptions};
use repokeeper_vcs::GitCli;
use tempfile::TempDir;

fn git(dir: &Path, args: &[&str], date: Option<&str>) -> (bool, String) {
    let mut cmd = Command::new("git");
    cmd.args(args).current_dir(dir);
    if let Some(date) = date {
        cmd.env("GIT_AUTHOR_DATE", date).env("GIT_COMMITTER_DATE", date);
    }
    let output = cmd.output().expect("run git");
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).trim().to_string(),
    )
}

fn git_ok(dir: &Path, args: &[&str], date: Option<&str>) -> String {
    let (ok, out) = git(dir, args, date);
    assert!(ok, "git {args:?} failed");
    out
}

/// Bare remote seeded with `a.h` (committed in 2019) and `test.cpp`, plus a
/// clone with a commit identity.
fn fleet(header: &str) -> (TempDir, PathBuf, PathBuf) {
    let root = TempDir::new().unwrap();
    let remote = root.path().join("remote.git");
    let seed = root.path().join("seed");
    let clone = root.path().join("widget");

    fs::create_dir_all(&remote).unwrap();
    git_ok(&remote, &["init", "--bare", "-b", "main"], None);
    fs::create_dir_all(&seed).unwrap();
    git_ok(&seed, &["init", "-b", "main"], None);
    git_ok(&seed, &["config", "user.email", "bot@example.com"], None);
    git_ok(&seed, &["config", "user.name", "Repo Bot"], None);
    fs::write(seed.join("a.h"), header).unwrap();
    fs::write(seed.join("test.cpp"), "TEST(Widget, Works) {\n}\n").unwrap();
    git_ok(&seed, &["add", "."], None);
    git_ok(&seed, &["commit", "-m", "seed"], Some("2019-06-01T12:00:00"));
    git_ok(&seed, &["remote", "add", "origin", remote.to_str().unwrap()], None);
    git_ok(&seed, &["push", "origin", "main"], None);

    git_ok(
        root.path(),
        &["clone", "-b", "main", remote.to_str().unwrap(), clone.to_str().unwrap()],
        None,
    );
    git_ok(&clone, &["config", "user.email", "bot@example.com"], None);
    git_ok(&clone, &["config", "user.name", "Repo Bot"], None);
    (root, remote, clone)
}

/// Stands in for the annotation container.
struct CommentingJob {
    annotate: bool,
}

impl AnnotationJob for CommentingJob {
    fn run(&self, _model: &str, workspace: &Path) -> Result<(), JobError> {
        if self.annotate {
            let path = workspace.join("test.cpp");
            let text = fs::read_to_string(&path).unwrap();
            fs::write(&path, format!("/*\n * Checks that widgets work.\n */\n{text}")).unwrap();
        }
        Ok(())
    }
}

fn config(project: PathBuf) -> RunConfig {
    let mut cfg = RunConfig {
        projects: vec![project],
        issue: IssueId::from("ABC-1"),
        ..RunConfig::default()
    };
    cfg.job.image = "annotator:test".to_string();
    cfg
}

#[test]
fn annotated_and_reconciled_tree_lands_on_remote_work_branch() {
    let (_root, remote, clone) = fleet("// Copyright © 2015 Example Corp\n");
    let cfg = config(clone.clone());
    let vcs = GitCli::new();
    let job = CommentingJob { annotate: true };

    let report = ProjectOrchestrator::new(&cfg, &vcs, &job, RunOptions::default())
        .unwrap()
        .run_all();

    assert!(report.succeeded(), "{:?}", report.first_failure());
    assert_eq!(
        report.outcomes().next().unwrap().1,
        &ProjectOutcome::Committed {
            reconciled: 1,
            pushed: true
        }
    );

    let header = git_ok(&remote, &["show", "feature/ABC-1:a.h"], None);
    assert_eq!(header, "// Copyright © 2019 Example Corp");
    let test = git_ok(&remote, &["show", "feature/ABC-1:test.cpp"], None);
    assert!(test.starts_with("/*\n * Checks that widgets work."));

    let message = git_ok(&clone, &["log", "-1", "--format=%B"], None);
    assert!(message.ends_with("Issue: ABC-1"), "message: {message}");
    assert_eq!(git_ok(&remote, &["rev-list", "--count", "main..feature/ABC-1"], None), "1");
}

#[test]
fn rerun_resets_work_branch_instead_of_appending() {
    let (_root, remote, clone) = fleet("// Copyright © 2015 Example Corp\n");
    let cfg = config(clone.clone());
    let vcs = GitCli::new();
    let job = CommentingJob { annotate: true };
    let orchestrator = ProjectOrchestrator::new(&cfg, &vcs, &job, RunOptions::default()).unwrap();

    assert!(orchestrator.run_all().succeeded());
    assert!(orchestrator.run_all().succeeded());

    assert_eq!(git_ok(&remote, &["rev-list", "--count", "main..feature/ABC-1"], None), "1");
}

#[test]
fn untouched_tree_creates_no_commit_and_no_remote_branch() {
    let (_root, remote, clone) = fleet("// Copyright © 2019 Example Corp\n");
    let cfg = config(clone.clone());
    let vcs = GitCli::new();
    let job = CommentingJob { annotate: false };
    let main_tip = git_ok(&clone, &["rev-parse", "HEAD"], None);

    let report = ProjectOrchestrator::new(&cfg, &vcs, &job, RunOptions::default())
        .unwrap()
        .run_all();

    assert_eq!(report.outcomes().next().unwrap().1, &ProjectOutcome::NoChange);
    assert_eq!(git_ok(&clone, &["rev-parse", "HEAD"], None), main_tip);
    let (exists, _) = git(&remote, &["rev-parse", "--verify", "refs/heads/feature/ABC-1"], None);
    assert!(!exists, "no push may happen without changes");
}

#[test]
fn edits_left_by_an_interrupted_run_are_not_published() {
    let (_root, remote, clone) = fleet("// Copyright © 2019 Example Corp\n");
    fs::write(clone.join("test.cpp"), "int x; // half-written\n").unwrap();
    let cfg = config(clone.clone());
    let vcs = GitCli::new();
    let job = CommentingJob { annotate: false };

    let report = ProjectOrchestrator::new(&cfg, &vcs, &job, RunOptions::default())
        .unwrap()
        .run_all();

    assert_eq!(report.outcomes().next().unwrap().1, &ProjectOutcome::NoChange);
    assert_eq!(
        fs::read_to_string(clone.join("test.cpp")).unwrap(),
        "TEST(Widget, Works) {\n}\n"
    );
    let (exists, _) = git(&remote, &["rev-parse", "--verify", "refs/heads/feature/ABC-1"], None);
    assert!(!exists);
}

#[test]
#[cfg(unix)]
fn tracked_symlink_keeps_its_link_mode() {
    let (_root, remote, clone) = fleet("// Copyright © 2015 Example Corp\n");
    std::os::unix::fs::symlink("a.h", clone.join("alias.h")).unwrap();
    git_ok(&clone, &["add", "alias.h"], None);
    git_ok(&clone, &["commit", "-m", "alias"], Some("2019-07-01T12:00:00"));
    git_ok(&clone, &["push", "origin", "main"], None);
    let cfg = config(clone.clone());
    let vcs = GitCli::new();
    let job = CommentingJob { annotate: false };

    let report = ProjectOrchestrator::new(&cfg, &vcs, &job, RunOptions::default())
        .unwrap()
        .run_all();

    assert_eq!(
        report.outcomes().next().unwrap().1,
        &ProjectOutcome::Committed {
            reconciled: 1,
            pushed: true
        }
    );
    let entry = git_ok(&remote, &["ls-tree", "feature/ABC-1", "alias.h"], None);
    assert!(entry.starts_with("120000 "), "alias.h entry: {entry}");
    assert!(fs::symlink_metadata(clone.join("alias.h")).unwrap().file_type().is_symlink());
    assert_eq!(
        git_ok(&remote, &["show", "feature/ABC-1:a.h"], None),
        "// Copyright © 2019 Example Corp"
    );
}
