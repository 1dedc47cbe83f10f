use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::{Vcs, VcsError};

/// [`Vcs`] backed by the `git` command-line client.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    /// Use `git` from `PATH`.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }

    /// Use a specific git executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run git in `repo`; returns the raw output whatever the exit status.
    fn exec<I, S>(&self, repo: &Path, args: I) -> Result<(String, Output), VcsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let rendered = args
            .iter()
            .map(|a| a.as_ref().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ");
        tracing::debug!(repo = %repo.display(), "git {rendered}");

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(repo)
            .output()
            .map_err(|source| VcsError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;
        Ok((rendered, output))
    }

    /// Run git in `repo` and fail on a non-zero exit.
    fn run<I, S>(&self, repo: &Path, args: I) -> Result<Output, VcsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let (rendered, output) = self.exec(repo, args)?;
        if !output.status.success() {
            return Err(VcsError::Command {
                args: rendered,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }

    fn list_files(&self, repo: &Path, extra: &[&str]) -> Result<Vec<PathBuf>, VcsError> {
        let mut args = vec!["ls-files", "-z"];
        args.extend_from_slice(extra);
        let output = self.run(repo, &args)?;
        Ok(split_nul(&output.stdout))
    }
}

impl Vcs for GitCli {
    fn is_repository(&self, repo: &Path) -> bool {
        // `.git` is a directory in a regular checkout and a file in worktrees.
        repo.join(".git").exists()
    }

    fn fetch(&self, repo: &Path, remote: &str) -> Result<(), VcsError> {
        self.run(repo, ["fetch", "--prune", remote])?;
        Ok(())
    }

    fn discard_local_changes(&self, repo: &Path) -> Result<(), VcsError> {
        self.run(repo, ["reset", "--hard", "--quiet", "HEAD"])?;
        Ok(())
    }

    fn checkout(&self, repo: &Path, reference: &str) -> Result<(), VcsError> {
        self.run(repo, ["checkout", reference])?;
        Ok(())
    }

    fn pull_fast_forward_only(
        &self,
        repo: &Path,
        remote: &str,
        branch: &str,
    ) -> Result<(), VcsError> {
        self.run(repo, ["pull", "--ff-only", remote, branch])?;
        Ok(())
    }

    fn create_or_reset_branch(&self, repo: &Path, name: &str) -> Result<(), VcsError> {
        self.run(repo, ["checkout", "-B", name])?;
        Ok(())
    }

    fn current_branch(&self, repo: &Path) -> Result<String, VcsError> {
        let output = self.run(repo, ["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn tracked_files(&self, repo: &Path) -> Result<Vec<PathBuf>, VcsError> {
        self.list_files(repo, &[])
    }

    fn untracked_files(&self, repo: &Path) -> Result<Vec<PathBuf>, VcsError> {
        self.list_files(repo, &["--others", "--exclude-standard"])
    }

    fn last_change_year(&self, repo: &Path, path: &Path) -> Result<Option<i32>, VcsError> {
        let args: [&OsStr; 6] = [
            OsStr::new("log"),
            OsStr::new("-1"),
            OsStr::new("--format=%cd"),
            OsStr::new("--date=format:%Y"),
            OsStr::new("--"),
            path.as_os_str(),
        ];
        let output = self.run(repo, args)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let year = stdout.trim();
        if year.is_empty() {
            return Ok(None);
        }
        year.parse::<i32>()
            .map(Some)
            .map_err(|e| VcsError::Output {
                args: format!("log -1 -- {}", path.display()),
                detail: format!("'{year}' is not a year: {e}"),
            })
    }

    fn working_tree_differs(&self, repo: &Path) -> Result<bool, VcsError> {
        // Exit 0 = identical, 1 = differences, anything else = failure.
        let (rendered, output) = self.exec(repo, ["diff", "--quiet", "HEAD", "--"])?;
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(VcsError::Command {
                args: rendered,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }

    fn stage_modified(&self, repo: &Path) -> Result<(), VcsError> {
        self.run(repo, ["add", "--update"])?;
        Ok(())
    }

    fn commit(&self, repo: &Path, title: &str, body: &str) -> Result<(), VcsError> {
        let mut args = vec!["commit", "--quiet", "-m", title];
        if !body.trim().is_empty() {
            args.extend(["-m", body]);
        }
        self.run(repo, &args)?;
        Ok(())
    }

    fn force_push(
        &self,
        repo: &Path,
        remote: &str,
        branch: &str,
        remote_ref: &str,
    ) -> Result<(), VcsError> {
        let refspec = format!("{branch}:refs/heads/{remote_ref}");
        self.run(repo, ["push", "--force", remote, refspec.as_str()])?;
        Ok(())
    }
}

fn split_nul(bytes: &[u8]) -> Vec<PathBuf> {
    bytes
        .split(|b| *b == 0)
        .filter(|entry| !entry.is_empty())
        .map(path_from_bytes)
        .collect()
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn split_nul_drops_trailing_terminator() {
        let files = split_nul(b"a.h\0src/b.cpp\0");
        assert_eq!(files, vec![PathBuf::from("a.h"), PathBuf::from("src/b.cpp")]);
    }

    #[test]
    fn split_nul_empty_output() {
        assert!(split_nul(b"").is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn split_nul_keeps_non_utf8_names_exact() {
        use std::os::unix::ffi::OsStrExt;

        let files = split_nul(b"caf\xe9.h\0");
        assert_eq!(files[0].as_os_str().as_bytes(), b"caf\xe9.h");
    }

    #[test]
    fn plain_directory_is_not_a_repository() {
        let dir = TempDir::new().unwrap();
        assert!(!GitCli::new().is_repository(dir.path()));
    }

    #[test]
    fn git_file_counts_as_repository() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".git"), "gitdir: ../elsewhere\n").unwrap();
        assert!(GitCli::new().is_repository(dir.path()));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let dir = TempDir::new().unwrap();
        let git = GitCli::with_program("/nonexistent/git-binary");
        let err = git.fetch(dir.path(), "origin").unwrap_err();
        assert!(matches!(err, VcsError::Spawn { .. }), "got: {err}");
    }
}
