//! The `GitBackend` trait and its system-git implementation.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::error::GitError;

/// Narrow porcelain interface over the external git binary.
///
/// Callers pass an argv vector and a working directory; the implementation
/// runs the command to completion and captures its output. Keeping this seam
/// small means an alternate backend can satisfy it without touching callers.
#[async_trait]
pub trait GitBackend: Send + Sync {
    /// Run git, treating a non-zero exit as an error.
    ///
    /// Returns captured stdout on success.
    ///
    /// # Errors
    ///
    /// Returns `GitError::CommandFailed` with captured stderr when git exits
    /// non-zero, or `GitError::NotFound`/`GitError::Io` when it cannot be run.
    async fn run(&self, cwd: &Path, args: &[&str]) -> Result<String, GitError>;

    /// Run git, treating a non-zero exit as a negative answer.
    ///
    /// Returns `Ok(Some(stdout))` when git exits zero and `Ok(None)` when it
    /// exits non-zero. Used for existence probes (`rev-parse --verify`,
    /// `show-ref`) where failure is an expected outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only when the subprocess cannot be spawned or reaped.
    async fn query(&self, cwd: &Path, args: &[&str]) -> Result<Option<String>, GitError>;
}

/// `GitBackend` implementation that shells out to the real `git` binary.
#[derive(Debug, Clone)]
pub struct SystemGit {
    program: PathBuf,
}

impl SystemGit {
    /// Create a backend using `git` from PATH.
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }

    /// Create a backend using a specific git binary (for testing).
    #[must_use]
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn output(&self, cwd: &Path, args: &[&str]) -> Result<std::process::Output, GitError> {
        tracing::trace!(cwd = %cwd.display(), ?args, "running git");
        Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::NotFound => GitError::NotFound,
                _ => GitError::Io(err),
            })
    }
}

impl Default for SystemGit {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GitBackend for SystemGit {
    async fn run(&self, cwd: &Path, args: &[&str]) -> Result<String, GitError> {
        let output = self.output(cwd, args).await?;
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn query(&self, cwd: &Path, args: &[&str]) -> Result<Option<String>, GitError> {
        let output = self.output(cwd, args).await?;
        if output.status.success() {
            Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
        } else {
            Ok(None)
        }
    }
}
