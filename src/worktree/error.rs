//! Worktree error types.

use std::path::PathBuf;

use crate::git::GitError;

/// Errors from worktree lifecycle operations.
#[derive(thiserror::Error, Debug)]
pub enum WorktreeError {
    /// No worktree matched the given name or branch.
    #[error("worktree not found: {0}")]
    NotFound(String),

    /// A worktree or branch with this name already exists.
    #[error("worktree already exists: {0}")]
    AlreadyExists(String),

    /// The new name of a rename equals the old one.
    #[error("new name matches the current name: {0}")]
    SameName(String),

    /// The target branch of a rename already exists.
    #[error("branch already exists: {0}")]
    BranchExists(String),

    /// The destination directory of a rename or add already exists.
    #[error("destination directory already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    /// The worktree has uncommitted changes.
    #[error("worktree has uncommitted changes: {0}")]
    Dirty(String),

    /// The worktree is administratively locked.
    #[error("worktree is locked: {0}")]
    Locked(String),

    /// The caller's working directory is inside the worktree being mutated.
    #[error("current directory is inside worktree {}; run from elsewhere", .0.display())]
    InsideTarget(PathBuf),

    /// A command run in one worktree of a batch exited non-zero.
    #[error("command failed in worktree '{target}' (exit code {code})")]
    ExecFailed {
        /// Name of the worktree the command ran in.
        target: String,
        /// Exit code, `-1` when terminated by signal.
        code: i32,
    },

    /// Aggregate failure of a batch operation. Successful targets stay
    /// applied; the named ones failed and were logged individually.
    #[error("operation failed for: {}", targets.join(", "))]
    Batch {
        /// Names of the targets whose action failed.
        targets: Vec<String>,
    },

    /// Git produced output the porcelain parser did not expect.
    #[error("unexpected git output: {0}")]
    Parse(String),

    /// Underlying git invocation failed.
    #[error(transparent)]
    Git(#[from] GitError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
