//! CLI command implementations.
//!
//! Commands are thin: they discover the workspace, take the workspace lock
//! when they mutate, and delegate to the core engines. Mutating commands are
//! `add`, `remove`, `rename`, `lock`/`unlock` and `fetch`; `list`, `exec` and
//! `doctor` only read.

pub mod add;
pub mod doctor;
pub mod exec;
pub mod fetch;
pub mod init;
pub mod list;
pub mod lock;
pub mod remove;
pub mod rename;

use std::path::PathBuf;

use crate::config::ConfigError;
use crate::fetch::FetchError;
use crate::git::GitError;
use crate::hooks::HookError;
use crate::workspace::{Workspace, WorkspaceError};
use crate::worktree::WorktreeError;

/// Umbrella error for the command layer; every variant maps to exit code 1.
#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Worktree(#[from] WorktreeError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Hook(#[from] HookError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The command was invoked in a way that cannot be executed.
    #[error("{0}")]
    Usage(String),
}

/// Discover the workspace containing the current directory.
fn current_workspace() -> Result<Workspace, CommandError> {
    let cwd = std::env::current_dir()?;
    Ok(Workspace::discover(&cwd)?)
}

/// Join a path for use in a git argv vector.
fn path_arg(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Derive the workspace directory name from a clone URL.
fn repo_name_from_url(url: &str) -> PathBuf {
    let trimmed = url.trim_end_matches('/');
    let base = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
    PathBuf::from(base.trim_end_matches(".git"))
}
