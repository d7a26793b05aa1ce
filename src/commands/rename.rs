//! `grove rename` — rename a branch together with its worktree directory.

use std::sync::Arc;

use owo_colors::OwoColorize;

use crate::git::GitBackend;
use crate::workspace::WorkspaceLock;
use crate::worktree::{WorktreeRegistry, WorktreeRenamer};

use super::{current_workspace, CommandError};

/// Rename the worktree (and branch) `old` to `new`.
///
/// Preconditions are validated before the workspace lock is acquired, so a
/// doomed rename fails fast without serializing against other invocations.
///
/// # Errors
///
/// Returns a precondition error, or the failed step's error after rollback.
pub async fn run(git: Arc<dyn GitBackend>, old: &str, new: &str) -> Result<(), CommandError> {
    let workspace = current_workspace()?;

    let registry = WorktreeRegistry::new(Arc::clone(&git), workspace.bare_dir());
    let infos = registry.list(false).await?;

    let renamer = WorktreeRenamer::new(git, workspace.clone());
    let cwd = std::env::current_dir()?;
    let plan = renamer.validate(&infos, old, new, &cwd).await?;

    let lock = WorkspaceLock::acquire(workspace.root())?;
    let new_dir = renamer.execute(&plan).await?;
    lock.release();

    println!(
        "{} {old} -> {new} ({})",
        "renamed".green().bold(),
        new_dir.display()
    );
    Ok(())
}
