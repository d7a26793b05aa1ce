//! `grove lock` / `grove unlock` — administratively lock worktrees.

use std::sync::Arc;

use owo_colors::OwoColorize;

use crate::git::GitBackend;
use crate::workspace::WorkspaceLock;
use crate::worktree::{run_batch, WorktreeRegistry};

use super::{current_workspace, path_arg, CommandError};

/// Lock every target worktree, optionally recording a reason.
///
/// # Errors
///
/// Returns an error on unresolved targets or when any lock fails (for
/// example, a target that is already locked).
pub async fn lock(
    git: Arc<dyn GitBackend>,
    targets: &[String],
    reason: Option<&str>,
) -> Result<(), CommandError> {
    let workspace = current_workspace()?;
    let lock = WorkspaceLock::acquire(workspace.root())?;

    let registry = WorktreeRegistry::new(Arc::clone(&git), workspace.bare_dir());
    let infos = registry.list(true).await?;
    let bare_dir = workspace.bare_dir();

    run_batch(&infos, targets, |info| {
        let git = Arc::clone(&git);
        async move {
            let path = path_arg(&info.path);
            let mut args = vec!["worktree", "lock"];
            if let Some(reason) = reason {
                args.push("--reason");
                args.push(reason);
            }
            args.push(&path);
            git.run(bare_dir, &args).await?;
            println!("{} {}", "locked".yellow().bold(), info.name());
            Ok(())
        }
    })
    .await?;

    lock.release();
    Ok(())
}

/// Unlock every target worktree.
///
/// # Errors
///
/// Returns an error on unresolved targets or when any unlock fails.
pub async fn unlock(git: Arc<dyn GitBackend>, targets: &[String]) -> Result<(), CommandError> {
    let workspace = current_workspace()?;
    let lock = WorkspaceLock::acquire(workspace.root())?;

    let registry = WorktreeRegistry::new(Arc::clone(&git), workspace.bare_dir());
    let infos = registry.list(true).await?;
    let bare_dir = workspace.bare_dir();

    run_batch(&infos, targets, |info| {
        let git = Arc::clone(&git);
        async move {
            let path = path_arg(&info.path);
            git.run(bare_dir, &["worktree", "unlock", &path]).await?;
            println!("{} {}", "unlocked".green().bold(), info.name());
            Ok(())
        }
    })
    .await?;

    lock.release();
    Ok(())
}
