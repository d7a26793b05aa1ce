//! `grove remove` — remove one or more worktrees.

use std::sync::Arc;

use owo_colors::OwoColorize;

use crate::git::GitBackend;
use crate::workspace::WorkspaceLock;
use crate::worktree::{run_batch, WorktreeError, WorktreeRegistry};

use super::{current_workspace, path_arg, CommandError};

/// Remove every target worktree.
///
/// Targets resolve strictly (a mistyped name aborts the whole batch before
/// anything is removed), then execute leniently: one failure does not stop
/// the rest, and the aggregate error names only the failures.
///
/// # Errors
///
/// Returns an error on unresolved targets or when any removal fails.
pub async fn run(
    git: Arc<dyn GitBackend>,
    targets: &[String],
    force: bool,
) -> Result<(), CommandError> {
    let workspace = current_workspace()?;
    let lock = WorkspaceLock::acquire(workspace.root())?;

    let registry = WorktreeRegistry::new(Arc::clone(&git), workspace.bare_dir());
    let infos = registry.list(false).await?;
    let bare_dir = workspace.bare_dir();

    run_batch(&infos, targets, |info| {
        let git = Arc::clone(&git);
        async move {
            if info.dirty && !force {
                return Err(WorktreeError::Dirty(info.name().to_string()));
            }
            if info.locked && !force {
                return Err(WorktreeError::Locked(info.name().to_string()));
            }

            let mut args = vec!["worktree", "remove"];
            if force {
                // Twice: git requires the second --force for locked worktrees.
                args.push("--force");
                args.push("--force");
            }
            let path = path_arg(&info.path);
            args.push(&path);
            git.run(bare_dir, &args).await?;

            println!("{} {}", "removed".green().bold(), info.name());
            Ok(())
        }
    })
    .await?;

    lock.release();
    Ok(())
}
