//! `grove add` — create a branch and its worktree.

use std::sync::Arc;

use owo_colors::OwoColorize;

use crate::config::ConfigLoader;
use crate::git::GitBackend;
use crate::hooks::HookRunner;
use crate::workspace::WorkspaceLock;
use crate::worktree::{find, sanitize_dir_name, WorktreeError, WorktreeRegistry};

use super::{current_workspace, path_arg, CommandError};

/// Create a worktree for `branch`, creating the branch if needed.
///
/// An existing local branch is checked out as-is; otherwise a same-named
/// branch on the default remote is tracked; otherwise a fresh branch is
/// started from `base` (default `HEAD`). No two worktrees may register the
/// same branch, so a conflicting name fails before any mutation.
///
/// # Errors
///
/// Returns an error if the name collides with an existing worktree or
/// directory, or any git step fails.
pub async fn run(
    git: Arc<dyn GitBackend>,
    branch: &str,
    base: Option<&str>,
) -> Result<(), CommandError> {
    let workspace = current_workspace()?;
    let config = ConfigLoader::for_workspace(workspace.root()).load()?;
    let lock = WorkspaceLock::acquire(workspace.root())?;

    let registry = WorktreeRegistry::new(Arc::clone(&git), workspace.bare_dir());
    let infos = registry.list(true).await?;
    if find(&infos, branch).is_some() {
        return Err(WorktreeError::AlreadyExists(branch.to_string()).into());
    }

    let worktree_dir = workspace.worktree_dir(&sanitize_dir_name(branch));
    if worktree_dir.exists() {
        return Err(WorktreeError::DestinationExists(worktree_dir).into());
    }

    let bare_dir = workspace.bare_dir();
    let dir_arg = path_arg(&worktree_dir);
    let local_ref = format!("refs/heads/{branch}");
    let remote_branch = format!("{}/{branch}", config.fetch.default_remote);
    let remote_commit = format!("{remote_branch}^{{commit}}");

    if git
        .query(bare_dir, &["show-ref", "--verify", "--quiet", &local_ref])
        .await?
        .is_some()
    {
        git.run(bare_dir, &["worktree", "add", &dir_arg, branch])
            .await?;
    } else if git
        .query(
            bare_dir,
            &["rev-parse", "--verify", "--quiet", &remote_commit],
        )
        .await?
        .is_some()
    {
        git.run(
            bare_dir,
            &[
                "worktree",
                "add",
                "--track",
                "-b",
                branch,
                &dir_arg,
                &remote_branch,
            ],
        )
        .await?;
    } else {
        let base = base.unwrap_or("HEAD");
        git.run(bare_dir, &["worktree", "add", "-b", branch, &dir_arg, base])
            .await?;
    }

    lock.release();
    println!(
        "{} {}",
        "created".green().bold(),
        worktree_dir.display()
    );

    // Hooks run after the lock is gone: the worktree exists either way, and a
    // slow hook must not serialize other grove invocations.
    let hooks = HookRunner::new(config.hooks.post_create);
    if !hooks.is_empty() {
        if let Err(err) = hooks.run(&worktree_dir).await {
            tracing::warn!(error = %err, "post-create hook failed");
            eprintln!("{} post-create hook failed: {err}", "warning:".yellow().bold());
        }
    }

    Ok(())
}
