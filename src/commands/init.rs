//! `grove init` — create a workspace.

use std::path::PathBuf;
use std::sync::Arc;

use owo_colors::OwoColorize;

use crate::git::GitBackend;
use crate::workspace::{Workspace, WorkspaceLock, BARE_DIR_NAME};
use crate::worktree::sanitize_dir_name;

use super::{path_arg, repo_name_from_url, CommandError};

/// Create a workspace: a bare repository under `.bare/` plus a worktree for
/// the default branch.
///
/// With a URL the repository is cloned bare and its fetch refspec configured
/// so remote-tracking refs exist for sync-status computation; without one an
/// empty bare repository is initialized.
///
/// # Errors
///
/// Returns an error if the directory is already a workspace or any git step
/// fails.
pub async fn run(
    git: Arc<dyn GitBackend>,
    url: Option<String>,
    dir: Option<PathBuf>,
) -> Result<(), CommandError> {
    let root = match (dir, &url) {
        (Some(dir), _) => dir,
        (None, Some(url)) => repo_name_from_url(url),
        (None, None) => std::env::current_dir()?,
    };
    std::fs::create_dir_all(&root)?;
    let root = root.canonicalize()?;

    if root.join(BARE_DIR_NAME).exists() {
        return Err(CommandError::Usage(format!(
            "{} is already a grove workspace",
            root.display()
        )));
    }

    let bare_dir = root.join(BARE_DIR_NAME);
    match &url {
        Some(url) => {
            git.run(&root, &["clone", "--bare", url, BARE_DIR_NAME])
                .await?;
            git.run(
                &bare_dir,
                &[
                    "config",
                    "remote.origin.fetch",
                    "+refs/heads/*:refs/remotes/origin/*",
                ],
            )
            .await?;
            git.run(&bare_dir, &["fetch", "--prune", "origin"]).await?;
        }
        None => {
            git.run(&root, &["init", "--bare", BARE_DIR_NAME]).await?;
        }
    }

    let workspace = Workspace::open(&root)?;

    // A freshly initialized repository has no commits yet; skip the initial
    // worktree until the default branch actually resolves.
    let head = git
        .run(&bare_dir, &["symbolic-ref", "--short", "HEAD"])
        .await?
        .trim()
        .to_string();
    let head_ref = format!("refs/heads/{head}");
    if git
        .query(&bare_dir, &["show-ref", "--verify", "--quiet", &head_ref])
        .await?
        .is_some()
    {
        let lock = WorkspaceLock::acquire(workspace.root())?;
        let worktree_dir = workspace.worktree_dir(&sanitize_dir_name(&head));
        git.run(
            &bare_dir,
            &["worktree", "add", &path_arg(&worktree_dir), &head],
        )
        .await?;

        let remote_commit = format!("origin/{head}^{{commit}}");
        if git
            .query(
                &bare_dir,
                &["rev-parse", "--verify", "--quiet", &remote_commit],
            )
            .await?
            .is_some()
        {
            let set_to = format!("--set-upstream-to=origin/{head}");
            if let Err(err) = git.run(&bare_dir, &["branch", &set_to, &head]).await {
                tracing::warn!(error = %err, branch = %head, "could not set upstream");
            }
        }
        lock.release();
        println!("{} worktree {}", "created".green().bold(), worktree_dir.display());
    }

    println!(
        "{} workspace at {}",
        "initialized".green().bold(),
        root.display()
    );
    Ok(())
}
