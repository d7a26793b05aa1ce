//! `grove exec` — run a command in each target worktree.

use std::sync::Arc;

use owo_colors::OwoColorize;

use crate::git::GitBackend;
use crate::worktree::{run_batch, WorktreeError, WorktreeRegistry};

use super::{current_workspace, CommandError};

/// Run `command` (an argv vector, never a shell) in every target worktree,
/// streaming its output.
///
/// Targets resolve strictly before anything runs; execution is lenient, so
/// one worktree's failing command does not stop the rest and the aggregate
/// error names only the failures.
///
/// # Errors
///
/// Returns an error on unresolved targets or when the command fails in any
/// worktree.
pub async fn run(
    git: Arc<dyn GitBackend>,
    targets: &[String],
    all: bool,
    command: &[String],
) -> Result<(), CommandError> {
    let Some((program, args)) = command.split_first() else {
        return Err(CommandError::Usage(
            "no command given; usage: grove exec <targets...> -- <command>...".to_string(),
        ));
    };
    if !all && targets.is_empty() {
        return Err(CommandError::Usage(
            "no targets given (pass worktree names or --all)".to_string(),
        ));
    }

    let workspace = current_workspace()?;
    let registry = WorktreeRegistry::new(git, workspace.bare_dir());
    let infos = registry.list(true).await?;

    let targets: Vec<String> = if all {
        infos.iter().map(|info| info.name().to_string()).collect()
    } else {
        targets.to_vec()
    };

    run_batch(&infos, &targets, |info| async move {
        println!("{} {}", "==>".bold(), info.name().bold());
        let status = tokio::process::Command::new(program)
            .args(args)
            .current_dir(&info.path)
            .status()
            .await
            .map_err(WorktreeError::Io)?;

        if status.success() {
            Ok(())
        } else {
            Err(WorktreeError::ExecFailed {
                target: info.name().to_string(),
                code: status.code().unwrap_or(-1),
            })
        }
    })
    .await?;

    Ok(())
}
