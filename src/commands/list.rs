//! `grove list` — show worktrees and their sync status.

use std::sync::Arc;

use owo_colors::OwoColorize;

use crate::config::ConfigLoader;
use crate::git::GitBackend;
use crate::worktree::{ListEntry, WorktreeInfo, WorktreeRegistry};

use super::{current_workspace, CommandError};

/// List every worktree, either as a human table or as JSON.
///
/// Fast mode (flag or config default) skips sync-status computation.
///
/// # Errors
///
/// Returns an error if the workspace cannot be found or git fails.
pub async fn run(git: Arc<dyn GitBackend>, fast: bool, json: bool) -> Result<(), CommandError> {
    let workspace = current_workspace()?;
    let config = ConfigLoader::for_workspace(workspace.root()).load()?;
    let fast = fast || config.list.fast;

    let registry = WorktreeRegistry::new(git, workspace.bare_dir());
    let infos = registry.list(fast).await?;

    if json {
        let entries: Vec<ListEntry> = infos.iter().map(ListEntry::from).collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let width = infos
        .iter()
        .map(|info| info.name().len())
        .max()
        .unwrap_or(0);
    for info in &infos {
        println!("{}", format_row(info, width, fast));
    }
    Ok(())
}

fn format_row(info: &WorktreeInfo, width: usize, fast: bool) -> String {
    let name = format!("{:width$}", info.name());
    let branch = if info.detached {
        "(detached)".dimmed().to_string()
    } else {
        info.branch.clone()
    };

    let mut flags = Vec::new();
    if info.locked {
        let label = if info.lock_reason.is_empty() {
            "locked".to_string()
        } else {
            format!("locked: {}", info.lock_reason)
        };
        flags.push(label.yellow().to_string());
    }
    if !fast {
        if info.dirty {
            flags.push("dirty".red().to_string());
        }
        if info.gone {
            flags.push("gone".red().to_string());
        } else if info.no_upstream {
            flags.push("no upstream".dimmed().to_string());
        } else {
            if info.ahead > 0 {
                flags.push(format!("+{}", info.ahead).green().to_string());
            }
            if info.behind > 0 {
                flags.push(format!("-{}", info.behind).yellow().to_string());
            }
        }
    }

    if flags.is_empty() {
        format!("{}  {branch}", name.bold())
    } else {
        format!("{}  {branch}  [{}]", name.bold(), flags.join(", "))
    }
}
