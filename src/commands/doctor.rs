//! `grove doctor` — workspace diagnostics.

use std::sync::Arc;

use owo_colors::OwoColorize;

use crate::fetch::{probe_remotes, FetchDiffEngine};
use crate::git::GitBackend;
use crate::workspace::{inspect_lock, LockState};
use crate::worktree::WorktreeRegistry;

use super::{current_workspace, CommandError};

/// Diagnose the workspace: lock state, worktree consistency, and remote
/// reachability. Reports findings without mutating anything.
///
/// # Errors
///
/// Returns an error only when the workspace itself cannot be inspected.
pub async fn run(git: Arc<dyn GitBackend>) -> Result<(), CommandError> {
    let workspace = current_workspace()?;
    println!("workspace: {}", workspace.root().display());

    match inspect_lock(workspace.root()) {
        LockState::Free => ok("no workspace lock held"),
        LockState::Held { pid } => {
            warn(&format!("a grove operation is in progress (pid {pid})"));
        }
        LockState::Stale { pid } => warn(&format!(
            "stale lock file (holder {} is gone); the next mutation reclaims it",
            pid.map_or_else(|| "unparsable".to_string(), |p| format!("pid {p}"))
        )),
    }

    let registry = WorktreeRegistry::new(Arc::clone(&git), workspace.bare_dir());
    let infos = registry.list(false).await?;
    if infos.is_empty() {
        warn("no worktrees registered");
    }
    for info in &infos {
        if !info.path.is_dir() {
            // Left behind when a process died between rename steps or a
            // directory was removed without `git worktree remove`.
            warn(&format!(
                "{}: directory missing; admin entry is prunable",
                info.name()
            ));
        }
        if info.gone {
            warn(&format!(
                "{}: upstream {} no longer exists",
                info.name(),
                info.upstream
            ));
        }
        if info.locked && info.lock_reason.is_empty() {
            warn(&format!("{}: locked without a reason", info.name()));
        }
    }
    ok(&format!("{} worktree(s) inspected", infos.len()));

    let engine = FetchDiffEngine::new(Arc::clone(&git), workspace.bare_dir());
    let remotes = engine.list_remotes().await?;
    if remotes.is_empty() {
        warn("no remotes configured");
    } else {
        for probe in probe_remotes(&git, workspace.bare_dir(), &remotes).await {
            if probe.reachable {
                ok(&format!("remote '{}' reachable", probe.remote));
            } else {
                warn(&format!(
                    "remote '{}' unreachable: {}",
                    probe.remote, probe.detail
                ));
            }
        }
    }

    Ok(())
}

fn ok(message: &str) {
    println!("  {} {message}", "ok".green().bold());
}

fn warn(message: &str) {
    println!("  {} {message}", "warn".yellow().bold());
}
