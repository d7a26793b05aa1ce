//! `grove fetch` — fetch remotes and report ref changes.

use std::sync::Arc;

use owo_colors::OwoColorize;

use crate::fetch::{FetchDiffEngine, FetchError, RefChange, RefDelta};
use crate::git::GitBackend;
use crate::workspace::WorkspaceLock;

use super::{current_workspace, CommandError};

/// Fetch the named remotes (all configured remotes when none are given) and
/// print what changed, per ref.
///
/// Remotes are processed independently: one remote's failure never blocks
/// the others, and the exit code reflects any failure.
///
/// # Errors
///
/// Returns `FetchError::Partial` naming the remotes whose fetch failed.
pub async fn run(git: Arc<dyn GitBackend>, remotes: &[String]) -> Result<(), CommandError> {
    let workspace = current_workspace()?;
    let lock = WorkspaceLock::acquire(workspace.root())?;

    let engine = FetchDiffEngine::new(git, workspace.bare_dir());
    let remotes = if remotes.is_empty() {
        engine.list_remotes().await?
    } else {
        remotes.to_vec()
    };
    if remotes.is_empty() {
        println!("no remotes configured");
        return Ok(());
    }

    let results = engine.fetch_all(&remotes).await;
    lock.release();

    let mut failed = Vec::new();
    for outcome in &results {
        match &outcome.result {
            Ok(changes) if changes.is_empty() => {
                println!("{}: up to date", outcome.remote.bold());
            }
            Ok(changes) => {
                println!("{}:", outcome.remote.bold());
                for change in changes {
                    println!("  {}", format_change(change));
                }
            }
            Err(err) => {
                eprintln!(
                    "{} fetch from '{}' failed: {err}",
                    "error:".red().bold(),
                    outcome.remote
                );
                failed.push(outcome.remote.clone());
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(FetchError::Partial { remotes: failed }.into())
    }
}

fn format_change(change: &RefChange) -> String {
    match change {
        RefChange::New { name, .. } => format!("{} {name}", "new".green()),
        RefChange::Pruned { name, .. } => format!("{} {name}", "pruned".red()),
        RefChange::Updated { name, delta, .. } => match delta {
            Some(RefDelta::Advanced(n)) => {
                format!("{name} {}", format!("+{n} commits").green())
            }
            Some(RefDelta::Reset(n)) => {
                format!("{name} {}", format!("-{n} commits").yellow())
            }
            // A rewrite has no meaningful count: neither history contains
            // the other.
            Some(RefDelta::Rewritten) | None => {
                format!("{name} {}", "force-pushed".red())
            }
        },
    }
}
