//! Multi-target batch execution.
//!
//! Shared by the lock/unlock/remove/exec commands: strict all-or-nothing
//! target resolution, then lenient partial-failure execution. A mistyped
//! target aborts before anything mutates, while a cleanup-style batch still
//! makes maximum progress past individual failures.

use std::collections::HashSet;
use std::future::Future;

use super::error::WorktreeError;
use super::registry::find;
use super::types::WorktreeInfo;

/// Run `action` against every resolved, deduplicated target.
///
/// 1. Every target is resolved via [`find`]; any miss aborts the whole batch
///    before the action runs at all.
/// 2. Resolved targets are deduplicated by path (a worktree named once by
///    branch and once by directory is still one target).
/// 3. The action runs per unique target; one failure does not stop the rest.
/// 4. Failures are collected into one aggregate error naming the failed
///    targets, while successful targets remain applied.
///
/// # Errors
///
/// Returns `WorktreeError::NotFound` when resolution fails, or
/// `WorktreeError::Batch` naming the targets whose action failed.
pub async fn run_batch<'a, F, Fut>(
    infos: &'a [WorktreeInfo],
    targets: &[String],
    mut action: F,
) -> Result<(), WorktreeError>
where
    F: FnMut(&'a WorktreeInfo) -> Fut,
    Fut: Future<Output = Result<(), WorktreeError>>,
{
    let mut resolved = Vec::with_capacity(targets.len());
    let mut unresolved = Vec::new();
    for target in targets {
        match find(infos, target) {
            Some(info) => resolved.push(info),
            None => unresolved.push(target.clone()),
        }
    }
    if !unresolved.is_empty() {
        return Err(WorktreeError::NotFound(unresolved.join(", ")));
    }

    let mut seen = HashSet::new();
    let unique: Vec<&WorktreeInfo> = resolved
        .into_iter()
        .filter(|info| seen.insert(info.path.clone()))
        .collect();

    let mut failed = Vec::new();
    for info in unique {
        if let Err(err) = action(info).await {
            tracing::error!(target = %info.name(), error = %err, "batch action failed");
            failed.push(info.name().to_string());
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(WorktreeError::Batch { targets: failed })
    }
}
