//! Worktree enumeration and live state derivation.
//!
//! The authoritative worktree list (path, branch, detached, locked) always
//! comes from `git worktree list --porcelain`. Sync status — dirty, upstream,
//! ahead/behind, gone — is derived per worktree unless fast mode is requested.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::git::GitBackend;

use super::error::WorktreeError;
use super::types::WorktreeInfo;

/// Queries the bare repository for worktrees and their live state.
pub struct WorktreeRegistry {
    git: Arc<dyn GitBackend>,
    bare_dir: PathBuf,
}

impl WorktreeRegistry {
    /// Create a registry over the given bare repository.
    #[must_use]
    pub fn new(git: Arc<dyn GitBackend>, bare_dir: impl Into<PathBuf>) -> Self {
        Self {
            git,
            bare_dir: bare_dir.into(),
        }
    }

    /// The bare repository this registry queries.
    #[must_use]
    pub fn bare_dir(&self) -> &Path {
        &self.bare_dir
    }

    /// Enumerate worktrees.
    ///
    /// With `fast` set, only the porcelain listing is parsed; sync status
    /// fields keep their defaults. Otherwise dirtiness, upstream, gone and
    /// ahead/behind are computed per worktree.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot be run or its output cannot be parsed.
    pub async fn list(&self, fast: bool) -> Result<Vec<WorktreeInfo>, WorktreeError> {
        let porcelain = self
            .git
            .run(&self.bare_dir, &["worktree", "list", "--porcelain"])
            .await?;
        let mut infos = parse_worktree_list(&porcelain);

        if !fast {
            for info in &mut infos {
                self.fill_sync_status(info).await?;
            }
        }

        Ok(infos)
    }

    /// Derive dirty/upstream/gone/ahead/behind for one worktree.
    async fn fill_sync_status(&self, info: &mut WorktreeInfo) -> Result<(), WorktreeError> {
        // A worktree whose directory vanished (prunable admin entry) has no
        // status to derive; `grove doctor` reports it.
        if info.path.is_dir() {
            if let Some(status) = self
                .git
                .query(&info.path, &["status", "--porcelain"])
                .await?
            {
                info.dirty = !status.trim().is_empty();
            }
        }

        if info.detached || info.branch.is_empty() {
            info.no_upstream = true;
            return Ok(());
        }

        let branch_ref = format!("refs/heads/{}", info.branch);
        let upstream = self
            .git
            .run(
                &self.bare_dir,
                &["for-each-ref", "--format=%(upstream:short)", &branch_ref],
            )
            .await?;
        let upstream = upstream.trim().to_string();
        if upstream.is_empty() {
            info.no_upstream = true;
            return Ok(());
        }
        info.upstream = upstream.clone();

        let upstream_commit = format!("{upstream}^{{commit}}");
        if self
            .git
            .query(
                &self.bare_dir,
                &["rev-parse", "--verify", "--quiet", &upstream_commit],
            )
            .await?
            .is_none()
        {
            // Configured but no longer resolvable: the remote branch is gone.
            info.gone = true;
            return Ok(());
        }

        let range = format!("{}...{}", info.branch, upstream);
        let counts = self
            .git
            .run(
                &self.bare_dir,
                &["rev-list", "--left-right", "--count", &range],
            )
            .await?;
        let (ahead, behind) = parse_ahead_behind(&counts)?;
        info.ahead = ahead;
        info.behind = behind;

        Ok(())
    }
}

/// Resolve a target by worktree directory basename or by branch name.
///
/// Both aliases are unique within a workspace, so either yields the same
/// record.
#[must_use]
pub fn find<'a>(infos: &'a [WorktreeInfo], target: &str) -> Option<&'a WorktreeInfo> {
    infos.iter().find(|info| info.matches(target))
}

/// Parse `git worktree list --porcelain` output.
///
/// The bare repository's own entry is skipped; only checked-out worktrees are
/// returned.
fn parse_worktree_list(output: &str) -> Vec<WorktreeInfo> {
    let mut infos = Vec::new();
    let mut current: Option<WorktreeInfo> = None;
    let mut is_bare = false;

    let mut flush = |current: &mut Option<WorktreeInfo>, is_bare: &mut bool| {
        if let Some(info) = current.take() {
            if !*is_bare {
                infos.push(info);
            }
        }
        *is_bare = false;
    };

    for line in output.lines() {
        if let Some(path) = line.strip_prefix("worktree ") {
            flush(&mut current, &mut is_bare);
            current = Some(WorktreeInfo {
                path: PathBuf::from(path),
                ..WorktreeInfo::default()
            });
        } else if let Some(info) = current.as_mut() {
            if let Some(branch) = line.strip_prefix("branch refs/heads/") {
                info.branch = branch.to_string();
            } else if line == "detached" {
                info.detached = true;
            } else if line == "bare" {
                is_bare = true;
            } else if line == "locked" {
                info.locked = true;
            } else if let Some(reason) = line.strip_prefix("locked ") {
                info.locked = true;
                info.lock_reason = reason.to_string();
            }
        }
    }
    flush(&mut current, &mut is_bare);

    infos
}

/// Parse `git rev-list --left-right --count a...b` output: "ahead\tbehind".
fn parse_ahead_behind(output: &str) -> Result<(usize, usize), WorktreeError> {
    let mut parts = output.split_whitespace();
    let ahead = parts
        .next()
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| WorktreeError::Parse(output.to_string()))?;
    let behind = parts
        .next()
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| WorktreeError::Parse(output.to_string()))?;
    Ok((ahead, behind))
}
