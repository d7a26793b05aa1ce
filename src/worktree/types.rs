//! Worktree state types.

use std::path::PathBuf;

use serde::Serialize;

/// Live state of one worktree.
///
/// Rebuilt fresh on every query, never cached across invocations, so
/// concurrent plain-git activity is always observed live.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeInfo {
    /// Absolute path of the worktree directory.
    pub path: PathBuf,
    /// Checked-out branch; empty when HEAD is detached.
    pub branch: String,
    /// Whether HEAD is detached.
    pub detached: bool,
    /// Upstream ref short name (e.g. `origin/main`), empty when none.
    pub upstream: String,
    /// Commits the branch is ahead of its upstream.
    pub ahead: usize,
    /// Commits the branch is behind its upstream.
    pub behind: usize,
    /// Whether the worktree has uncommitted changes.
    pub dirty: bool,
    /// Upstream is configured but its ref no longer resolves.
    pub gone: bool,
    /// No upstream is configured (always set for detached worktrees).
    pub no_upstream: bool,
    /// Whether git has the worktree administratively locked.
    pub locked: bool,
    /// Reason recorded with the lock, empty when none was given.
    pub lock_reason: String,
}

impl WorktreeInfo {
    /// The worktree's name: the basename of its directory.
    #[must_use]
    pub fn name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    /// Whether `target` names this worktree, by directory basename or by
    /// branch. Both are unique within a workspace, so either alias resolves
    /// to the same record.
    #[must_use]
    pub fn matches(&self, target: &str) -> bool {
        self.name() == target || (!self.branch.is_empty() && self.branch == target)
    }
}

/// One row of the machine-readable listing consumed by external formatters.
#[derive(Debug, Clone, Serialize)]
pub struct ListEntry {
    /// Worktree name (directory basename).
    pub name: String,
    /// Absolute worktree path.
    pub path: PathBuf,
    /// Checked-out branch, empty when detached.
    pub current: String,
    /// Upstream short name, empty when none.
    pub upstream: String,
    pub dirty: bool,
    pub ahead: usize,
    pub behind: usize,
    pub gone: bool,
    pub no_upstream: bool,
    pub locked: bool,
    pub lock_reason: String,
}

impl From<&WorktreeInfo> for ListEntry {
    fn from(info: &WorktreeInfo) -> Self {
        Self {
            name: info.name().to_string(),
            path: info.path.clone(),
            current: info.branch.clone(),
            upstream: info.upstream.clone(),
            dirty: info.dirty,
            ahead: info.ahead,
            behind: info.behind,
            gone: info.gone,
            no_upstream: info.no_upstream,
            locked: info.locked,
            lock_reason: info.lock_reason.clone(),
        }
    }
}

/// Directory basename for a branch: path separators collapse to dashes so
/// `feat/login` lives in `feat-login/`.
#[must_use]
pub fn sanitize_dir_name(branch: &str) -> String {
    branch.replace('/', "-")
}
