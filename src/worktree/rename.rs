//! Atomic branch + worktree directory rename.
//!
//! Four ordered steps: rename the branch in the bare repository, move the
//! worktree directory, repair git's worktree registration (its admin files
//! bake in an absolute path), then best-effort re-point remote tracking.
//! There is no cross-resource transaction spanning a ref rename and a
//! filesystem move, so failure recovery is semantic-inverse replay: each
//! completed step is flagged and undone in reverse order.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::git::GitBackend;
use crate::workspace::Workspace;

use super::error::WorktreeError;
use super::registry::find;
use super::types::{sanitize_dir_name, WorktreeInfo};

/// A validated rename, ready to execute.
///
/// Produced by [`WorktreeRenamer::validate`] before the workspace lock is
/// taken, so a doomed rename fails fast with zero partial state.
#[derive(Debug, Clone)]
pub struct RenamePlan {
    old_branch: String,
    new_branch: String,
    old_dir: PathBuf,
    new_dir: PathBuf,
}

impl RenamePlan {
    /// Destination directory of the worktree after the rename.
    #[must_use]
    pub fn new_dir(&self) -> &Path {
        &self.new_dir
    }
}

/// Renames a branch together with its worktree directory.
pub struct WorktreeRenamer {
    git: Arc<dyn GitBackend>,
    workspace: Workspace,
}

impl WorktreeRenamer {
    /// Create a renamer for the given workspace.
    #[must_use]
    pub fn new(git: Arc<dyn GitBackend>, workspace: Workspace) -> Self {
        Self { git, workspace }
    }

    /// Check every rename precondition without mutating anything.
    ///
    /// `infos` must come from a full (non-fast) listing so the dirty and
    /// locked preconditions can be checked. `cwd` is the caller's current
    /// directory; renaming the worktree it stands in is refused.
    ///
    /// # Errors
    ///
    /// `SameName` when the names match; `NotFound` when no worktree matches
    /// `old`; `InsideTarget` when `cwd` is within the worktree (prefix check,
    /// so subdirectories are protected too); `BranchExists` when branch `new`
    /// already exists; `Dirty`/`Locked` on unsafe worktree state; and
    /// `DestinationExists` when the target directory is taken.
    pub async fn validate(
        &self,
        infos: &[WorktreeInfo],
        old: &str,
        new: &str,
        cwd: &Path,
    ) -> Result<RenamePlan, WorktreeError> {
        if new == old {
            return Err(WorktreeError::SameName(new.to_string()));
        }

        let info = find(infos, old).ok_or_else(|| WorktreeError::NotFound(old.to_string()))?;

        let cwd = cwd.canonicalize().unwrap_or_else(|_| cwd.to_path_buf());
        let target = info
            .path
            .canonicalize()
            .unwrap_or_else(|_| info.path.clone());
        if cwd.starts_with(&target) {
            return Err(WorktreeError::InsideTarget(info.path.clone()));
        }

        let new_ref = format!("refs/heads/{new}");
        if self
            .git
            .query(
                self.workspace.bare_dir(),
                &["show-ref", "--verify", "--quiet", &new_ref],
            )
            .await?
            .is_some()
        {
            return Err(WorktreeError::BranchExists(new.to_string()));
        }

        if info.dirty {
            return Err(WorktreeError::Dirty(old.to_string()));
        }
        if info.locked {
            return Err(WorktreeError::Locked(old.to_string()));
        }

        let new_dir = self.workspace.worktree_dir(&sanitize_dir_name(new));
        if new_dir.exists() {
            return Err(WorktreeError::DestinationExists(new_dir));
        }

        Ok(RenamePlan {
            old_branch: info.branch.clone(),
            new_branch: new.to_string(),
            old_dir: info.path.clone(),
            new_dir,
        })
    }

    /// Execute a validated rename.
    ///
    /// Once mutation starts, an error triggers rollback of every completed
    /// step; rollback failures are logged, never raised, and the original
    /// error is what the caller sees.
    ///
    /// # Errors
    ///
    /// Returns the underlying git or filesystem error of the failed step.
    pub async fn execute(&self, plan: &RenamePlan) -> Result<PathBuf, WorktreeError> {
        let mut txn = RenameTxn {
            git: Arc::clone(&self.git),
            bare_dir: self.workspace.bare_dir().to_path_buf(),
            plan: plan.clone(),
            branch_renamed: false,
            dir_moved: false,
        };

        match txn.apply().await {
            Ok(()) => {
                tracing::info!(
                    old = %plan.old_branch,
                    new = %plan.new_branch,
                    path = %plan.new_dir.display(),
                    "renamed worktree"
                );
                Ok(plan.new_dir.clone())
            }
            Err(err) => {
                txn.rollback().await;
                Err(err)
            }
        }
    }

    /// Validate and execute in one call.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::validate`] or [`Self::execute`].
    pub async fn rename(
        &self,
        infos: &[WorktreeInfo],
        old: &str,
        new: &str,
        cwd: &Path,
    ) -> Result<PathBuf, WorktreeError> {
        let plan = self.validate(infos, old, new, cwd).await?;
        self.execute(&plan).await
    }
}

/// State of an in-flight rename: which steps completed, and the paths needed
/// to replay their inverses.
struct RenameTxn {
    git: Arc<dyn GitBackend>,
    bare_dir: PathBuf,
    plan: RenamePlan,
    branch_renamed: bool,
    dir_moved: bool,
}

impl RenameTxn {
    async fn apply(&mut self) -> Result<(), WorktreeError> {
        self.git
            .run(
                &self.bare_dir,
                &["branch", "-m", &self.plan.old_branch, &self.plan.new_branch],
            )
            .await?;
        self.branch_renamed = true;

        fs::rename(&self.plan.old_dir, &self.plan.new_dir)?;
        self.dir_moved = true;

        let new_dir = self.plan.new_dir.to_string_lossy();
        self.git
            .run(&self.bare_dir, &["worktree", "repair", new_dir.as_ref()])
            .await?;

        self.retarget_upstream().await;
        Ok(())
    }

    /// Best-effort step 4: if the old branch tracked a same-named remote
    /// branch and a matching new-named remote branch exists, re-point the
    /// tracking. Failure here is logged, not fatal.
    async fn retarget_upstream(&self) {
        let branch_ref = format!("refs/heads/{}", self.plan.new_branch);
        let upstream = match self
            .git
            .run(
                &self.bare_dir,
                &["for-each-ref", "--format=%(upstream:short)", &branch_ref],
            )
            .await
        {
            Ok(out) => out.trim().to_string(),
            Err(err) => {
                tracing::warn!(error = %err, "could not read upstream of renamed branch");
                return;
            }
        };

        let Some(remote) = upstream.strip_suffix(&format!("/{}", self.plan.old_branch)) else {
            return;
        };
        let candidate = format!("{remote}/{}", self.plan.new_branch);
        let candidate_commit = format!("{candidate}^{{commit}}");
        match self
            .git
            .query(
                &self.bare_dir,
                &["rev-parse", "--verify", "--quiet", &candidate_commit],
            )
            .await
        {
            Ok(Some(_)) => {
                let set_to = format!("--set-upstream-to={candidate}");
                if let Err(err) = self
                    .git
                    .run(&self.bare_dir, &["branch", &set_to, &self.plan.new_branch])
                    .await
                {
                    tracing::warn!(
                        error = %err,
                        upstream = %candidate,
                        "failed to re-point tracking branch"
                    );
                }
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "could not probe for renamed remote branch");
            }
        }
    }

    /// Replay inverses of completed steps in reverse order: move the
    /// directory back, rename the branch back, re-run repair at the original
    /// path. Failures are logged; the caller keeps the original error.
    async fn rollback(&mut self) {
        tracing::warn!(
            old = %self.plan.old_branch,
            new = %self.plan.new_branch,
            "rolling back partially completed rename"
        );

        if self.dir_moved {
            if let Err(err) = fs::rename(&self.plan.new_dir, &self.plan.old_dir) {
                tracing::error!(
                    error = %err,
                    from = %self.plan.new_dir.display(),
                    to = %self.plan.old_dir.display(),
                    "rollback failed: could not move worktree directory back; manual repair needed"
                );
            } else {
                self.dir_moved = false;
            }
        }

        if self.branch_renamed {
            if let Err(err) = self
                .git
                .run(
                    &self.bare_dir,
                    &["branch", "-m", &self.plan.new_branch, &self.plan.old_branch],
                )
                .await
            {
                tracing::error!(
                    error = %err,
                    "rollback failed: could not rename branch back; manual repair needed"
                );
            } else {
                self.branch_renamed = false;
            }
        }

        let old_dir = self.plan.old_dir.to_string_lossy();
        if let Err(err) = self
            .git
            .run(&self.bare_dir, &["worktree", "repair", old_dir.as_ref()])
            .await
        {
            tracing::error!(error = %err, "rollback failed: worktree repair at original path");
        }
    }
}
