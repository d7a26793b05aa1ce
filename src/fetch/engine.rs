//! The fetch-and-diff engine.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::git::GitBackend;

use super::error::FetchError;
use super::types::{diff_snapshots, parse_ref_snapshot, RefChange, RefDelta, RefSnapshot};

/// Fetches remotes and reports what changed, per ref.
pub struct FetchDiffEngine {
    git: Arc<dyn GitBackend>,
    bare_dir: PathBuf,
}

/// Outcome of fetching one remote within a multi-remote run.
#[derive(Debug)]
pub struct RemoteFetch {
    /// The remote's name.
    pub remote: String,
    /// Its change list, or the per-remote error.
    pub result: Result<Vec<RefChange>, FetchError>,
}

impl FetchDiffEngine {
    /// Create an engine over the given bare repository.
    #[must_use]
    pub fn new(git: Arc<dyn GitBackend>, bare_dir: impl Into<PathBuf>) -> Self {
        Self {
            git,
            bare_dir: bare_dir.into(),
        }
    }

    /// The bare repository this engine fetches into.
    #[must_use]
    pub fn bare_dir(&self) -> &Path {
        &self.bare_dir
    }

    /// Names of all configured remotes.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot be run.
    pub async fn list_remotes(&self) -> Result<Vec<String>, FetchError> {
        let output = self.git.run(&self.bare_dir, &["remote"]).await?;
        Ok(output.lines().map(str::to_string).collect())
    }

    /// Fetch one remote and report every ref change.
    ///
    /// The fetch is retried exactly once on failure, which covers transient
    /// network blips; a second failure is surfaced for this remote only.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Remote` when the fetch fails twice, or an error
    /// from snapshotting/classification.
    pub async fn fetch_and_diff(&self, remote: &str) -> Result<Vec<RefChange>, FetchError> {
        let before = self.snapshot(remote).await?;
        self.fetch_with_retry(remote).await?;
        let after = self.snapshot(remote).await?;

        let mut changes = diff_snapshots(&before, &after);
        for change in &mut changes {
            if let RefChange::Updated { old, new, delta, .. } = change {
                *delta = Some(self.classify(old, new).await?);
            }
        }

        tracing::debug!(remote, changes = changes.len(), "fetch diff complete");
        Ok(changes)
    }

    /// Fetch every remote independently: one remote's permanent failure
    /// never blocks the others.
    pub async fn fetch_all(&self, remotes: &[String]) -> Vec<RemoteFetch> {
        let mut results = Vec::with_capacity(remotes.len());
        for remote in remotes {
            let result = self.fetch_and_diff(remote).await;
            if let Err(err) = &result {
                tracing::error!(remote, error = %err, "remote fetch failed");
            }
            results.push(RemoteFetch {
                remote: remote.clone(),
                result,
            });
        }
        results
    }

    /// Snapshot the remote-tracking refs of one remote.
    async fn snapshot(&self, remote: &str) -> Result<RefSnapshot, FetchError> {
        let prefix = format!("refs/remotes/{remote}/");
        let output = self
            .git
            .run(
                &self.bare_dir,
                &[
                    "for-each-ref",
                    "--format=%(refname:short) %(objectname)",
                    &prefix,
                ],
            )
            .await?;
        Ok(parse_ref_snapshot(&output))
    }

    async fn fetch_with_retry(&self, remote: &str) -> Result<(), FetchError> {
        let args = ["fetch", "--prune", remote];
        if let Err(first) = self.git.run(&self.bare_dir, &args).await {
            tracing::debug!(remote, error = %first, "fetch failed, retrying once");
            self.git
                .run(&self.bare_dir, &args)
                .await
                .map_err(|source| FetchError::Remote {
                    remote: remote.to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Classify an updated ref by bidirectional reachability.
    ///
    /// Forward and backward commit counts are taken independently; a single
    /// symmetric ahead/behind query could not distinguish an advance, a
    /// backward reset, and a rewrite where neither history contains the
    /// other.
    async fn classify(&self, old: &str, new: &str) -> Result<RefDelta, FetchError> {
        let forward = self.count_range(&format!("{old}..{new}")).await?;
        let backward = self.count_range(&format!("{new}..{old}")).await?;
        match (forward, backward) {
            (f, 0) if f > 0 => Ok(RefDelta::Advanced(f)),
            (0, b) if b > 0 => Ok(RefDelta::Reset(b)),
            _ => Ok(RefDelta::Rewritten),
        }
    }

    async fn count_range(&self, range: &str) -> Result<usize, FetchError> {
        let output = self
            .git
            .run(&self.bare_dir, &["rev-list", "--count", range])
            .await?;
        output
            .trim()
            .parse()
            .map_err(|_| FetchError::Parse(output))
    }
}
