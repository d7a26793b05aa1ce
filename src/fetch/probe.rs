//! Remote reachability probing.

use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::git::GitBackend;

/// Result of probing one remote.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    /// The remote's name.
    pub remote: String,
    /// Whether `ls-remote` succeeded against it.
    pub reachable: bool,
    /// Error detail when unreachable, empty otherwise.
    pub detail: String,
}

/// Probe every remote concurrently, one check per remote.
///
/// Parallelism is bounded by the remote count (small), so no worker pool is
/// needed; the join set is drained as a barrier before returning.
pub async fn probe_remotes(
    git: &Arc<dyn GitBackend>,
    bare_dir: &Path,
    remotes: &[String],
) -> Vec<ProbeResult> {
    let mut set = JoinSet::new();

    for remote in remotes {
        let git = Arc::clone(git);
        let bare_dir = bare_dir.to_path_buf();
        let remote = remote.clone();
        set.spawn(async move {
            match git.run(&bare_dir, &["ls-remote", "--heads", &remote]).await {
                Ok(_) => ProbeResult {
                    remote,
                    reachable: true,
                    detail: String::new(),
                },
                Err(err) => ProbeResult {
                    remote,
                    reachable: false,
                    detail: err.to_string(),
                },
            }
        });
    }

    let mut results = Vec::with_capacity(remotes.len());
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(err) => tracing::error!(error = %err, "remote probe task failed"),
        }
    }
    results.sort_by(|a, b| a.remote.cmp(&b.remote));
    results
}
