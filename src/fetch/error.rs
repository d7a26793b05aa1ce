//! Fetch error types.

use crate::git::GitError;

/// Errors from fetching and diffing remotes.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// Fetching one remote failed (after the single retry).
    #[error("fetch from '{remote}' failed: {source}")]
    Remote {
        /// The remote that failed.
        remote: String,
        /// The underlying git failure.
        source: GitError,
    },

    /// Aggregate failure across remotes; the others were still processed.
    #[error("fetch failed for: {}", remotes.join(", "))]
    Partial {
        /// Remotes whose fetch failed.
        remotes: Vec<String>,
    },

    /// Git produced output the snapshot/count parser did not expect.
    #[error("unexpected git output: {0}")]
    Parse(String),

    /// Underlying git invocation failed outside the fetch itself.
    #[error(transparent)]
    Git(#[from] GitError),
}
