//! Git subprocess error types.

/// Errors from running the external git binary.
#[derive(thiserror::Error, Debug)]
pub enum GitError {
    /// The git binary was not found on PATH.
    #[error("git binary not found")]
    NotFound,

    /// Git exited non-zero.
    #[error("git {command} failed: {stderr}")]
    CommandFailed {
        /// The argv vector that was run, joined for display.
        command: String,
        /// Trimmed stderr from the failed invocation.
        stderr: String,
    },

    /// I/O error while spawning or reaping the subprocess.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
