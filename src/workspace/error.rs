//! Workspace error types.

use std::path::PathBuf;

/// Errors from workspace discovery and locking.
#[derive(thiserror::Error, Debug)]
pub enum WorkspaceError {
    /// No workspace root was found above the starting directory.
    #[error("not inside a grove workspace (searched upward from {})", start.display())]
    NotFound {
        /// Directory the search started from.
        start: PathBuf,
    },

    /// The workspace lock is held by a live process.
    #[error("another grove operation is in progress (pid {pid}); retry once it finishes")]
    Busy {
        /// PID recorded in the lock file.
        pid: i32,
    },

    /// Stale-lock reclamation kept losing the race to other acquirers.
    #[error("could not claim workspace lock {} after repeated attempts", path.display())]
    Contended {
        /// Path of the contended lock file.
        path: PathBuf,
    },

    /// I/O error touching the workspace or lock file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
