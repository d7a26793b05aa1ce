//! Workspace discovery and cross-process coordination.
//!
//! A workspace is a directory holding exactly one bare repository (`.bare/`)
//! plus zero or more sibling worktree directories. All mutating commands in a
//! workspace serialize on a single advisory lock file, so two grove processes
//! can never interleave mutations of git's shared worktree metadata.

mod error;
mod lock;
mod types;

pub use error::WorkspaceError;
pub use lock::{inspect as inspect_lock, LockState, WorkspaceLock, LOCK_FILE_NAME};
pub use types::{Workspace, BARE_DIR_NAME};
