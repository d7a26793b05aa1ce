//! Worktree lifecycle: enumeration, state derivation, rename, batch ops.
//!
//! State is always derived fresh from git; nothing here caches across
//! invocations, so concurrent plain-git activity is observed live.

mod batch;
mod error;
mod registry;
mod rename;
mod types;

pub use batch::run_batch;
pub use error::WorktreeError;
pub use registry::{find, WorktreeRegistry};
pub use rename::{RenamePlan, WorktreeRenamer};
pub use types::{sanitize_dir_name, ListEntry, WorktreeInfo};
