//! Subprocess boundary for the external git binary.
//!
//! Grove never manipulates git objects or refs itself; every mutation and
//! query goes through an argv vector handed to the `git` binary. The
//! [`GitBackend`] trait is the narrow seam behind which that binary lives.

mod error;
mod invoker;

pub use error::GitError;
pub use invoker::{GitBackend, SystemGit};
