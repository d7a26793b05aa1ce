//! Cross-process workspace lock.
//!
//! One lock file guards the whole workspace: two mutating grove processes
//! always serialize, even when touching different worktrees. The lock is
//! advisory (a plain file holding the owner's PID, not a kernel lock) and
//! self-heals after a crashed holder via a PID liveness check.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::error::WorkspaceError;

/// Name of the lock file inside a workspace root.
pub const LOCK_FILE_NAME: &str = ".grove-worktree.lock";

/// Attempts at reclaiming a stale lock before giving up. Each reclaim races
/// other acquirers, so the bound keeps a pathological race from looping.
const MAX_ACQUIRE_ATTEMPTS: u32 = 3;

/// Exclusive hold on a workspace, released on drop.
#[derive(Debug)]
pub struct WorkspaceLock {
    path: PathBuf,
    file: Option<fs::File>,
    released: bool,
}

impl WorkspaceLock {
    /// Acquire the lock for the workspace rooted at `root`.
    ///
    /// Creation is exclusive. If the file already exists, its contents are
    /// read as the holder's PID: an unparsable PID or a dead process marks
    /// the lock stale, and it is deleted and re-claimed. A live holder fails
    /// the acquisition immediately; there is no blocking wait.
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::Busy` when a live process holds the lock,
    /// `WorkspaceError::Contended` when stale reclamation keeps losing the
    /// creation race, and `WorkspaceError::Io` on filesystem failures.
    pub fn acquire(root: &Path) -> Result<Self, WorkspaceError> {
        let path = root.join(LOCK_FILE_NAME);

        for _ in 0..MAX_ACQUIRE_ATTEMPTS {
            match Self::try_create(&path) {
                Ok(file) => {
                    tracing::debug!(path = %path.display(), "acquired workspace lock");
                    return Ok(Self {
                        path,
                        file: Some(file),
                        released: false,
                    });
                }
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                    match read_holder_pid(&path) {
                        Some(pid) if process_alive(pid) => {
                            return Err(WorkspaceError::Busy { pid });
                        }
                        holder => {
                            tracing::warn!(
                                path = %path.display(),
                                stale_pid = ?holder,
                                "reclaiming stale workspace lock"
                            );
                            // The holder may have released between the read
                            // and this delete; a missing file is fine.
                            if let Err(err) = fs::remove_file(&path) {
                                if err.kind() != std::io::ErrorKind::NotFound {
                                    return Err(WorkspaceError::Io(err));
                                }
                            }
                        }
                    }
                }
                Err(err) => return Err(WorkspaceError::Io(err)),
            }
        }

        Err(WorkspaceError::Contended { path })
    }

    /// Exclusive-create the lock file with this process's PID as contents.
    fn try_create(path: &Path) -> std::io::Result<fs::File> {
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path)?;
        write!(file, "{}", std::process::id())?;
        Ok(file)
    }

    /// Release the lock.
    ///
    /// Idempotent; deletion errors are swallowed since the guarded operation
    /// has already completed.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        drop(self.file.take());
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(
                    path = %self.path.display(),
                    error = %err,
                    "failed to remove workspace lock file"
                );
            }
        } else {
            tracing::debug!(path = %self.path.display(), "released workspace lock");
        }
    }

    /// Path of the lock file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkspaceLock {
    fn drop(&mut self) {
        self.release_inner();
    }
}

/// Observed state of a workspace's lock file, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockState {
    /// No lock file present.
    Free,
    /// Lock file held by a live process.
    Held {
        /// PID of the holder.
        pid: i32,
    },
    /// Lock file present but its holder is dead or unparsable; the next
    /// acquisition will reclaim it.
    Stale {
        /// PID recorded in the file, when parsable.
        pid: Option<i32>,
    },
}

/// Inspect the lock file of the workspace rooted at `root` without touching
/// it.
#[must_use]
pub fn inspect(root: &Path) -> LockState {
    let path = root.join(LOCK_FILE_NAME);
    if !path.exists() {
        return LockState::Free;
    }
    match read_holder_pid(&path) {
        Some(pid) if process_alive(pid) => LockState::Held { pid },
        pid => LockState::Stale { pid },
    }
}

/// Read and parse the PID recorded in an existing lock file.
///
/// Returns `None` for unreadable or unparsable contents, which callers treat
/// as a stale lock.
fn read_holder_pid(path: &Path) -> Option<i32> {
    let contents = fs::read_to_string(path).ok()?;
    let pid = contents.trim().parse::<i32>().ok()?;
    (pid > 0).then_some(pid)
}

/// Whether a process with the given PID is currently running.
#[cfg(unix)]
fn process_alive(pid: i32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    match kill(Pid::from_raw(pid), None) {
        Ok(()) => true,
        // The process exists but belongs to another user.
        Err(nix::errno::Errno::EPERM) => true,
        Err(_) => false,
    }
}

/// Without `kill(pid, 0)` semantics the holder is assumed alive, so locks are
/// never reclaimed automatically on non-unix platforms.
#[cfg(not(unix))]
fn process_alive(_pid: i32) -> bool {
    true
}
