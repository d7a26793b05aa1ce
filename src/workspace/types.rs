//! The `Workspace` type and root discovery.

use std::path::{Path, PathBuf};

use super::error::WorkspaceError;

/// Directory name of the bare repository inside a workspace root.
pub const BARE_DIR_NAME: &str = ".bare";

/// A located workspace: one bare repository plus sibling worktree directories.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    bare_dir: PathBuf,
}

impl Workspace {
    /// Locate the workspace containing `start` by walking parent directories
    /// until the bare repository marker is found.
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::NotFound` if no ancestor of `start` contains
    /// a bare repository.
    pub fn discover(start: &Path) -> Result<Self, WorkspaceError> {
        for dir in start.ancestors() {
            if is_workspace_root(dir) {
                return Ok(Self::from_root(dir));
            }
        }
        Err(WorkspaceError::NotFound {
            start: start.to_path_buf(),
        })
    }

    /// Open a workspace at a known root.
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::NotFound` if `root` is not a workspace root.
    pub fn open(root: &Path) -> Result<Self, WorkspaceError> {
        if is_workspace_root(root) {
            Ok(Self::from_root(root))
        } else {
            Err(WorkspaceError::NotFound {
                start: root.to_path_buf(),
            })
        }
    }

    fn from_root(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            bare_dir: root.join(BARE_DIR_NAME),
        }
    }

    /// The workspace root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The bare repository directory inside the root.
    #[must_use]
    pub fn bare_dir(&self) -> &Path {
        &self.bare_dir
    }

    /// Directory a worktree for `name` lives in (a direct child of the root).
    #[must_use]
    pub fn worktree_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

/// A directory is a workspace root when it holds a bare repository.
///
/// The `HEAD` file is the cheapest reliable marker of a git directory.
fn is_workspace_root(dir: &Path) -> bool {
    dir.join(BARE_DIR_NAME).join("HEAD").is_file()
}
