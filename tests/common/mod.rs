//! Shared fixtures: real temp git repositories arranged as grove workspaces.
#![allow(dead_code)] // each test crate uses a subset of the fixtures

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Run git in `cwd`, panicking on failure.
pub async fn git(cwd: &Path, args: &[&str]) -> String {
    let output = tokio::process::Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .await
        .expect("failed to spawn git");
    assert!(
        output.status.success(),
        "git {args:?} in {} failed: {}",
        cwd.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Create a normal repository with one commit on `main`, acting as the
/// remote end.
pub async fn create_origin(parent: &Path) -> PathBuf {
    let origin = parent.join("origin");
    std::fs::create_dir(&origin).unwrap();

    git(&origin, &["init", "-b", "main"]).await;
    git(&origin, &["config", "user.email", "test@example.com"]).await;
    git(&origin, &["config", "user.name", "Test User"]).await;

    std::fs::write(origin.join("README.md"), "# origin\n").unwrap();
    git(&origin, &["add", "."]).await;
    git(&origin, &["commit", "-m", "initial commit"]).await;

    origin
}

/// Add a commit to a repository (touches a uniquely named file).
pub async fn commit_in(repo: &Path, marker: &str) {
    std::fs::write(repo.join(format!("{marker}.txt")), marker).unwrap();
    git(repo, &["add", "."]).await;
    git(repo, &["commit", "-m", marker]).await;
}

/// Create a workspace: bare clone of `origin` under `.bare/`, remote-tracking
/// refs configured and fetched, plus a `main` worktree tracking `origin/main`.
pub async fn create_workspace(parent: &Path, origin: &Path) -> PathBuf {
    let root = parent.join("ws");
    std::fs::create_dir(&root).unwrap();

    git(
        &root,
        &["clone", "--bare", origin.to_str().unwrap(), ".bare"],
    )
    .await;

    let bare = root.join(".bare");
    git(&bare, &["config", "user.email", "test@example.com"]).await;
    git(&bare, &["config", "user.name", "Test User"]).await;
    git(
        &bare,
        &[
            "config",
            "remote.origin.fetch",
            "+refs/heads/*:refs/remotes/origin/*",
        ],
    )
    .await;
    git(&bare, &["fetch", "--prune", "origin"]).await;

    let main_dir = root.join("main");
    git(
        &bare,
        &["worktree", "add", main_dir.to_str().unwrap(), "main"],
    )
    .await;
    git(&bare, &["branch", "--set-upstream-to=origin/main", "main"]).await;

    root
}

/// A complete origin + workspace pair rooted in one temp directory.
pub struct Fixture {
    pub temp: TempDir,
    pub origin: PathBuf,
    pub root: PathBuf,
}

impl Fixture {
    pub async fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let origin = create_origin(temp.path()).await;
        let root = create_workspace(temp.path(), &origin).await;
        Self { temp, origin, root }
    }

    pub fn bare(&self) -> PathBuf {
        self.root.join(".bare")
    }
}
