//! Integration tests for the atomic branch + worktree rename.

mod common;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use grove::git::{GitBackend, GitError, SystemGit};
use grove::workspace::Workspace;
use grove::worktree::{find, WorktreeError, WorktreeRegistry, WorktreeRenamer};

use common::{git, Fixture};

async fn add_worktree(fixture: &Fixture, branch: &str, dir: &str) {
    let path = fixture.root.join(dir);
    git(
        &fixture.bare(),
        &[
            "worktree",
            "add",
            "-b",
            branch,
            path.to_str().unwrap(),
            "main",
        ],
    )
    .await;
}

fn setup(fixture: &Fixture) -> (Arc<dyn GitBackend>, Workspace, WorktreeRenamer) {
    let git: Arc<dyn GitBackend> = Arc::new(SystemGit::new());
    let workspace = Workspace::open(&fixture.root).unwrap();
    let renamer = WorktreeRenamer::new(Arc::clone(&git), workspace.clone());
    (git, workspace, renamer)
}

async fn branch_exists(fixture: &Fixture, branch: &str) -> bool {
    tokio::process::Command::new("git")
        .args(["show-ref", "--verify", "--quiet", &format!("refs/heads/{branch}")])
        .current_dir(fixture.bare())
        .status()
        .await
        .unwrap()
        .success()
}

#[tokio::test]
async fn test_successful_rename() {
    let fixture = Fixture::new().await;
    add_worktree(&fixture, "feature", "feature").await;
    let (_, workspace, renamer) = setup(&fixture);

    let registry = WorktreeRegistry::new(Arc::new(SystemGit::new()), workspace.bare_dir());
    let infos = registry.list(false).await.unwrap();

    let new_dir = renamer
        .rename(&infos, "feature", "feature2", &fixture.root)
        .await
        .unwrap();

    assert_eq!(new_dir, fixture.root.join("feature2"));
    assert!(new_dir.is_dir());
    assert!(!fixture.root.join("feature").exists());
    assert!(branch_exists(&fixture, "feature2").await);
    assert!(!branch_exists(&fixture, "feature").await);

    // No dangling admin entry: the registry resolves the new name, not the
    // old, and the moved worktree is still fully functional.
    let infos = registry.list(false).await.unwrap();
    assert!(find(&infos, "feature2").is_some());
    assert!(find(&infos, "feature").is_none());
    git(&new_dir, &["status", "--porcelain"]).await;
}

#[tokio::test]
async fn test_second_rename_fails_with_not_found() {
    let fixture = Fixture::new().await;
    add_worktree(&fixture, "feature", "feature").await;
    let (_, workspace, renamer) = setup(&fixture);
    let registry = WorktreeRegistry::new(Arc::new(SystemGit::new()), workspace.bare_dir());

    let infos = registry.list(false).await.unwrap();
    renamer
        .rename(&infos, "feature", "feature2", &fixture.root)
        .await
        .unwrap();

    // An identical second call: `feature` no longer exists.
    let infos = registry.list(false).await.unwrap();
    let result = renamer
        .rename(&infos, "feature", "feature2", &fixture.root)
        .await;
    assert!(matches!(result, Err(WorktreeError::NotFound(name)) if name == "feature"));
}

#[tokio::test]
async fn test_rename_sanitizes_directory_name() {
    let fixture = Fixture::new().await;
    add_worktree(&fixture, "feature", "feature").await;
    let (_, workspace, renamer) = setup(&fixture);
    let registry = WorktreeRegistry::new(Arc::new(SystemGit::new()), workspace.bare_dir());

    let infos = registry.list(false).await.unwrap();
    let new_dir = renamer
        .rename(&infos, "feature", "feat/login", &fixture.root)
        .await
        .unwrap();

    assert_eq!(new_dir, fixture.root.join("feat-login"));
    assert!(branch_exists(&fixture, "feat/login").await);
}

#[tokio::test]
async fn test_rename_preconditions() {
    let fixture = Fixture::new().await;
    add_worktree(&fixture, "feature", "feature").await;
    let (_, workspace, renamer) = setup(&fixture);
    let registry = WorktreeRegistry::new(Arc::new(SystemGit::new()), workspace.bare_dir());
    let infos = registry.list(false).await.unwrap();

    let same = renamer
        .rename(&infos, "feature", "feature", &fixture.root)
        .await;
    assert!(matches!(same, Err(WorktreeError::SameName(_))));

    let exists = renamer
        .rename(&infos, "feature", "main", &fixture.root)
        .await;
    assert!(matches!(exists, Err(WorktreeError::BranchExists(_))));

    let missing = renamer
        .rename(&infos, "ghost", "anything", &fixture.root)
        .await;
    assert!(matches!(missing, Err(WorktreeError::NotFound(_))));

    // Nothing mutated by the failed attempts.
    assert!(branch_exists(&fixture, "feature").await);
    assert!(fixture.root.join("feature").is_dir());
}

#[tokio::test]
async fn test_rename_refused_from_inside_worktree() {
    let fixture = Fixture::new().await;
    add_worktree(&fixture, "feature", "feature").await;
    let (_, workspace, renamer) = setup(&fixture);
    let registry = WorktreeRegistry::new(Arc::new(SystemGit::new()), workspace.bare_dir());
    let infos = registry.list(false).await.unwrap();

    // Subdirectories are protected too: the check is by path prefix.
    let subdir = fixture.root.join("feature").join("src");
    std::fs::create_dir_all(&subdir).unwrap();
    let result = renamer.rename(&infos, "feature", "feature2", &subdir).await;
    assert!(matches!(result, Err(WorktreeError::InsideTarget(_))));
}

#[tokio::test]
async fn test_rename_refuses_dirty_worktree() {
    let fixture = Fixture::new().await;
    add_worktree(&fixture, "feature", "feature").await;
    std::fs::write(fixture.root.join("feature").join("wip.txt"), "wip").unwrap();
    let (_, workspace, renamer) = setup(&fixture);
    let registry = WorktreeRegistry::new(Arc::new(SystemGit::new()), workspace.bare_dir());
    let infos = registry.list(false).await.unwrap();

    let result = renamer
        .rename(&infos, "feature", "feature2", &fixture.root)
        .await;
    assert!(matches!(result, Err(WorktreeError::Dirty(_))));
}

#[tokio::test]
async fn test_rename_refuses_locked_worktree() {
    let fixture = Fixture::new().await;
    add_worktree(&fixture, "feature", "feature").await;
    let feature_dir = fixture.root.join("feature");
    git(
        &fixture.bare(),
        &["worktree", "lock", feature_dir.to_str().unwrap()],
    )
    .await;
    let (_, workspace, renamer) = setup(&fixture);
    let registry = WorktreeRegistry::new(Arc::new(SystemGit::new()), workspace.bare_dir());
    let infos = registry.list(false).await.unwrap();

    let result = renamer
        .rename(&infos, "feature", "feature2", &fixture.root)
        .await;
    assert!(matches!(result, Err(WorktreeError::Locked(_))));
}

#[tokio::test]
async fn test_rename_refuses_existing_destination() {
    let fixture = Fixture::new().await;
    add_worktree(&fixture, "feature", "feature").await;
    std::fs::create_dir(fixture.root.join("feature2")).unwrap();
    let (_, workspace, renamer) = setup(&fixture);
    let registry = WorktreeRegistry::new(Arc::new(SystemGit::new()), workspace.bare_dir());
    let infos = registry.list(false).await.unwrap();

    let result = renamer
        .rename(&infos, "feature", "feature2", &fixture.root)
        .await;
    assert!(matches!(result, Err(WorktreeError::DestinationExists(_))));
}

#[tokio::test]
async fn test_rename_retargets_tracking_branch() {
    let fixture = Fixture::new().await;

    // Remote gains `renamed` after the clone, so no local branch shadows it.
    git(&fixture.origin, &["branch", "feature"]).await;
    git(&fixture.origin, &["branch", "renamed"]).await;
    git(&fixture.bare(), &["fetch", "--prune", "origin"]).await;
    let feature_dir = fixture.root.join("feature");
    git(
        &fixture.bare(),
        &[
            "worktree",
            "add",
            "--track",
            "-b",
            "feature",
            feature_dir.to_str().unwrap(),
            "origin/feature",
        ],
    )
    .await;

    let (_, workspace, renamer) = setup(&fixture);
    let registry = WorktreeRegistry::new(Arc::new(SystemGit::new()), workspace.bare_dir());
    let infos = registry.list(false).await.unwrap();
    renamer
        .rename(&infos, "feature", "renamed", &fixture.root)
        .await
        .unwrap();

    let upstream = git(
        &fixture.bare(),
        &[
            "for-each-ref",
            "--format=%(upstream:short)",
            "refs/heads/renamed",
        ],
    )
    .await;
    assert_eq!(upstream.trim(), "origin/renamed");
}

#[tokio::test]
async fn test_failed_directory_move_restores_branch() {
    let fixture = Fixture::new().await;
    add_worktree(&fixture, "feature", "feature").await;
    let (_, workspace, renamer) = setup(&fixture);
    let registry = WorktreeRegistry::new(Arc::new(SystemGit::new()), workspace.bare_dir());
    let infos = registry.list(false).await.unwrap();

    let plan = renamer
        .validate(&infos, "feature", "feature2", &fixture.root)
        .await
        .unwrap();

    // The destination appears between validation and execution; the branch
    // rename succeeds but the non-empty directory makes the move fail.
    let blocker = fixture.root.join("feature2");
    std::fs::create_dir(&blocker).unwrap();
    std::fs::write(blocker.join("keep.txt"), "occupied").unwrap();

    let result = renamer.execute(&plan).await;
    assert!(matches!(result, Err(WorktreeError::Io(_))));

    // Rollback restored the branch name; the worktree never moved.
    assert!(branch_exists(&fixture, "feature").await);
    assert!(!branch_exists(&fixture, "feature2").await);
    assert!(fixture.root.join("feature").is_dir());
}

/// Backend that injects a failure into any invocation containing `needle`.
struct FailOn {
    inner: SystemGit,
    needle: &'static str,
}

#[async_trait]
impl GitBackend for FailOn {
    async fn run(&self, cwd: &Path, args: &[&str]) -> Result<String, GitError> {
        if args.contains(&self.needle) {
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                stderr: "injected failure".to_string(),
            });
        }
        self.inner.run(cwd, args).await
    }

    async fn query(&self, cwd: &Path, args: &[&str]) -> Result<Option<String>, GitError> {
        self.inner.query(cwd, args).await
    }
}

#[tokio::test]
async fn test_failed_step_rolls_back_branch_and_directory() {
    let fixture = Fixture::new().await;
    add_worktree(&fixture, "feature", "feature").await;

    let workspace = Workspace::open(&fixture.root).unwrap();
    let registry = WorktreeRegistry::new(Arc::new(SystemGit::new()), workspace.bare_dir());
    let infos = registry.list(false).await.unwrap();

    // Branch rename and directory move succeed; the repair step fails.
    let failing: Arc<dyn GitBackend> = Arc::new(FailOn {
        inner: SystemGit::new(),
        needle: "repair",
    });
    let renamer = WorktreeRenamer::new(failing, workspace.clone());
    let result = renamer
        .rename(&infos, "feature", "feature2", &fixture.root)
        .await;
    assert!(result.is_err());

    // Rollback restored the original names on both resources.
    assert!(branch_exists(&fixture, "feature").await);
    assert!(!branch_exists(&fixture, "feature2").await);
    assert!(fixture.root.join("feature").is_dir());
    assert!(!fixture.root.join("feature2").exists());

    // The worktree survived the round trip.
    let infos = registry.list(false).await.unwrap();
    assert!(find(&infos, "feature").is_some());
}
