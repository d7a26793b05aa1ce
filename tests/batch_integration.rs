//! Integration tests for batch execution against real worktrees.

mod common;

use std::sync::Arc;

use grove::git::{GitBackend, SystemGit};
use grove::worktree::{find, run_batch, WorktreeError, WorktreeRegistry};

use common::{git, Fixture};

async fn add_worktree(fixture: &Fixture, branch: &str) {
    let path = fixture.root.join(branch);
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

#[tokio::test]
async fn test_partial_failure_leaves_successes_applied() {
    let fixture = Fixture::new().await;
    add_worktree(&fixture, "alpha").await;
    add_worktree(&fixture, "beta").await;

    // `alpha` is already locked, so locking it again fails; `beta` succeeds.
    git(
        &fixture.bare(),
        &["worktree", "lock", fixture.root.join("alpha").to_str().unwrap()],
    )
    .await;

    let backend: Arc<dyn GitBackend> = Arc::new(SystemGit::new());
    let registry = WorktreeRegistry::new(Arc::clone(&backend), fixture.bare());
    let infos = registry.list(true).await.unwrap();
    let bare = fixture.bare();

    let targets = vec!["alpha".to_string(), "beta".to_string()];
    let result = run_batch(&infos, &targets, |info| {
        let backend = Arc::clone(&backend);
        let bare = bare.clone();
        async move {
            let path = info.path.to_string_lossy().into_owned();
            backend.run(&bare, &["worktree", "lock", &path]).await?;
            Ok(())
        }
    })
    .await;

    match result {
        Err(WorktreeError::Batch { targets }) => assert_eq!(targets, vec!["alpha"]),
        other => panic!("expected Batch, got {other:?}"),
    }

    // The sibling target's lock is observably applied.
    let infos = registry.list(true).await.unwrap();
    assert!(find(&infos, "beta").unwrap().locked);
}

#[tokio::test]
async fn test_unresolved_target_aborts_whole_batch() {
    let fixture = Fixture::new().await;
    add_worktree(&fixture, "alpha").await;

    let backend: Arc<dyn GitBackend> = Arc::new(SystemGit::new());
    let registry = WorktreeRegistry::new(Arc::clone(&backend), fixture.bare());
    let infos = registry.list(true).await.unwrap();
    let bare = fixture.bare();

    let targets = vec!["alpha".to_string(), "ghost".to_string()];
    let result = run_batch(&infos, &targets, |info| {
        let backend = Arc::clone(&backend);
        let bare = bare.clone();
        async move {
            let path = info.path.to_string_lossy().into_owned();
            backend.run(&bare, &["worktree", "lock", &path]).await?;
            Ok(())
        }
    })
    .await;

    assert!(matches!(result, Err(WorktreeError::NotFound(name)) if name == "ghost"));

    // Strict resolution: nothing was locked.
    let infos = registry.list(true).await.unwrap();
    assert!(!find(&infos, "alpha").unwrap().locked);
}

#[tokio::test]
async fn test_branch_and_dirname_aliases_are_one_target() {
    let fixture = Fixture::new().await;
    let dir = fixture.root.join("feat-login");
    git(
        &fixture.bare(),
        &[
            "worktree",
            "add",
            "-b",
            "feat/login",
            dir.to_str().unwrap(),
            "main",
        ],
    )
    .await;

    let backend: Arc<dyn GitBackend> = Arc::new(SystemGit::new());
    let registry = WorktreeRegistry::new(Arc::clone(&backend), fixture.bare());
    let infos = registry.list(true).await.unwrap();
    let bare = fixture.bare();

    // Locking twice would fail, so a dedupe miss surfaces as a batch error.
    let targets = vec!["feat-login".to_string(), "feat/login".to_string()];
    run_batch(&infos, &targets, |info| {
        let backend = Arc::clone(&backend);
        let bare = bare.clone();
        async move {
            let path = info.path.to_string_lossy().into_owned();
            backend.run(&bare, &["worktree", "lock", &path]).await?;
            Ok(())
        }
    })
    .await
    .unwrap();
}
