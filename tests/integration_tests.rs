use gs::core::{GitCmd, RepoState, StoreError, SystemExecer};
use gs::utils::cancel::CancelToken;
use gs::{Hash, Repository, Type};
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .expect("git must be installed");
    assert!(status.success(), "git {:?} failed", args);
}

/// A fresh repository with one commit on `main`.
fn setup_repo() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    git(dir.path(), &["init", "--quiet"]);
    git(dir.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(dir.path(), &["config", "user.name", "Test User"]);
    git(dir.path(), &["config", "user.email", "test@example.com"]);
    git(dir.path(), &["commit", "--quiet", "--allow-empty", "-m", "initial"]);
    dir
}

async fn open(dir: &TempDir) -> Repository {
    Repository::open(dir.path(), Arc::new(SystemExecer), &CancelToken::new())
        .await
        .unwrap()
}

#[tokio::test]
async fn blob_round_trip() {
    let dir = setup_repo();
    let repo = open(&dir).await;
    let cancel = CancelToken::new();

    let content: Vec<u8> = (0..=255u8).cycle().take(100_000).collect();
    let hash = repo
        .write_object(&cancel, Type::Blob, &mut content.as_slice())
        .await
        .unwrap();
    assert!(!hash.is_zero());
    assert_eq!(hash.as_str().len(), 40);

    let mut out = Vec::new();
    repo.read_object(&cancel, Type::Blob, &hash, &mut out)
        .await
        .unwrap();
    assert_eq!(out, content);
}

#[tokio::test]
async fn writing_is_deterministic() {
    let dir = setup_repo();
    let repo = open(&dir).await;
    let cancel = CancelToken::new();

    let first = repo
        .write_object(&cancel, Type::Blob, &mut &b"hello world\n"[..])
        .await
        .unwrap();
    let second = repo
        .write_object(&cancel, Type::Blob, &mut &b"hello world\n"[..])
        .await
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(first, Hash::from("3b18e512dba79e4c8300dd08aeb37f8e728b8dad"));
}

#[tokio::test]
async fn empty_blob() {
    let dir = setup_repo();
    let repo = open(&dir).await;
    let cancel = CancelToken::new();

    let hash = repo
        .write_object(&cancel, Type::Blob, &mut &b""[..])
        .await
        .unwrap();
    assert_eq!(hash, Hash::from("e69de29bb2d1d6434b8b29ae776945d8c85d17b7"));
    let out = repo.read_object_bytes(&cancel, Type::Blob, &hash).await.unwrap();
    assert!(out.is_empty());
}

#[tokio::test]
async fn reading_missing_object_fails() {
    let dir = setup_repo();
    let repo = open(&dir).await;

    let mut out = Vec::new();
    let err = repo
        .read_object(
            &CancelToken::new(),
            Type::Blob,
            &Hash::from("0123456789012345678901234567890123456789"),
            &mut out,
        )
        .await
        .unwrap_err();
    assert_eq!(err.op(), "reading object");
    assert!(err.to_string().starts_with("reading object: "));
}

#[tokio::test]
async fn reading_with_wrong_type_fails() {
    let dir = setup_repo();
    let repo = open(&dir).await;
    let cancel = CancelToken::new();

    let hash = repo
        .write_object(&cancel, Type::Blob, &mut &b"not a commit"[..])
        .await
        .unwrap();
    let result = repo.read_object_bytes(&cancel, Type::Commit, &hash).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn cancelled_operation_fails_promptly() {
    let dir = setup_repo();
    let repo = open(&dir).await;

    let cancel = CancelToken::new();
    cancel.cancel();

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        repo.write_object(&cancel, Type::Blob, &mut &b"data"[..]),
    )
    .await
    .expect("must not hang");
    assert!(result.unwrap_err().is_cancelled());
}

#[cfg(unix)]
#[tokio::test]
async fn cancellation_interrupts_a_blocked_read() {
    // A git stand-in that never produces the object.
    let dir = tempfile::tempdir().unwrap();
    let fake_git = dir.path().join("slow-git");
    std::fs::write(&fake_git, "#!/bin/sh\nexec sleep 30\n").unwrap();
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&fake_git, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
    let repo = Repository::at(dir.path(), Arc::new(SystemExecer)).with_git(fake_git.as_os_str());

    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let mut out = Vec::new();
    let result = tokio::time::timeout(
        Duration::from_secs(10),
        repo.read_object(&cancel, Type::Blob, &Hash::from("abc"), &mut out),
    )
    .await
    .expect("cancelled read must not hang");
    let err = result.unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(err.op(), "reading object");
}

#[cfg(unix)]
#[tokio::test]
async fn custom_git_is_used_from_open_onwards() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("calls.log");
    let fake_git = dir.path().join("logging-git");
    std::fs::write(
        &fake_git,
        format!(
            "#!/bin/sh\necho \"$@\" >> '{}'\nif [ \"$1\" = rev-parse ]; then pwd; else echo 0123abcd; fi\n",
            log.display()
        ),
    )
    .unwrap();
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&fake_git, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    let cancel = CancelToken::new();
    let repo = Repository::open_with_git(
        dir.path(),
        fake_git.as_os_str(),
        Arc::new(SystemExecer),
        &cancel,
    )
    .await
    .unwrap();
    let hash = repo
        .write_object(&cancel, Type::Blob, &mut &b"data"[..])
        .await
        .unwrap();
    assert_eq!(hash, Hash::from("0123abcd"));

    let calls = std::fs::read_to_string(&log).unwrap();
    let calls: Vec<&str> = calls.lines().collect();
    assert_eq!(
        calls,
        vec!["rev-parse --show-toplevel", "hash-object -w --stdin -t blob"]
    );
}

#[tokio::test]
async fn repo_state_round_trip() {
    let dir = setup_repo();
    let repo = open(&dir).await;
    let cancel = CancelToken::new();

    assert!(matches!(
        RepoState::load(&repo, &cancel).await,
        Err(StoreError::NotInitialized)
    ));

    let state = RepoState {
        trunk: "main".to_string(),
        remote: None,
    };
    let hash = state.save(&repo, &cancel).await.unwrap();
    assert_eq!(
        repo.peel_ref(&cancel, "refs/spice/data").await.unwrap(),
        Some(hash)
    );
    assert_eq!(RepoState::load(&repo, &cancel).await.unwrap(), state);
}

#[tokio::test]
async fn branch_operations() {
    let dir = setup_repo();
    let repo = open(&dir).await;
    let cancel = CancelToken::new();

    assert_eq!(repo.current_branch(&cancel).await.unwrap(), "main");
    repo.create_branch(&cancel, "feature").await.unwrap();
    assert_eq!(repo.current_branch(&cancel).await.unwrap(), "feature");

    let mut branches = repo.local_branches(&cancel).await.unwrap();
    branches.sort();
    assert_eq!(branches, vec!["feature", "main"]);

    repo.checkout_branch(&cancel, "main").await.unwrap();
    repo.delete_branch(&cancel, "feature", false).await.unwrap();
    assert_eq!(repo.local_branches(&cancel).await.unwrap(), vec!["main"]);
    assert!(repo.remotes(&cancel).await.unwrap().is_empty());
}

#[tokio::test]
async fn runner_is_usable_directly() {
    let dir = setup_repo();
    let out = GitCmd::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .dir(dir.path())
        .output_string(&SystemExecer, &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(out, "main");
}
