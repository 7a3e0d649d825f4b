mod common;

use std::fs;

use common::{args, repo_at, RecordingSink, ScriptedRunner};
use gitsyncd_core::{prepare, Preparation, StartupError, SyncError};
use gitsyncd_logging::LogEvent;
use tempfile::TempDir;

const URL: &str = "https://example/repo.git";

#[tokio::test]
async fn test_invalid_without_bootstrap_url_fails() {
    let dir = TempDir::new().unwrap();
    let sink = RecordingSink::new();
    let repo = repo_at(dir.path(), ScriptedRunner::new(), &sink);

    let err = prepare(&repo, None).await.unwrap_err();

    assert!(matches!(err, StartupError::InvalidRepository(ref p) if p == dir.path()));
    assert!(err
        .to_string()
        .starts_with("no valid repository found in the specified path"));
    assert!(repo.runner().calls().is_empty());
}

#[tokio::test]
async fn test_existing_repository_needs_no_bootstrap() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    let sink = RecordingSink::new();
    let repo = repo_at(dir.path(), ScriptedRunner::new(), &sink);

    let prepared = prepare(&repo, Some(URL)).await.unwrap();

    assert_eq!(prepared, Preparation::AlreadyValid);
    assert!(repo.runner().calls().is_empty());
}

#[tokio::test]
async fn test_bootstrap_creates_directory_and_clones() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("r");
    let sink = RecordingSink::new();
    let repo = repo_at(&path, ScriptedRunner::new().materialize_clones(), &sink);

    assert!(!repo.valid().await.unwrap());
    let prepared = prepare(&repo, Some(URL)).await.unwrap();

    assert_eq!(prepared, Preparation::Bootstrapped);
    assert!(path.is_dir());
    let path_arg = path.to_string_lossy().into_owned();
    assert_eq!(
        repo.runner().calls(),
        vec![args(&["-C", path_arg.as_str(), "clone", URL, "."])]
    );
    assert!(repo.valid().await.unwrap());
    assert!(sink.any(|e| matches!(e, LogEvent::CreatingDirectory { path: p } if p == &path)));
    assert!(sink.any(|e| matches!(e, LogEvent::CloneFinished { .. })));
}

#[tokio::test]
async fn test_bootstrap_into_existing_empty_directory() {
    let dir = TempDir::new().unwrap();
    let sink = RecordingSink::new();
    let repo = repo_at(dir.path(), ScriptedRunner::new().materialize_clones(), &sink);

    let prepared = prepare(&repo, Some(URL)).await.unwrap();

    assert_eq!(prepared, Preparation::Bootstrapped);
    assert_eq!(repo.runner().count("clone"), 1);
    assert!(!sink.any(|e| matches!(e, LogEvent::CreatingDirectory { .. })));
}

#[tokio::test]
async fn test_failed_clone_is_a_bootstrap_error() {
    let dir = TempDir::new().unwrap();
    let sink = RecordingSink::new();
    let runner = ScriptedRunner::new().fail(
        &format!("clone {} .", URL),
        128,
        "fatal: repository not found",
    );
    let repo = repo_at(dir.path(), runner, &sink);

    let err = prepare(&repo, Some(URL)).await.unwrap_err();

    assert!(matches!(
        err,
        StartupError::Bootstrap(SyncError::Command(ref e)) if e.exit_code() == Some(128)
    ));
    assert!(err.to_string().contains("fatal: repository not found"));
    assert!(!sink.any(|e| matches!(e, LogEvent::CloneFinished { .. })));
}

#[tokio::test]
async fn test_clone_that_leaves_no_repository_is_rejected() {
    let dir = TempDir::new().unwrap();
    let sink = RecordingSink::new();
    // Clone "succeeds" but no metadata directory appears.
    let repo = repo_at(dir.path(), ScriptedRunner::new(), &sink);

    let err = prepare(&repo, Some(URL)).await.unwrap_err();

    assert!(matches!(err, StartupError::InvalidRepository(_)));
}

#[tokio::test]
async fn test_path_that_is_a_file_cannot_be_bootstrapped() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("not-a-dir");
    fs::write(&file, "x").unwrap();
    let sink = RecordingSink::new();
    let repo = repo_at(&file, ScriptedRunner::new(), &sink);

    let err = prepare(&repo, Some(URL)).await.unwrap_err();

    assert!(matches!(
        err,
        StartupError::Sync(SyncError::Filesystem { ref path, .. }) if path == &file.join(".git")
    ));
    assert_eq!(repo.runner().count("clone"), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_created_directory_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("r");
    let sink = RecordingSink::new();
    let repo = repo_at(&path, ScriptedRunner::new().materialize_clones(), &sink);

    prepare(&repo, Some(URL)).await.unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o700 & !current_umask());
}

#[cfg(unix)]
fn current_umask() -> u32 {
    use std::os::unix::fs::PermissionsExt;

    // A directory created with the default mode reveals the umask without libc.
    let dir = TempDir::new().unwrap();
    let probe = dir.path().join("probe");
    fs::create_dir(&probe).unwrap();
    0o777 & !fs::metadata(&probe).unwrap().permissions().mode()
}
