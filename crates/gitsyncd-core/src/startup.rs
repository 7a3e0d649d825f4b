use std::io::ErrorKind;
use std::path::Path;

use gitsyncd_logging::LogEvent;
use gitsyncd_runner::CommandRunner;

use crate::error::{StartupError, SyncError};
use crate::Repository;

/// How the working copy became usable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preparation {
    /// A repository was already present at the path
    AlreadyValid,
    /// The path was populated by cloning the bootstrap URL
    Bootstrapped,
}

/// Make sure `repo` points at an initialized working copy before polling.
///
/// Without a valid repository and without `init_from` this fails with
/// [`StartupError::InvalidRepository`]. With `init_from`, the directory is
/// created if needed and the URL cloned into it. Every error here is fatal.
pub async fn prepare<R: CommandRunner>(
    repo: &Repository<R>,
    init_from: Option<&str>,
) -> Result<Preparation, StartupError> {
    if repo.valid().await? {
        return Ok(Preparation::AlreadyValid);
    }

    let Some(url) = init_from else {
        return Err(StartupError::InvalidRepository(repo.path().to_path_buf()));
    };

    if !dir_exists(repo.path()).await? {
        repo.sink().log(&LogEvent::CreatingDirectory {
            path: repo.path().to_path_buf(),
        });
        create_dir(repo.path()).await?;
    }

    repo.init_from(url).await.map_err(StartupError::Bootstrap)?;

    if !repo.valid().await? {
        return Err(StartupError::InvalidRepository(repo.path().to_path_buf()));
    }

    Ok(Preparation::Bootstrapped)
}

async fn dir_exists(path: &Path) -> Result<bool, SyncError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.is_dir()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(source) => Err(SyncError::Filesystem {
            path: path.to_path_buf(),
            source,
        }),
    }
}

async fn create_dir(path: &Path) -> Result<(), StartupError> {
    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o700);

    builder
        .create(path)
        .await
        .map_err(|source| StartupError::CreateDirectory {
            path: path.to_path_buf(),
            source,
        })
}
