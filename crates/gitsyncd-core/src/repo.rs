use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gitsyncd_logging::{EventSink, LogEvent};
use gitsyncd_runner::{CommandOutput, CommandRunner, GitCommand};

use crate::error::SyncError;
use crate::outcome::SyncOutcome;
use crate::SyncConfig;

/// Metadata directory whose presence marks an initialized working copy
pub const METADATA_DIR: &str = ".git";

/// A working copy tracking one branch of one remote.
///
/// Nothing about the repository state is cached: validity is read from the
/// filesystem and revisions from git on every call.
pub struct Repository<R> {
    git: GitCommand<R>,
    remote: String,
    branch: String,
    sink: Arc<dyn EventSink>,
}

impl<R: CommandRunner> Repository<R> {
    pub fn new(
        runner: R,
        path: impl Into<PathBuf>,
        remote: impl Into<String>,
        branch: impl Into<String>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            git: GitCommand::new(runner, path),
            remote: remote.into(),
            branch: branch.into(),
            sink,
        }
    }

    /// Build from configuration that has already passed [`SyncConfig::validate`]
    pub fn from_config(runner: R, config: &SyncConfig, sink: Arc<dyn EventSink>) -> Self {
        Self::new(
            runner,
            config.path.clone(),
            config.remote.clone(),
            config.branch.clone(),
            sink,
        )
    }

    pub fn path(&self) -> &Path {
        self.git.path()
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn runner(&self) -> &R {
        self.git.runner()
    }

    pub(crate) fn sink(&self) -> &Arc<dyn EventSink> {
        &self.sink
    }

    /// Whether the path currently holds an initialized repository.
    ///
    /// A missing metadata directory is `Ok(false)`; any other filesystem
    /// failure is an error.
    pub async fn valid(&self) -> Result<bool, SyncError> {
        let metadata_dir = self.path().join(METADATA_DIR);
        match tokio::fs::metadata(&metadata_dir).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(SyncError::Filesystem {
                path: metadata_dir,
                source,
            }),
        }
    }

    /// Clone `url` into the repository path, which must already exist.
    ///
    /// Not idempotent: gate it behind [`Repository::valid`].
    pub async fn init_from(&self, url: &str) -> Result<(), SyncError> {
        self.sink.log(&LogEvent::CloneStarted {
            url: url.to_string(),
            path: self.path().to_path_buf(),
        });
        self.run(&["clone", url, "."]).await?;
        self.sink.log(&LogEvent::CloneFinished {
            path: self.path().to_path_buf(),
        });
        Ok(())
    }

    /// Update remote-tracking refs for `remote/branch`; the working tree is untouched
    pub async fn fetch(&self, remote: &str, branch: &str) -> Result<(), SyncError> {
        self.sink.log(&LogEvent::FetchStarted {
            remote: remote.to_string(),
            branch: branch.to_string(),
        });
        self.run(&["fetch", remote, branch]).await?;
        Ok(())
    }

    /// Revision currently checked out
    pub async fn revision(&self) -> Result<String, SyncError> {
        self.resolve("HEAD").await
    }

    /// Last fetched revision of `remote/branch`. Only as fresh as the last fetch.
    pub async fn remote_revision(&self) -> Result<String, SyncError> {
        let target = format!("{}/{}", self.remote, self.branch);
        self.resolve(&target).await
    }

    /// Move the working tree to `revision`, discarding local modifications
    pub async fn checkout(&self, revision: &str) -> Result<(), SyncError> {
        self.sink.log(&LogEvent::CheckoutStarted {
            revision: revision.to_string(),
        });
        self.run(&["checkout", revision]).await?;
        self.sink.log(&LogEvent::Synced {
            revision: revision.to_string(),
        });
        Ok(())
    }

    /// Fetch, compare and check out the remote revision if it differs.
    ///
    /// Errors are returned exactly as the failing step produced them and are
    /// not logged here.
    pub async fn sync(&self) -> Result<SyncOutcome, SyncError> {
        self.fetch(&self.remote, &self.branch).await?;
        let local = self.revision().await?;
        let remote = self.remote_revision().await?;

        if local == remote {
            self.sink.log(&LogEvent::InSync {
                revision: local.clone(),
            });
            return Ok(SyncOutcome::UpToDate { revision: local });
        }

        self.sink.log(&LogEvent::OutOfSync {
            local: local.clone(),
            remote: remote.clone(),
        });
        self.checkout(&remote).await?;
        Ok(SyncOutcome::Updated {
            from: local,
            to: remote,
        })
    }

    async fn resolve(&self, target: &str) -> Result<String, SyncError> {
        self.sink.log(&LogEvent::RevisionRequested {
            target: target.to_string(),
        });
        let output = self.run(&["rev-parse", target]).await?;
        let revision = output.stdout_trimmed();
        self.sink.log(&LogEvent::RevisionResolved {
            target: target.to_string(),
            revision: revision.clone(),
        });
        Ok(revision)
    }

    async fn run(&self, args: &[&str]) -> Result<CommandOutput, SyncError> {
        self.sink.log(&LogEvent::CommandStarted {
            command: self.git.command_line(args),
        });
        Ok(self.git.run(args).await?)
    }
}
