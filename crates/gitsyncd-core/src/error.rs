use std::path::PathBuf;
use thiserror::Error;

use gitsyncd_runner::CommandError;

/// Errors from the repository operations, passed through `sync` unchanged
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Errors that abort the process before polling starts
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("no valid repository found in the specified path: {}", .0.display())]
    InvalidRepository(PathBuf),

    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Bootstrap clone failed: {0}")]
    Bootstrap(#[source] SyncError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}
