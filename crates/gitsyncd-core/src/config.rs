use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::StartupError;

pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_BRANCH: &str = "master";
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Fully resolved settings for one synced repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncConfig {
    /// Working copy location
    pub path: PathBuf,
    /// Remote name, e.g. `origin`
    pub remote: String,
    /// Tracked branch on `remote`
    pub branch: String,
    /// Time between sync attempts
    pub interval: Duration,
    /// Clone from this URL when `path` is not a repository yet
    pub init_from: Option<String>,
}

impl SyncConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            remote: DEFAULT_REMOTE.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            interval: DEFAULT_INTERVAL,
            init_from: None,
        }
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_init_from(mut self, url: impl Into<String>) -> Self {
        self.init_from = Some(url.into());
        self
    }

    /// Reject settings no sync could work with
    pub fn validate(&self) -> Result<(), StartupError> {
        if self.path.as_os_str().is_empty() {
            return Err(StartupError::ConfigError(
                "repository path must not be empty".to_string(),
            ));
        }
        if self.remote.trim().is_empty() {
            return Err(StartupError::ConfigError(
                "remote name must not be empty".to_string(),
            ));
        }
        if self.branch.trim().is_empty() {
            return Err(StartupError::ConfigError(
                "branch name must not be empty".to_string(),
            ));
        }
        if self.interval.is_zero() {
            return Err(StartupError::ConfigError(
                "sync interval must be greater than zero".to_string(),
            ));
        }
        if matches!(self.init_from.as_deref(), Some(url) if url.trim().is_empty()) {
            return Err(StartupError::ConfigError(
                "bootstrap URL must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
