//! Configuration file support for gitsyncd.
//!
//! Settings come from three layers: command-line flags, then a TOML file
//! (`gitsyncd.toml` in the working directory, or the global
//! `~/.config/gitsyncd/config.toml`), then built-in defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gitsyncd_core::{SyncConfig, DEFAULT_BRANCH, DEFAULT_INTERVAL, DEFAULT_REMOTE};
use gitsyncd_logging::{LogFormat, Severity};

/// The project config file name
pub const CONFIG_FILE_NAME: &str = "gitsyncd.toml";
/// Directory under the platform config dir holding the global config
pub const GLOBAL_CONFIG_DIR: &str = "gitsyncd";
/// The global config file name
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";

/// Settings loaded from a TOML file. Every field is optional.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Working copy location
    pub path: Option<PathBuf>,
    /// Remote name
    pub remote: Option<String>,
    /// Tracked branch
    pub branch: Option<String>,
    /// Bootstrap URL
    #[serde(alias = "initfrom")]
    pub init_from: Option<String>,
    /// Sync interval in humantime syntax, e.g. "1m30s"
    #[serde(default, with = "humantime_serde")]
    pub interval: Option<Duration>,
    pub log_format: Option<LogFormat>,
    /// Append JSON log lines to this file
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    /// Parse a config file that must exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Find and parse the first config file that exists.
    ///
    /// Returns:
    /// - `Ok(Some((path, config)))` if a file exists and parses successfully
    /// - `Ok(None)` if no config file exists
    /// - `Err(...)` if a file exists but fails to parse (hard error)
    pub fn discover(working_dir: &Path) -> Result<Option<(PathBuf, Self)>> {
        let mut candidates = vec![working_dir.join(CONFIG_FILE_NAME)];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE));
        }

        for candidate in candidates {
            if candidate.exists() {
                let config = Self::load(&candidate)?;
                return Ok(Some((candidate, config)));
            }
        }

        Ok(None)
    }
}

/// Values given on the command line; `None` means "not given"
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub path: Option<PathBuf>,
    pub remote: Option<String>,
    pub branch: Option<String>,
    pub init_from: Option<String>,
    pub interval: Option<Duration>,
    pub log_format: Option<LogFormat>,
    pub log_file: Option<PathBuf>,
    pub verbose: bool,
    pub debug: bool,
}

/// Everything the daemon needs, fully resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub sync: SyncConfig,
    pub log_format: LogFormat,
    pub log_file: Option<PathBuf>,
    pub min_severity: Severity,
}

impl Settings {
    /// Merge flags over file values over defaults.
    /// Priority: command line > config file > built-in default
    pub fn resolve(cli: &Overrides, file: Option<&FileConfig>) -> Result<Self> {
        let file_default = FileConfig::default();
        let file = file.unwrap_or(&file_default);

        let path = cli.path.clone().or_else(|| file.path.clone()).context(
            "No repository path given. Use --path or set `path` in gitsyncd.toml",
        )?;

        let mut sync = SyncConfig::new(path)
            .with_remote(
                cli.remote
                    .clone()
                    .or_else(|| file.remote.clone())
                    .unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
            )
            .with_branch(
                cli.branch
                    .clone()
                    .or_else(|| file.branch.clone())
                    .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            )
            .with_interval(cli.interval.or(file.interval).unwrap_or(DEFAULT_INTERVAL));
        if let Some(url) = cli.init_from.clone().or_else(|| file.init_from.clone()) {
            sync = sync.with_init_from(url);
        }
        sync.validate()?;

        let min_severity = if cli.debug {
            Severity::Debug
        } else if cli.verbose {
            Severity::Info
        } else {
            Severity::Error
        };

        Ok(Self {
            sync,
            log_format: cli.log_format.or(file.log_format).unwrap_or_default(),
            log_file: cli.log_file.clone().or_else(|| file.log_file.clone()),
            min_severity,
        })
    }
}

/// Parse a humantime duration such as `1m`, `35s`, `2m3s` or `500ms`
pub fn parse_interval(s: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(s).map_err(|e| e.to_string())
}

pub fn format_interval(interval: Duration) -> String {
    humantime_serde::re::humantime::format_duration(interval).to_string()
}
