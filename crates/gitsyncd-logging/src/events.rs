use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// How important an event is. Ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Debug,
    Info,
    #[default]
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }

    /// Matching `tracing` filter directive. tracing has no critical level.
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Error | Severity::Critical => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "error" => Ok(Severity::Error),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// Structured events emitted while keeping a working copy in sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    ConfigResolved {
        path: PathBuf,
        remote: String,
        branch: String,
        interval: String,
    },
    CreatingDirectory {
        path: PathBuf,
    },
    CloneStarted {
        url: String,
        path: PathBuf,
    },
    CloneFinished {
        path: PathBuf,
    },
    FetchStarted {
        remote: String,
        branch: String,
    },
    CommandStarted {
        command: String,
    },
    RevisionRequested {
        target: String,
    },
    RevisionResolved {
        target: String,
        revision: String,
    },
    InSync {
        revision: String,
    },
    OutOfSync {
        local: String,
        remote: String,
    },
    CheckoutStarted {
        revision: String,
    },
    Synced {
        revision: String,
    },
    SyncLoopStarted {
        interval: String,
    },
    /// The git executable did not answer `--version` at startup
    GitUnavailable {
        program: String,
    },
    /// A tick arrived while the previous sync was still running
    TickSkipped,
    SyncFailed {
        error: String,
    },
    SyncLoopStopped {
        ticks: usize,
        updates: usize,
        failures: usize,
    },
    Aborting {
        error: String,
    },
}

impl LogEvent {
    pub fn severity(&self) -> Severity {
        match self {
            LogEvent::FetchStarted { .. }
            | LogEvent::CommandStarted { .. }
            | LogEvent::RevisionRequested { .. }
            | LogEvent::RevisionResolved { .. }
            | LogEvent::InSync { .. }
            | LogEvent::TickSkipped => Severity::Debug,
            LogEvent::ConfigResolved { .. }
            | LogEvent::CreatingDirectory { .. }
            | LogEvent::CloneStarted { .. }
            | LogEvent::CloneFinished { .. }
            | LogEvent::OutOfSync { .. }
            | LogEvent::CheckoutStarted { .. }
            | LogEvent::Synced { .. }
            | LogEvent::SyncLoopStarted { .. }
            | LogEvent::SyncLoopStopped { .. } => Severity::Info,
            LogEvent::SyncFailed { .. } | LogEvent::GitUnavailable { .. } => Severity::Error,
            LogEvent::Aborting { .. } => Severity::Critical,
        }
    }

    /// Human-readable one-line description
    pub fn message(&self) -> String {
        match self {
            LogEvent::ConfigResolved {
                path,
                remote,
                branch,
                interval,
            } => format!(
                "repository path: {}, remote: {}, branch: {}, sync interval: {}",
                path.display(),
                remote,
                branch,
                interval
            ),
            LogEvent::CreatingDirectory { path } => {
                format!("creating directory for cloning: {}", path.display())
            }
            LogEvent::CloneStarted { url, path } => {
                format!("cloning {} into {}", url, path.display())
            }
            LogEvent::CloneFinished { .. } => "clone finished".to_string(),
            LogEvent::FetchStarted { remote, branch } => format!("fetching {} {}", remote, branch),
            LogEvent::CommandStarted { command } => format!("running command: {}", command),
            LogEvent::RevisionRequested { target } => {
                format!("getting revision for {}", target)
            }
            LogEvent::RevisionResolved { target, revision } => {
                format!("revision for {} is {}", target, revision)
            }
            LogEvent::InSync { .. } => "the repo is in sync with remote".to_string(),
            LogEvent::OutOfSync { local, remote } => format!(
                "the repo is out of sync with remote ({} -> {})",
                short_rev(local),
                short_rev(remote)
            ),
            LogEvent::CheckoutStarted { revision } => format!("checking out {}", revision),
            LogEvent::Synced { revision } => format!("synced to revision {}", revision),
            LogEvent::SyncLoopStarted { interval } => format!("syncing every {}", interval),
            LogEvent::GitUnavailable { program } => format!(
                "{} is not available, make sure it's installed and in PATH",
                program
            ),
            LogEvent::TickSkipped => "previous sync still running, skipping tick".to_string(),
            LogEvent::SyncFailed { error } => format!("error syncing repo: {}", error),
            LogEvent::SyncLoopStopped {
                ticks,
                updates,
                failures,
            } => format!(
                "stopped after {} sync(s): {} update(s), {} failure(s)",
                ticks, updates, failures
            ),
            LogEvent::Aborting { error } => format!("aborting. error: {}", error),
        }
    }

    /// Serialize with severity and timestamp attached
    fn with_metadata(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "severity".to_string(),
                serde_json::Value::String(self.severity().as_str().to_string()),
            );
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

fn short_rev(rev: &str) -> &str {
    rev.get(..12).unwrap_or(rev)
}

/// Receives the events emitted by the sync machinery.
///
/// The core only ever talks to this trait, never to a global logger.
pub trait EventSink: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format with timestamps
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for gitsyncd events - writes to stderr and optionally mirrors to a file
pub struct Logger {
    format: LogFormat,
    min_severity: Severity,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat, min_severity: Severity) -> Self {
        Self {
            format,
            min_severity,
            file_writer: None,
        }
    }

    /// Create a logger that also appends JSON lines to `log_path`
    pub fn with_file(
        format: LogFormat,
        min_severity: Severity,
        log_path: &Path,
    ) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            min_severity,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn min_severity(&self) -> Severity {
        self.min_severity
    }

    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= self.min_severity
    }

    fn log_json(&self, event: &LogEvent) {
        let _ = writeln!(std::io::stderr(), "{}", event.with_metadata());
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let message = event.message();
        let line = match event {
            LogEvent::Synced { .. } | LogEvent::CloneFinished { .. } => {
                format!("{} {}", "✓".bright_green(), message)
            }
            LogEvent::OutOfSync { .. } => format!("{} {}", "→".bright_yellow(), message),
            LogEvent::SyncFailed { .. } | LogEvent::GitUnavailable { .. } => {
                format!("{} {}", "✗".bright_red(), message.bright_red())
            }
            LogEvent::Aborting { .. } => {
                format!("{} {}", "✗".bright_red().bold(), message.bright_red().bold())
            }
            _ if event.severity() == Severity::Debug => {
                format!("{} {}", "·".dimmed(), message.dimmed())
            }
            _ => format!("{} {}", "▶".bright_cyan(), message),
        };
        let _ = writeln!(stderr, "{}", line);
    }

    fn log_compact(&self, event: &LogEvent) {
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let _ = writeln!(
            std::io::stderr(),
            "[{}] {}: {}",
            timestamp,
            event.severity(),
            event.message()
        );
    }
}

impl EventSink for Logger {
    fn log(&self, event: &LogEvent) {
        if !self.enabled(event.severity()) {
            return;
        }

        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let _ = writeln!(file, "{}", event.with_metadata());
            }
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }
}
