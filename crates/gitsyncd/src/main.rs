mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use gitsyncd_core::{prepare, CountedTicker, IntervalTicker, Repository, SyncConfig, SyncLoop};
use gitsyncd_logging::{init_tracing, EventSink, LogEvent, LogFormat, Logger, Severity};
use gitsyncd_runner::{CommandRunner, ProcessRunner};

use crate::config::{format_interval, parse_interval, FileConfig, Overrides, Settings};

#[derive(Parser, Debug)]
#[command(
    name = "gitsyncd",
    about = "Keep a git working copy in sync with a remote branch",
    version,
    author
)]
struct Cli {
    /// The path of the repository
    #[arg(long)]
    path: Option<PathBuf>,

    /// The name of the remote to sync with (default: origin)
    #[arg(long)]
    remote: Option<String>,

    /// The name of the remote branch to sync (default: master)
    #[arg(long)]
    branch: Option<String>,

    /// The repository remote URL to clone from when the path holds no repository
    #[arg(long = "initfrom", visible_alias = "init-from")]
    init_from: Option<String>,

    /// The time interval for syncing (1m, 35s, 2m3s, 500ms...) (default: 1m)
    #[arg(long, value_parser = parse_interval)]
    interval: Option<Duration>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// More verbose output, for debugging purposes
    #[arg(long)]
    debug: bool,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<LogFormatChoice>,

    /// Also append JSON log lines to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Config file (default: ./gitsyncd.toml, then the global config)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sync once right away and exit
    #[arg(long)]
    once: bool,

    /// Show the resolved configuration without syncing
    #[arg(long)]
    dry_run: bool,

    /// Print the final summary as JSON
    #[arg(long)]
    json_output: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

impl From<&Cli> for Overrides {
    fn from(cli: &Cli) -> Self {
        Self {
            path: cli.path.clone(),
            remote: cli.remote.clone(),
            branch: cli.branch.clone(),
            init_from: cli.init_from.clone(),
            interval: cli.interval,
            log_format: cli.log_format.map(Into::into),
            log_file: cli.log_file.clone(),
            verbose: cli.verbose,
            debug: cli.debug,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            let format = cli.log_format.map(Into::into).unwrap_or_default();
            abort(&Logger::new(format, Severity::Error), format!("{:#}", e));
        }
    };

    if cli.dry_run {
        print_dry_run(&settings.sync, cli.json_output)?;
        return Ok(());
    }

    init_tracing(settings.min_severity.filter_directive(), settings.log_format);

    let logger = match settings.log_file {
        Some(ref log_path) => {
            match Logger::with_file(settings.log_format, settings.min_severity, log_path) {
                Ok(logger) => logger,
                Err(e) => abort(
                    &Logger::new(settings.log_format, settings.min_severity),
                    format!("failed to open log file {}: {}", log_path.display(), e),
                ),
            }
        }
        None => Logger::new(settings.log_format, settings.min_severity),
    };
    let logger: Arc<dyn EventSink> = Arc::new(logger);

    let sync = &settings.sync;
    logger.log(&LogEvent::ConfigResolved {
        path: sync.path.clone(),
        remote: sync.remote.clone(),
        branch: sync.branch.clone(),
        interval: format_interval(sync.interval),
    });

    // Each sync retries git, so a missing binary is only reported here.
    let runner = ProcessRunner::git();
    if !runner.is_available().await {
        logger.log(&LogEvent::GitUnavailable {
            program: runner.program().to_string(),
        });
    }

    let repo = Repository::from_config(runner, sync, logger.clone());
    if let Err(e) = prepare(&repo, sync.init_from.as_deref()).await {
        abort(logger.as_ref(), e);
    }

    let sync_loop = SyncLoop::new(&repo);
    let summary = if cli.once {
        sync_loop.run(&mut CountedTicker::new(1)).await
    } else {
        let mut ticker = IntervalTicker::new(sync.interval);
        let cancel = ticker.cancel_handle();
        let handler = ctrlc::set_handler(move || {
            eprintln!("\nInterrupted. Finishing current sync...");
            cancel.cancel();
        });
        if let Err(e) = handler {
            abort(logger.as_ref(), format!("failed to set Ctrl+C handler: {}", e));
        }

        logger.log(&LogEvent::SyncLoopStarted {
            interval: format_interval(ticker.period()),
        });
        sync_loop.run(&mut ticker).await
    };

    if cli.json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    if cli.once && summary.failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Read the config file (explicit or discovered) and merge it with the flags
fn load_settings(cli: &Cli) -> Result<Settings> {
    let file_config = match cli.config {
        Some(ref path) => Some(FileConfig::load(path)?),
        None => {
            let working_dir =
                std::env::current_dir().context("Failed to get current directory")?;
            FileConfig::discover(&working_dir)?.map(|(_, config)| config)
        }
    };
    Settings::resolve(&Overrides::from(cli), file_config.as_ref())
}

fn aborting(error: impl std::fmt::Display) -> LogEvent {
    LogEvent::Aborting {
        error: error.to_string(),
    }
}

/// Log a fatal startup error and exit with status 1
fn abort(logger: &dyn EventSink, error: impl std::fmt::Display) -> ! {
    logger.log(&aborting(error));
    std::process::exit(1);
}

fn print_dry_run(sync: &SyncConfig, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(sync)?);
        return Ok(());
    }

    println!("=== Dry Run ===");
    println!("Repository path: {}", sync.path.display());
    println!("Remote: {}", sync.remote);
    println!("Branch: {}", sync.branch);
    println!("Sync interval: {}", format_interval(sync.interval));
    match sync.init_from {
        Some(ref url) => println!("Bootstrap from: {}", url),
        None => println!("Bootstrap from: (none)"),
    }
    Ok(())
}
