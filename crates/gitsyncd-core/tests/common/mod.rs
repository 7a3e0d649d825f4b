#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gitsyncd_core::Repository;
use gitsyncd_logging::{EventSink, LogEvent, Severity};
use gitsyncd_runner::{CommandError, CommandFailure, CommandOutput, CommandRunner};

#[derive(Clone)]
enum Reply {
    Stdout(String),
    Fail { code: i32, output: String },
}

/// Fake git: answers from a table keyed by the arguments after `-C <path>`.
///
/// Unknown commands succeed with empty output.
#[derive(Default)]
pub struct ScriptedRunner {
    replies: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<Vec<String>>>,
    materialize_clones: bool,
    checkout_moves_head: bool,
    yield_once: bool,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A successful `clone` creates `<path>/.git`
    pub fn materialize_clones(mut self) -> Self {
        self.materialize_clones = true;
        self
    }

    /// A successful `checkout <rev>` makes `rev-parse HEAD` answer `<rev>`
    pub fn checkout_moves_head(mut self) -> Self {
        self.checkout_moves_head = true;
        self
    }

    /// Every call suspends once before answering
    pub fn yield_once(mut self) -> Self {
        self.yield_once = true;
        self
    }

    pub fn respond(self, command: &str, stdout: &str) -> Self {
        self.set_response(command, stdout);
        self
    }

    pub fn fail(self, command: &str, code: i32, output: &str) -> Self {
        self.set_failure(command, code, output);
        self
    }

    pub fn set_response(&self, command: &str, stdout: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert(command.to_string(), Reply::Stdout(stdout.to_string()));
    }

    pub fn set_failure(&self, command: &str, code: i32, output: &str) {
        self.replies.lock().unwrap().insert(
            command.to_string(),
            Reply::Fail {
                code,
                output: output.to_string(),
            },
        );
    }

    /// Full argument lists, including the `-C <path>` prefix
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls with the `-C <path>` prefix stripped, joined with spaces
    pub fn commands(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|args| args[2..].join(" "))
            .collect()
    }

    /// Number of calls to one git subcommand, e.g. `checkout`
    pub fn count(&self, subcommand: &str) -> usize {
        self.calls()
            .iter()
            .filter(|args| args.get(2).map(String::as_str) == Some(subcommand))
            .count()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    fn program(&self) -> &str {
        "git"
    }

    async fn run(&self, args: &[String]) -> Result<CommandOutput, CommandError> {
        assert_eq!(args[0], "-C", "runner must be scoped to the repository");
        self.calls.lock().unwrap().push(args.to_vec());

        if self.yield_once {
            tokio::task::yield_now().await;
        }

        let key = args[2..].join(" ");
        let reply = self.replies.lock().unwrap().get(&key).cloned();
        match reply {
            Some(Reply::Fail { code, output }) => Err(CommandError::new(
                CommandFailure::NonZeroExit { code: Some(code) },
                self.command_line(args),
                output.into_bytes(),
            )),
            Some(Reply::Stdout(stdout)) => {
                self.after_success(args);
                Ok(CommandOutput::from_stdout(stdout))
            }
            None => {
                self.after_success(args);
                Ok(CommandOutput::default())
            }
        }
    }
}

impl ScriptedRunner {
    fn after_success(&self, args: &[String]) {
        match args.get(2).map(String::as_str) {
            Some("clone") if self.materialize_clones => {
                std::fs::create_dir_all(PathBuf::from(&args[1]).join(".git")).unwrap();
            }
            Some("checkout") if self.checkout_moves_head => {
                self.set_response("rev-parse HEAD", &format!("{}\n", args[3]));
            }
            _ => {}
        }
    }
}

/// Sink that keeps every event for later assertions
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<LogEvent>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count_at(&self, severity: Severity) -> usize {
        self.events()
            .iter()
            .filter(|e| e.severity() == severity)
            .count()
    }

    pub fn any(&self, pred: impl Fn(&LogEvent) -> bool) -> bool {
        self.events().iter().any(pred)
    }
}

impl EventSink for RecordingSink {
    fn log(&self, event: &LogEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn repo_at(
    path: impl Into<PathBuf>,
    runner: ScriptedRunner,
    sink: &Arc<RecordingSink>,
) -> Repository<ScriptedRunner> {
    Repository::new(runner, path, "origin", "master", sink.clone())
}

pub fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|a| a.to_string()).collect()
}
