use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::{CommandError, CommandFailure, CommandOutput, CommandRunner};

const READ_CHUNK: usize = 8 * 1024;

/// Runs a real executable as a child process
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: String,
    env_vars: HashMap<String, String>,
}

impl ProcessRunner {
    /// Runner for the `git` found on `PATH`
    pub fn git() -> Self {
        Self::new("git")
    }

    pub fn new(program: impl Into<String>) -> Self {
        let mut env_vars = HashMap::new();
        // Never block on a credential prompt; there is nobody to answer it.
        env_vars.insert("GIT_TERMINAL_PROMPT".to_string(), "0".to_string());
        Self {
            program: program.into(),
            env_vars,
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Check if the program can be launched at all
    pub async fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::git()
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, args: &[String]) -> Result<CommandOutput, CommandError> {
        let command_line = self.command_line(args);
        let start = Instant::now();

        trace!(program = %self.program, "Spawning process");

        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().map_err(|e| {
            CommandError::new(CommandFailure::SpawnFailed(e), &command_line, Vec::new())
        })?;

        let missing_pipe = |name: &str| {
            CommandError::new(
                CommandFailure::OutputFailed(std::io::Error::other(format!(
                    "{name} was not captured"
                ))),
                &command_line,
                Vec::new(),
            )
        };
        let mut stdout_pipe = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
        let mut stderr_pipe = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

        let mut stdout = Vec::new();
        let mut combined = Vec::new();
        let mut stdout_buf = [0u8; READ_CHUNK];
        let mut stderr_buf = [0u8; READ_CHUNK];
        let mut stdout_open = true;
        let mut stderr_open = true;

        // Read both streams concurrently so neither pipe fills up and stalls
        // the child.
        while stdout_open || stderr_open {
            tokio::select! {
                result = stdout_pipe.read(&mut stdout_buf), if stdout_open => {
                    match result {
                        Ok(0) => stdout_open = false,
                        Ok(n) => {
                            trace!(bytes = n, "stdout");
                            stdout.extend_from_slice(&stdout_buf[..n]);
                            combined.extend_from_slice(&stdout_buf[..n]);
                        }
                        Err(e) => {
                            return Err(CommandError::new(
                                CommandFailure::OutputFailed(e),
                                command_line,
                                combined,
                            ));
                        }
                    }
                }
                result = stderr_pipe.read(&mut stderr_buf), if stderr_open => {
                    match result {
                        Ok(0) => stderr_open = false,
                        Ok(n) => {
                            trace!(bytes = n, "stderr");
                            combined.extend_from_slice(&stderr_buf[..n]);
                        }
                        Err(e) => {
                            return Err(CommandError::new(
                                CommandFailure::OutputFailed(e),
                                command_line,
                                combined,
                            ));
                        }
                    }
                }
            }
        }

        let status = match child.wait().await {
            Ok(status) => status,
            Err(e) => {
                return Err(CommandError::new(
                    CommandFailure::OutputFailed(e),
                    command_line,
                    combined,
                ));
            }
        };
        let duration = start.elapsed();

        debug!(
            exit_code = status.code().unwrap_or(-1),
            duration_ms = duration.as_millis(),
            "Process completed"
        );

        if !status.success() {
            return Err(CommandError::new(
                CommandFailure::NonZeroExit {
                    code: status.code(),
                },
                command_line,
                combined,
            ));
        }

        Ok(CommandOutput::new(stdout, combined, duration))
    }
}
