use async_trait::async_trait;
use thiserror::Error;

use crate::CommandOutput;

/// Why a command did not complete successfully
#[derive(Error, Debug)]
pub enum CommandFailure {
    #[error("failed to spawn process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("failed to read process output: {0}")]
    OutputFailed(#[source] std::io::Error),

    #[error("exit status {}", describe_exit(.code))]
    NonZeroExit { code: Option<i32> },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "unknown (terminated by signal)".to_string(),
    }
}

/// A failed invocation, keeping the cause, the command line as executed and
/// whatever output was captured before the failure.
#[derive(Error, Debug)]
#[error(
    "{failure} \nwhile running command [{command}] \noutput was [{}]",
    String::from_utf8_lossy(.output)
)]
pub struct CommandError {
    #[source]
    pub failure: CommandFailure,
    pub command: String,
    pub output: Vec<u8>,
}

impl CommandError {
    pub fn new(failure: CommandFailure, command: impl Into<String>, output: Vec<u8>) -> Self {
        Self {
            failure,
            command: command.into(),
            output,
        }
    }

    /// Exit code of the failed process, if it ran to completion
    pub fn exit_code(&self) -> Option<i32> {
        match self.failure {
            CommandFailure::NonZeroExit { code } => code,
            _ => None,
        }
    }

    pub fn output_lossy(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

/// Executes one program with an argument list.
///
/// Implementations must return `Err` for anything other than a zero exit
/// status, so callers never inspect exit codes themselves.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Name or path of the executed program, used when rendering command lines
    fn program(&self) -> &str;

    /// Run the program with `args` and wait for it to exit
    async fn run(&self, args: &[String]) -> Result<CommandOutput, CommandError>;

    /// Render the command line the way it is reported in errors and logs
    fn command_line(&self, args: &[String]) -> String {
        render_command_line(self.program(), args)
    }
}

/// `program arg1 arg2 ...`, one space between each part
pub fn render_command_line(program: &str, args: &[String]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
