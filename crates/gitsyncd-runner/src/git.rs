use std::path::{Path, PathBuf};

use crate::{CommandError, CommandOutput, CommandRunner};

/// A command runner pinned to one working directory.
///
/// Every invocation is prefixed with `-C <path>`, so callers cannot point a
/// command at another directory by accident.
pub struct GitCommand<R> {
    runner: R,
    path: PathBuf,
}

impl<R: CommandRunner> GitCommand<R> {
    pub fn new(runner: R, path: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Full argument list passed to the runner for `args`
    pub fn scoped_args(&self, args: &[&str]) -> Vec<String> {
        let mut cmd_args = Vec::with_capacity(args.len() + 2);
        cmd_args.push("-C".to_string());
        cmd_args.push(self.path.to_string_lossy().into_owned());
        cmd_args.extend(args.iter().map(|a| a.to_string()));
        cmd_args
    }

    /// Command line as it will be executed, for logging
    pub fn command_line(&self, args: &[&str]) -> String {
        self.runner.command_line(&self.scoped_args(args))
    }

    pub async fn run(&self, args: &[&str]) -> Result<CommandOutput, CommandError> {
        self.runner.run(&self.scoped_args(args)).await
    }
}
