//! # gitsyncd-runner
//!
//! Subprocess execution for gitsyncd.
//!
//! The daemon never links against a git library; it shells out to the `git`
//! executable and treats it as a black box. This crate owns that boundary.
//!
//! ## Key Types
//!
//! - [`CommandRunner`] - Runs one program with an argument list
//! - [`ProcessRunner`] - [`CommandRunner`] backed by a real child process
//! - [`GitCommand`] - Pins every invocation to one repository directory
//! - [`CommandError`] - Failure carrying cause, command line and output

mod git;
mod output;
mod spawner;
mod traits;

pub use git::GitCommand;
pub use output::CommandOutput;
pub use spawner::ProcessRunner;
pub use traits::{render_command_line, CommandError, CommandFailure, CommandRunner};
