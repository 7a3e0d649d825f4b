//! # gitsyncd-core
//!
//! The synchronization state machine behind gitsyncd.
//!
//! A [`Repository`] names one working copy, one remote and one branch. On
//! every [`Repository::sync`] it fetches, resolves the local and remote
//! revisions, and checks out the remote one when they differ. [`prepare`]
//! validates or bootstraps the working copy at startup, and [`SyncLoop`]
//! repeats the sync on every tick of a [`Ticker`].
//!
//! All git access goes through a [`gitsyncd_runner::CommandRunner`] and all
//! logging through an injected [`gitsyncd_logging::EventSink`], so the whole
//! state machine runs against fakes in tests.

mod config;
mod error;
mod outcome;
mod repo;
mod startup;
mod sync_loop;
mod ticker;

pub use config::{SyncConfig, DEFAULT_BRANCH, DEFAULT_INTERVAL, DEFAULT_REMOTE};
pub use error::{StartupError, SyncError};
pub use outcome::{CycleOutcome, RunSummary, SyncOutcome};
pub use repo::{Repository, METADATA_DIR};
pub use startup::{prepare, Preparation};
pub use sync_loop::SyncLoop;
pub use ticker::{CancelHandle, CountedTicker, IntervalTicker, Ticker};
