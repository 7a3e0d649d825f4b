use serde::Serialize;

/// Result of one successful sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Local and remote revisions already matched
    UpToDate { revision: String },
    /// The working copy was moved from `from` to `to`
    Updated { from: String, to: String },
}

impl SyncOutcome {
    pub fn is_update(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }

    /// Revision checked out after the sync
    pub fn revision(&self) -> &str {
        match self {
            Self::UpToDate { revision } => revision,
            Self::Updated { to, .. } => to,
        }
    }
}

/// What happened on a single tick of the polling loop
#[derive(Debug)]
pub enum CycleOutcome {
    Synced(SyncOutcome),
    Failed(String),
    /// Another sync was still in flight
    Skipped,
}

/// Totals for a polling loop that has stopped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Sync attempts made
    pub ticks: usize,
    /// Syncs that checked out a new revision
    pub updates: usize,
    /// Syncs that returned an error
    pub failures: usize,
    /// Ticks dropped because a sync was already running
    pub skipped: usize,
    /// Revision checked out by the most recent successful sync
    pub last_revision: Option<String>,
}

impl RunSummary {
    pub fn record(&mut self, cycle: &CycleOutcome) {
        match cycle {
            CycleOutcome::Synced(outcome) => {
                self.ticks += 1;
                if outcome.is_update() {
                    self.updates += 1;
                }
                self.last_revision = Some(outcome.revision().to_string());
            }
            CycleOutcome::Failed(_) => {
                self.ticks += 1;
                self.failures += 1;
            }
            CycleOutcome::Skipped => self.skipped += 1,
        }
    }
}
