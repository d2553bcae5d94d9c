//! Run reports

use std::fmt;

use megaverse_core::{Action, MegaverseError};

/// A mutation that could not be applied
#[derive(Debug)]
pub struct FailedAction {
    pub action: Action,
    pub error: MegaverseError,
}

/// Outcome summary of one reconciliation run
#[derive(Debug, Default)]
pub struct ReconciliationReport {
    pub created: u32,
    pub deleted: u32,
    /// Cells already matching the goal
    pub skipped: u32,
    pub failures: Vec<FailedAction>,
}

impl ReconciliationReport {
    /// True when every derived action was applied
    pub fn is_converged(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fold a sub-task report into this one
    pub fn merge(&mut self, other: ReconciliationReport) {
        self.created += other.created;
        self.deleted += other.deleted;
        self.skipped += other.skipped;
        self.failures.extend(other.failures);
    }
}

impl fmt::Display for ReconciliationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} deleted, {} skipped, {} failed",
            self.created,
            self.deleted,
            self.skipped,
            self.failures.len()
        )
    }
}
