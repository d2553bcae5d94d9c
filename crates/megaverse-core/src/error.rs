//! Error types for megaverse reconciliation

use thiserror::Error;

/// Reconciliation errors
#[derive(Error, Debug)]
pub enum MegaverseError {
    // Precondition errors (fatal, abort the run)
    #[error("grid dimension mismatch: observed {observed_rows}x{observed_columns}, goal {goal_rows}x{goal_columns}")]
    DimensionMismatch {
        observed_rows: usize,
        observed_columns: usize,
        goal_rows: usize,
        goal_columns: usize,
    },

    #[error("ragged grid: row {row} has {got} cells, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        got: usize,
    },

    // Fetch errors (fatal, the run needs both snapshots)
    #[error("failed to fetch {what} map: {detail}")]
    FetchFailed { what: &'static str, detail: String },

    // Per-action errors (recorded in the report, the run continues)
    #[error("rate limit still exceeded after {attempts} attempts")]
    RateLimitExhausted { attempts: u32 },

    #[error("remote call failed: {0}")]
    Remote(String),
}

/// Result type for megaverse operations
pub type MegaverseResult<T> = Result<T, MegaverseError>;
