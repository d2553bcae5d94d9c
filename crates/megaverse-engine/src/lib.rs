//! Megaverse Engine - diffing, scheduling, and the reconciliation driver
//!
//! The reconciliation cycle:
//! 1. Fetch the observed and goal snapshots
//! 2. Diff them into per-cell delete/create actions
//! 3. Apply action groups through a bounded worker pool
//! 4. Report created/deleted/skipped/failed

pub mod diff;
pub mod executor;
pub mod report;
pub mod driver;

pub use diff::*;
pub use executor::*;
pub use report::*;
pub use driver::*;
