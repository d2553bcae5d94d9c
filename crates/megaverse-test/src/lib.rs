//! Megaverse Test Harness - in-process mock of the entity API
//!
//! Serves the remote contract on an ephemeral port so client, executor,
//! and driver tests run against real HTTP:
//! - configurable map/goal snapshots
//! - fault injection: 429 budgets, Retry-After hints, 404 deletes,
//!   hard failures, artificial latency
//! - request recording and an in-flight high-water mark

pub mod mock_api;

pub use mock_api::*;
