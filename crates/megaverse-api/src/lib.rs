//! Megaverse API - HTTP client and retry policy for the entity service
//!
//! This crate covers the remote half of reconciliation:
//! - ApiClient: map/create/delete calls with structured outcomes
//! - RetryPolicy: bounded retries with rate-limit aware backoff

pub mod client;
pub mod retry;

pub use client::*;
pub use retry::*;
