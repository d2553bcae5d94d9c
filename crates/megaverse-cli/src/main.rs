//! Megaverse reconciler CLI
//!
//! Fetches the observed and goal maps for the configured candidate,
//! derives the minimal action set, and applies it under bounded
//! concurrency. Exits non-zero when the run aborts or leaves cells
//! unconverged, so shell loops can simply rerun until clean.

mod config;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use megaverse_api::{ApiClient, RetryPolicy};
use megaverse_engine::Reconciler;

use config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = ApiClient::new(config.base_url.clone(), config.candidate_id.clone());
    let policy = RetryPolicy::new(config.max_attempts, config.base_delay);
    let reconciler =
        Reconciler::new(client, policy, config.concurrency).with_pacing(config.pacing);

    match reconciler.reconcile().await {
        Ok(report) => {
            println!("{}", report);
            for failure in &report.failures {
                println!("  failed: {} ({})", failure.action, failure.error);
            }
            if report.is_converged() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            tracing::error!("reconciliation aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}
