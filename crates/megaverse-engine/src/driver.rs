//! Reconciliation driver

use std::future::Future;
use std::time::Duration;

use megaverse_api::{ApiClient, CallOutcome, RetryPolicy};
use megaverse_core::{Grid, MegaverseError, MegaverseResult};

use crate::diff::diff;
use crate::executor::Executor;
use crate::report::ReconciliationReport;

/// Top-level fetch-diff-apply control flow.
///
/// Fatal only when a snapshot cannot be fetched or the snapshots
/// disagree on dimensions; per-action failures are folded into the
/// report so a rerun can converge the remaining cells.
pub struct Reconciler {
    client: ApiClient,
    policy: RetryPolicy,
    concurrency: usize,
    pacing: Duration,
}

impl Reconciler {
    pub fn new(client: ApiClient, policy: RetryPolicy, concurrency: usize) -> Self {
        Reconciler {
            client,
            policy,
            concurrency,
            pacing: Duration::ZERO,
        }
    }

    /// Set the per-worker pacing floor passed through to the executor
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Fetch both snapshots, derive actions, apply them
    pub async fn reconcile(&self) -> MegaverseResult<ReconciliationReport> {
        let observed = self
            .fetch_snapshot("observed", || self.client.fetch_observed())
            .await?;
        let goal = self
            .fetch_snapshot("goal", || self.client.fetch_goal())
            .await?;

        let actions = diff(&observed, &goal)?;
        let touched = distinct_positions(&actions);
        tracing::info!(
            "{} of {} cells differ, applying {} actions",
            touched,
            observed.cell_count(),
            actions.len()
        );

        let executor = Executor::new(self.client.clone(), self.policy, self.concurrency)
            .with_pacing(self.pacing);
        let mut report = executor.run(actions).await;
        report.skipped = (observed.cell_count() - touched) as u32;
        tracing::info!("reconciliation finished: {}", report);
        Ok(report)
    }

    /// One map read through the retry policy; any terminal failure is
    /// fatal, the run cannot proceed without both snapshots
    async fn fetch_snapshot<F, Fut>(&self, what: &'static str, fetch: F) -> MegaverseResult<Grid>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = CallOutcome<Grid>>,
    {
        let trace = self
            .policy
            .execute(|| fetch())
            .await
            .map_err(|e| MegaverseError::FetchFailed {
                what,
                detail: e.to_string(),
            })?;

        trace.value.ok_or(MegaverseError::FetchFailed {
            what,
            detail: "map endpoint answered 404".to_string(),
        })
    }
}

/// Actions arrive row-major, so equal positions are adjacent
fn distinct_positions(actions: &[megaverse_core::Action]) -> usize {
    let mut count = 0;
    let mut last = None;
    for action in actions {
        if last != Some(action.position()) {
            count += 1;
            last = Some(action.position());
        }
    }
    count
}
