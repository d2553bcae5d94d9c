//! Bounded-concurrency action execution

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use megaverse_api::{ApiClient, CallTrace, RetryPolicy};
use megaverse_core::{Action, MegaverseError, MegaverseResult, Position};

use crate::report::{FailedAction, ReconciliationReport};

/// Default worker pool width
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Applies an action list through a bounded worker pool.
///
/// Actions are grouped by position; one group runs as a sequential
/// sub-task (delete strictly before create) while groups for distinct
/// positions run concurrently, at most `concurrency` in flight. A
/// group's failure is recorded and never halts the other groups.
pub struct Executor {
    client: ApiClient,
    policy: RetryPolicy,
    concurrency: usize,
    /// Minimum spacing between one worker's successive calls; zero
    /// leaves throttling entirely to the rate-limit backoff
    pacing: Duration,
}

impl Executor {
    pub fn new(client: ApiClient, policy: RetryPolicy, concurrency: usize) -> Self {
        Executor {
            client,
            policy,
            concurrency: concurrency.max(1),
            pacing: Duration::ZERO,
        }
    }

    /// Set the per-worker pacing floor
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Drive every action to a terminal state and report
    pub async fn run(&self, actions: Vec<Action>) -> ReconciliationReport {
        let mut groups: BTreeMap<Position, Vec<Action>> = BTreeMap::new();
        for action in actions {
            groups.entry(action.position()).or_default().push(action);
        }

        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut workers: JoinSet<ReconciliationReport> = JoinSet::new();

        for (_, group) in groups {
            let permits = Arc::clone(&permits);
            let client = self.client.clone();
            let policy = self.policy;
            let pacing = self.pacing;
            workers.spawn(async move {
                // Holding the Ok keeps the permit; the semaphore is
                // never closed, so Err cannot happen here.
                let _permit = permits.acquire_owned().await;
                apply_group(&client, &policy, pacing, group).await
            });
        }

        let mut report = ReconciliationReport::default();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(sub) => report.merge(sub),
                Err(e) => tracing::warn!("worker task failed: {}", e),
            }
        }
        report
    }
}

/// Run one cell's actions in order, stopping the cell at its first
/// failure; the cell still differs afterwards, so a rerun repairs it.
async fn apply_group(
    client: &ApiClient,
    policy: &RetryPolicy,
    pacing: Duration,
    group: Vec<Action>,
) -> ReconciliationReport {
    let mut report = ReconciliationReport::default();
    let mut first = true;
    for action in group {
        if !first && !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }
        first = false;

        match apply_action(client, policy, &action).await {
            Ok(trace) => {
                tracing::debug!("{} done after {} retries", action, trace.retries);
                match action {
                    Action::Create { .. } => report.created += 1,
                    Action::Delete { .. } => report.deleted += 1,
                }
            }
            Err(error) => {
                tracing::warn!("{} failed: {}", action, error);
                report.failures.push(FailedAction { action, error });
                break;
            }
        }
    }
    report
}

/// One primitive action through the retry policy
async fn apply_action(
    client: &ApiClient,
    policy: &RetryPolicy,
    action: &Action,
) -> MegaverseResult<CallTrace<()>> {
    match *action {
        Action::Delete { position, entity } => {
            // NotFound is success: the entity was already gone
            policy.execute(|| client.delete(position, entity)).await
        }
        Action::Create { position, entity } => {
            let trace = policy.execute(|| client.create(position, entity)).await?;
            if trace.value.is_none() {
                return Err(MegaverseError::Remote(format!(
                    "create endpoint for {} answered 404",
                    entity
                )));
            }
            Ok(trace)
        }
    }
}
