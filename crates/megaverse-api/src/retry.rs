//! Bounded retry with rate-limit aware backoff
//!
//! Wraps a single remote call. Rate-limit responses are retried up to
//! `max_attempts` total calls, sleeping for the server's Retry-After
//! hint when present and an exponentially growing delay otherwise.
//! Every other outcome is terminal on the first response.

use std::future::Future;
use std::time::Duration;

use megaverse_core::{MegaverseError, MegaverseResult};

use crate::CallOutcome;

/// Terminal record of one retried call
#[derive(Debug)]
pub struct CallTrace<T> {
    /// Payload; None means the server reported 404 for the target
    pub value: Option<T>,
    /// Rate-limit retries performed before the terminal response
    pub retries: u32,
}

/// Retry policy shared by all workers.
///
/// Stateless across calls; per-call attempt state lives on the stack of
/// [`RetryPolicy::execute`], so one policy value may drive any number
/// of concurrent calls.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Total calls allowed per operation, first attempt included
    pub max_attempts: u32,
    /// First backoff wait when the server gives no hint
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Wait before retry number `retry` (0-based): the server hint when
    /// given, else `base_delay` doubled per retry (1s, 2s, 4s, ...)
    pub fn backoff_delay(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(hint) => hint,
            None => self.base_delay * 2u32.saturating_pow(retry),
        }
    }

    /// Drive one remote call to a terminal outcome
    pub async fn execute<T, F, Fut>(&self, mut call: F) -> MegaverseResult<CallTrace<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CallOutcome<T>>,
    {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match call().await {
                CallOutcome::Success(value) => {
                    return Ok(CallTrace {
                        value: Some(value),
                        retries: attempts - 1,
                    });
                }
                CallOutcome::NotFound => {
                    return Ok(CallTrace {
                        value: None,
                        retries: attempts - 1,
                    });
                }
                CallOutcome::RateLimited { retry_after } => {
                    if attempts >= self.max_attempts {
                        return Err(MegaverseError::RateLimitExhausted { attempts });
                    }
                    let delay = self.backoff_delay(attempts - 1, retry_after);
                    tracing::debug!(
                        "rate limited, waiting {:?} before attempt {} of {}",
                        delay,
                        attempts + 1,
                        self.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                }
                CallOutcome::Failed { detail } => {
                    return Err(MegaverseError::Remote(detail));
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}
