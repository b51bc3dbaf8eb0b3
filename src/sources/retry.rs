//! Retry with exponential backoff for outbound HTTP calls.
//!
//! Only errors for which
//! [`EngineError::is_retryable`](crate::error::EngineError::is_retryable)
//! holds are retried; everything else is returned after the first attempt.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::EngineResult;

const BACKOFF_MULTIPLIER: u32 = 2;

/// How often and how patiently to retry a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound on any single delay.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::no_retry()
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }

    /// Delay before retry number `attempt` (zero-based), doubling each time.
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        let factor = BACKOFF_MULTIPLIER.saturating_pow(attempt);
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }

    /// Runs `f` until it succeeds, fails permanently, or retries run out.
    pub async fn run<F, Fut, T>(&self, operation: &str, f: F) -> EngineResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = EngineResult<T>>,
    {
        let mut attempt = 0;

        loop {
            match f().await {
                Ok(value) => {
                    if attempt > 0 {
                        info!(operation, attempt = attempt + 1, "Call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => {
                    if !error.is_retryable() || attempt >= self.max_retries {
                        return Err(error);
                    }

                    let backoff = self.backoff_duration(attempt);
                    warn!(
                        operation,
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %error,
                        "Call failed, retrying after backoff"
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}
