//! Retry with capped exponential backoff.
//!
//! The single retry utility used by every upstream fetch.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use super::settings::UpstreamConfig;
use crate::error::{FetchError, SyncError};

/// Attempt budget and backoff curve for one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }

    /// No waiting between attempts.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Wait after failed attempt `attempt` (1-based): `initial * 2^(attempt-1)`,
    /// capped at `max_backoff`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    ///
    /// # Errors
    /// Returns [`SyncError::UpstreamUnavailable`] carrying the last attempt's
    /// error once every attempt has failed.
    pub async fn run<T, F, Fut>(&self, url: &str, mut op: F) -> Result<T, SyncError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let err = match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if attempt >= max_attempts {
                return Err(SyncError::UpstreamUnavailable {
                    url: url.to_string(),
                    attempts: attempt,
                    last: err,
                });
            }

            let delay = self.delay_for(attempt);
            warn!(
                url,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Upstream fetch failed, retrying"
            );
            if !delay.is_zero() {
                sleep(delay).await;
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&UpstreamConfig::default())
    }
}
