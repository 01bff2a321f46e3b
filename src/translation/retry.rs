/*!
 * Retry policy for oracle dispatch.
 *
 * A small value object replacing ad hoc retry-with-sleep loops: maximum
 * attempts, capped exponential backoff, optional jitter. The policy only
 * computes delays; sleeping is left to the caller.
 */

use std::time::Duration;

use crate::app_config::RetryConfig;

/// Retry schedule for a single dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum attempts, including the first one
    pub max_attempts: u32,

    /// Base backoff in milliseconds for exponential backoff
    pub backoff_base_ms: u64,

    /// Backoff ceiling in milliseconds
    pub backoff_cap_ms: u64,

    /// Whether to add random jitter to each delay
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base_ms: 1000,
            backoff_cap_ms: 30_000,
            jitter: true,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff_base_ms: config.backoff_base_ms,
            backoff_cap_ms: config.backoff_cap_ms,
            jitter: config.jitter,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-based).
    ///
    /// The schedule doubles per attempt from the base, capped at the
    /// ceiling. Jitter adds up to a quarter of the computed delay so that
    /// retrying clients do not synchronize against a struggling service.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let backoff_ms = self
            .backoff_base_ms
            .saturating_mul(1u64 << exponent)
            .min(self.backoff_cap_ms);

        let jitter_ms = if self.jitter && backoff_ms > 0 {
            rand::random::<u64>() % (backoff_ms / 4 + 1)
        } else {
            0
        };

        Duration::from_millis(backoff_ms + jitter_ms)
    }

    /// Whether another attempt is allowed after `attempt` failures.
    pub fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
