//! Caller-side retry for optimistic-concurrency conflicts.
//!
//! The exclusion store reports a lost race as
//! `EvictError::ConcurrentModification` and leaves the decision to retry to
//! its caller. Event handlers use [`retry_on_conflict`] to re-run the whole
//! read-modify-write with jittered exponential backoff. Any other error ends
//! the retry loop immediately.

use crate::clock::Clock;
use crate::error::Result;
use rand::Rng;
use std::time::Duration;

/// Bounds of the conflict retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,

    /// Delay ceiling for the first retry; doubles on every further retry.
    pub base_delay: Duration,

    /// Upper bound for any single delay ceiling.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Delay ceiling before retry number `retry` (0-based).
    pub fn ceiling(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Full jitter: uniform in `[0, ceiling(retry))`.
    pub fn jittered_delay(&self, retry: u32) -> Duration {
        let ceiling = self.ceiling(retry).as_millis() as u64;
        if ceiling == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..ceiling))
    }
}

/// Run `operation`, retrying only while it fails with a concurrent modification.
pub fn retry_on_conflict<T>(
    policy: &RetryPolicy,
    clock: &dyn Clock,
    mut operation: impl FnMut() -> Result<T>,
) -> Result<T> {
    let mut attempt = 1;
    loop {
        match operation() {
            Err(e) if e.is_concurrent_modification() && attempt < policy.max_attempts => {
                let delay = policy.jittered_delay(attempt - 1);
                tracing::debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "write lost a race - retrying"
                );
                clock.sleep(delay);
                attempt += 1;
            }
            other => return other,
        }
    }
}
