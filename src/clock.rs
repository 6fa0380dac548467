//! Time source used by the store and the lock.
//!
//! Everything that reads the current time or sleeps goes through [`Clock`]
//! so that expiry, `taken_at`, and polling backoff can be driven by a manual
//! clock in tests.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Source of the current time and of deliberate suspension.
pub trait Clock: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
