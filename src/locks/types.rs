//! Lock state and acquisition settings.

use super::record::LockRecord;
use std::time::Duration;

/// Observed state of the lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockState {
    /// No lock record exists.
    Free,
    /// A lock record exists.
    Held(LockRecord),
}

impl LockState {
    pub fn is_held(&self) -> bool {
        matches!(self, LockState::Held(_))
    }

    /// The current holder, if any.
    pub fn holder(&self) -> Option<&LockRecord> {
        match self {
            LockState::Free => None,
            LockState::Held(record) => Some(record),
        }
    }
}

/// Bounds of the acquisition polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockSettings {
    /// Reads of a held lock before giving up.
    pub max_attempts: u32,

    /// Lower bound (inclusive) of the wait after seeing the lock held.
    pub backoff_min: Duration,

    /// Upper bound (exclusive) of the wait after seeing the lock held.
    pub backoff_max: Duration,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            backoff_min: Duration::from_millis(500),
            backoff_max: Duration::from_millis(1500),
        }
    }
}

impl LockSettings {
    /// Pick a uniformly random wait in `[backoff_min, backoff_max)`.
    pub fn backoff(&self) -> Duration {
        use rand::Rng;

        let min = self.backoff_min.as_millis() as u64;
        let max = self.backoff_max.as_millis() as u64;
        if max <= min {
            return self.backoff_min;
        }
        Duration::from_millis(rand::rng().random_range(min..max))
    }
}
