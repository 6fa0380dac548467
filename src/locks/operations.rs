//! Lock acquisition, release, and manual clearing.

use super::guard::LockGuard;
use super::record::{LockRecord, LOCK_KEY, OWNER_ATTRIBUTE};
use super::types::{LockSettings, LockState};
use crate::clock::Clock;
use crate::error::{EvictError, Result};
use crate::table::{ReadConsistency, RecordStore, WriteCondition, WriteOutcome};
use std::sync::Arc;

/// The advisory lock record and the rules for taking it.
#[derive(Clone)]
pub struct ExclusionLock {
    table: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    settings: LockSettings,
}

impl ExclusionLock {
    pub fn new(table: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, settings: LockSettings) -> Self {
        Self {
            table,
            clock,
            settings,
        }
    }

    /// Read the lock with strong consistency.
    pub fn state(&self) -> Result<LockState> {
        match self.table.get(LOCK_KEY, ReadConsistency::Strong)? {
            Some(item) => Ok(LockState::Held(LockRecord::from_item(item)?)),
            None => Ok(LockState::Free),
        }
    }

    /// Take the lock for `owner`, polling while someone else holds it.
    ///
    /// # Returns
    ///
    /// * `Ok(LockRecord)` - The record this call created
    /// * `Err(EvictError::LockConflict)` - Another caller created the lock
    ///   between our read and our create; not retried here
    /// * `Err(EvictError::LockTimeout)` - The lock was held on every attempt
    pub fn take_lock(&self, owner: &str) -> Result<LockRecord> {
        let mut last_holder = None;

        for attempt in 1..=self.settings.max_attempts {
            match self.state()? {
                LockState::Free => return self.create(owner),
                LockState::Held(holder) if attempt < self.settings.max_attempts => {
                    let wait = self.settings.backoff();
                    tracing::info!(
                        attempt,
                        holder = %holder,
                        wait_ms = wait.as_millis() as u64,
                        "lock already set - waiting before checking again"
                    );
                    self.clock.sleep(wait);
                    last_holder = Some(holder);
                }
                // No wait after the final read
                LockState::Held(holder) => last_holder = Some(holder),
            }
        }

        Err(EvictError::LockTimeout {
            attempts: self.settings.max_attempts,
            last_holder,
        })
    }

    /// Delete the lock record. Succeeds when no lock is held.
    pub fn release_lock(&self) -> Result<()> {
        self.table.delete(LOCK_KEY)?;
        tracing::debug!("released lock");
        Ok(())
    }

    /// Take the lock and wrap it in a guard that releases on drop.
    pub fn acquire(&self, owner: &str) -> Result<LockGuard<'_>> {
        let record = self.take_lock(owner)?;
        tracing::info!(owner, "acquired lock");
        Ok(LockGuard::new(self, record))
    }

    /// Run `protected` while holding the lock.
    ///
    /// The lock is released on every exit path. If `protected` fails, its
    /// error is returned; if release fails too, the release error is
    /// attached as a suppressed error instead of replacing it.
    pub fn with_lock<T>(&self, owner: &str, protected: impl FnOnce() -> Result<T>) -> Result<T> {
        let guard = self.acquire(owner)?;
        let outcome = protected();
        let released = guard.release();

        match (outcome, released) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(release_err)) => Err(release_err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(release_err)) => Err(err.with_suppressed(release_err)),
        }
    }

    /// Remove a lock left behind by a holder that never released it.
    ///
    /// Unlike [`release_lock`](Self::release_lock) this refuses when nothing
    /// is held, and returns what was removed for the audit trail.
    pub fn clear(&self) -> Result<LockRecord> {
        let LockState::Held(record) = self.state()? else {
            return Err(EvictError::UserError(
                "no lock is currently held".to_string(),
            ));
        };

        self.table.delete(LOCK_KEY)?;
        tracing::warn!(holder = %record, "lock cleared manually");
        Ok(record)
    }

    fn create(&self, owner: &str) -> Result<LockRecord> {
        let record = LockRecord::new(owner, self.clock.now());
        let condition = WriteCondition::AttributeNotExists(OWNER_ATTRIBUTE.to_string());

        match self.table.put(LOCK_KEY, record.to_item()?, condition)? {
            WriteOutcome::Committed => Ok(record),
            WriteOutcome::ConditionFailed => Err(EvictError::LockConflict {
                owner: owner.to_string(),
            }),
        }
    }
}
