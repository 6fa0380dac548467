//! RAII lock guard implementation.

use super::operations::ExclusionLock;
use super::record::LockRecord;
use crate::error::Result;

/// RAII guard for the lock record.
///
/// When dropped, the lock record is deleted. If deletion fails, a warning is
/// logged but no panic occurs.
pub struct LockGuard<'a> {
    lock: &'a ExclusionLock,

    /// The record this guard's acquisition created.
    record: LockRecord,

    /// Whether the lock has been released manually.
    released: bool,
}

impl<'a> LockGuard<'a> {
    pub(super) fn new(lock: &'a ExclusionLock, record: LockRecord) -> Self {
        Self {
            lock,
            record,
            released: false,
        }
    }

    /// Release the lock and report any failure to the caller.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.lock.release_lock()
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = self.lock.release_lock()
        {
            tracing::warn!(
                owner = %self.record.taken_by,
                error = %e,
                "failed to release lock"
            );
        }
    }
}
