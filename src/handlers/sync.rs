//! Policy sync: lock, read the list, publish, release.

use crate::error::Result;
use crate::exclusions::ExclusionStore;
use crate::locks::ExclusionLock;
use crate::policy::PolicyPublisher;

/// What a successful sync published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Principals in the published policy, in published order.
    pub excluded_users: Vec<String>,

    /// Policy content as stored by the policy store.
    pub policy: String,
}

/// Publish the current exclusion list while holding the lock.
///
/// At most one sync runs at a time across all invocations. The lock is
/// released whatever happens; a publish failure is returned to the caller
/// and leaves both the list and the previously stored policy as they were.
pub fn sync_policy(
    owner: &str,
    store: &ExclusionStore,
    lock: &ExclusionLock,
    publisher: &dyn PolicyPublisher,
) -> Result<SyncReport> {
    lock.with_lock(owner, || {
        let excluded_users = store.get_excluded_users()?;
        let policy = publisher.update_policy(&excluded_users)?;

        tracing::info!(?excluded_users, "updated policy to exclude users");
        Ok(SyncReport {
            excluded_users,
            policy,
        })
    })
}
