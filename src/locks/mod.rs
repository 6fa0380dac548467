//! Advisory lock serializing policy pushes.
//!
//! The lock is a singleton record (`LOCK`) in the same table as the
//! exclusion list. It is held exactly while the record exists:
//! - Acquisition polls with a strongly-consistent read, backing off a random
//!   500-1500ms while someone else holds it, and creates the record with a
//!   condition that `taken_by` does not exist yet
//! - Release deletes the record unconditionally and succeeds if it is gone
//!
//! # Known limitation
//!
//! The record carries no expiry and nothing heartbeats it. A holder that dies
//! before releasing leaves the lock held until an operator clears it
//! (`evict lock clear --force`). Age is reported for diagnostics only.
//!
//! The lock does not fence list mutations: `exclude` and
//! `remove_user_exclusion` keep relying on the list's own revision check.
//!
//! # Scoped use
//!
//! [`ExclusionLock::with_lock`] acquires, runs the protected block, and
//! always releases. A [`LockGuard`] also releases on drop, which covers
//! panics inside the block.

mod guard;
mod operations;
mod record;
mod types;


pub use guard::LockGuard;
pub use operations::ExclusionLock;
pub use record::{default_owner, LockRecord, LOCK_KEY, OWNER_ATTRIBUTE};
pub use types::{LockSettings, LockState};
