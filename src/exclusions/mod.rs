//! Exclusion list store.
//!
//! The list of excluded principals lives in one singleton record
//! (`EXCLUDED_USERS`). Every mutation is a read-modify-write guarded by an
//! equality check on the record's revision, so at most one writer can commit
//! on top of a given snapshot. A writer that loses gets
//! [`EvictError::ConcurrentModification`](crate::error::EvictError) and is
//! expected to re-read and retry; this module never retries on its own.
//!
//! Expired entries are pruned opportunistically: reads filter them out and
//! every committed write drops them. There is no background sweep.

mod expiry;
mod operations;
mod record;


pub use expiry::{exclusion_ttl, expiry_for, is_active, EXCLUSION_TTL_HOURS};
pub use operations::ExclusionStore;
pub use record::{ExcludedPrincipal, ExclusionRecord, EXCLUSION_KEY, VERSION_ATTRIBUTE};
