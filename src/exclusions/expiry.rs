//! Retention filter for exclusion entries.

use super::record::ExcludedPrincipal;
use chrono::{DateTime, TimeDelta, Utc};

/// Nominal lifetime of an exclusion, in hours.
pub const EXCLUSION_TTL_HOURS: i64 = 24;

/// Nominal lifetime of an exclusion.
pub fn exclusion_ttl() -> TimeDelta {
    TimeDelta::hours(EXCLUSION_TTL_HOURS)
}

/// The `expires_at` stamped on an entry created at `created_at`.
pub fn expiry_for(created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at + exclusion_ttl()
}

/// Whether `entry` is still in effect at `now`.
///
/// An entry is kept while `now - expires_at < TTL`. Since `expires_at` is
/// already `created_at + TTL`, an entry stays active for up to two TTLs
/// after it was created.
pub fn is_active(entry: &ExcludedPrincipal, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(entry.expires_at) < exclusion_ttl()
}
