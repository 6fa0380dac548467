//! Stored shape of the lock record.

use crate::error::{EvictError, Result};
use crate::table::{Item, ID_ATTRIBUTE};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fixed key of the lock record.
pub const LOCK_KEY: &str = "LOCK";

/// Attribute whose absence the conditional create requires.
pub const OWNER_ATTRIBUTE: &str = "taken_by";

/// Who holds the lock and since when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    /// Opaque identifier of the holder (an invocation id or `user@HOST:pid`).
    pub taken_by: String,

    /// Acquisition time.
    pub taken_at: DateTime<Utc>,
}

impl LockRecord {
    pub fn new(taken_by: impl Into<String>, taken_at: DateTime<Utc>) -> Self {
        Self {
            taken_by: taken_by.into(),
            taken_at,
        }
    }

    /// Decode a stored item.
    pub fn from_item(item: Item) -> Result<Self> {
        serde_json::from_value(Value::Object(item)).map_err(|e| {
            EvictError::StoreError(format!("failed to decode '{}' record: {}", LOCK_KEY, e))
        })
    }

    /// Encode for storage, including the `id` attribute.
    pub fn to_item(&self) -> Result<Item> {
        let value = serde_json::to_value(self).map_err(|e| {
            EvictError::StoreError(format!("failed to encode '{}' record: {}", LOCK_KEY, e))
        })?;

        let Value::Object(mut item) = value else {
            return Err(EvictError::StoreError(format!(
                "'{}' record did not encode to an object",
                LOCK_KEY
            )));
        };
        item.insert(ID_ATTRIBUTE.to_string(), Value::String(LOCK_KEY.to_string()));
        Ok(item)
    }

    /// How long the lock has been held at `now`.
    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now.signed_duration_since(self.taken_at)
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self, now: DateTime<Utc>) -> String {
        let age = self.age(now);
        let minutes = age.num_minutes();
        let hours = age.num_hours();
        let days = age.num_days();

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else if minutes > 0 {
            format!("{}m", minutes)
        } else {
            format!("{}s", age.num_seconds().max(0))
        }
    }

    /// Whether the lock has been held longer than `stale_minutes`.
    ///
    /// Informational only: a stale lock is still held.
    pub fn is_stale(&self, now: DateTime<Utc>, stale_minutes: u32) -> bool {
        self.age(now).num_minutes() > i64::from(stale_minutes)
    }
}

impl std::fmt::Display for LockRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (taken at {})", self.taken_by, self.taken_at.to_rfc3339())
    }
}

/// Default holder identity for invocations that do not supply one.
pub fn default_owner() -> String {
    format!("{}:{}", crate::audit::actor_string(), std::process::id())
}
