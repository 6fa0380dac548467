//! Stored shape of the exclusion list.

use crate::error::{EvictError, Result};
use crate::table::{Item, WriteCondition, ID_ATTRIBUTE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fixed key of the exclusion list record.
pub const EXCLUSION_KEY: &str = "EXCLUDED_USERS";

/// Attribute compared by every conditional write of the list.
pub const VERSION_ATTRIBUTE: &str = "revision";

/// One excluded principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedPrincipal {
    /// Human-readable principal name (usually an email-like username).
    pub username: String,

    /// Creation time plus the exclusion TTL.
    pub expires_at: DateTime<Utc>,
}

/// The singleton exclusion list record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRecord {
    /// Excluded principals, unique by `username`.
    #[serde(default)]
    pub excluded_users: Vec<ExcludedPrincipal>,

    /// When the record was last written (informational).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<DateTime<Utc>>,

    /// Version token; incremented by every committed write.
    pub revision: u64,
}

impl ExclusionRecord {
    /// Decode a stored item.
    pub fn from_item(item: Item) -> Result<Self> {
        serde_json::from_value(Value::Object(item)).map_err(|e| {
            EvictError::StoreError(format!(
                "failed to decode '{}' record: {}",
                EXCLUSION_KEY, e
            ))
        })
    }

    /// Encode for storage, including the `id` attribute.
    pub fn to_item(&self) -> Result<Item> {
        let value = serde_json::to_value(self).map_err(|e| {
            EvictError::StoreError(format!(
                "failed to encode '{}' record: {}",
                EXCLUSION_KEY, e
            ))
        })?;

        let Value::Object(mut item) = value else {
            return Err(EvictError::StoreError(format!(
                "'{}' record did not encode to an object",
                EXCLUSION_KEY
            )));
        };
        item.insert(
            ID_ATTRIBUTE.to_string(),
            Value::String(EXCLUSION_KEY.to_string()),
        );
        Ok(item)
    }

    /// The record that replaces `snapshot` (or creates the first one).
    pub fn successor(
        snapshot: Option<&ExclusionRecord>,
        excluded_users: Vec<ExcludedPrincipal>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            excluded_users,
            last_updated_at: Some(now),
            revision: snapshot.map_or(1, |s| s.revision + 1),
        }
    }

    /// Condition that only holds while the stored record is still `snapshot`.
    pub fn unchanged_since(snapshot: Option<&ExclusionRecord>) -> WriteCondition {
        match snapshot {
            Some(s) => WriteCondition::AttributeEquals(
                VERSION_ATTRIBUTE.to_string(),
                Value::from(s.revision),
            ),
            None => WriteCondition::AttributeNotExists(VERSION_ATTRIBUTE.to_string()),
        }
    }
}
