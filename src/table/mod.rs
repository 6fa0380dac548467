//! Keyed record backend.
//!
//! The coordination store persists exactly two singleton records, the
//! exclusion list and the lock, in one keyed table. The backend only offers
//! single-key operations: a read, a conditional whole-record put, and an
//! unconditional delete. There are no transactions and no native locks;
//! everything above this module is built from those three primitives.
//!
//! A losing conditional put is reported as [`WriteOutcome::ConditionFailed`]
//! rather than as an error, so callers decide which domain error it becomes.

mod file;
#[cfg(test)]
pub(crate) mod memory;

pub use file::FileTable;

use crate::error::{EvictError, Result};
use serde_json::{Map, Value};

/// A stored record: a JSON object of attributes.
pub type Item = Map<String, Value>;

/// Attribute holding the record's own key.
pub const ID_ATTRIBUTE: &str = "id";

/// Read consistency requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadConsistency {
    /// May observe a slightly older committed record.
    Eventual,
    /// Observes the latest committed record.
    Strong,
}

/// Server-side predicate evaluated atomically with a put.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteCondition {
    /// Always commit.
    Unconditional,
    /// Commit only if the stored record lacks this attribute (or is absent).
    AttributeNotExists(String),
    /// Commit only if the stored record has this attribute with exactly this value.
    AttributeEquals(String, Value),
}

impl WriteCondition {
    /// Evaluate the condition against the currently stored record.
    pub fn holds(&self, current: Option<&Item>) -> bool {
        match self {
            WriteCondition::Unconditional => true,
            WriteCondition::AttributeNotExists(attr) => {
                current.is_none_or(|item| !item.contains_key(attr))
            }
            WriteCondition::AttributeEquals(attr, expected) => {
                current.and_then(|item| item.get(attr)) == Some(expected)
            }
        }
    }
}

/// Result of a conditional put.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The record was replaced.
    Committed,
    /// The condition did not hold; nothing was written.
    ConditionFailed,
}

/// Single-key record operations.
pub trait RecordStore: Send + Sync {
    /// Read the record stored under `key`, if any.
    fn get(&self, key: &str, consistency: ReadConsistency) -> Result<Option<Item>>;

    /// Replace the whole record under `key` if `condition` holds at commit time.
    fn put(&self, key: &str, item: Item, condition: WriteCondition) -> Result<WriteOutcome>;

    /// Remove the record under `key`. Succeeds when nothing is stored.
    fn delete(&self, key: &str) -> Result<()>;
}

/// Reject keys that could escape the table directory or collide with latch files.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(EvictError::StoreError(format!("invalid record key '{}'", key)))
    }
}
