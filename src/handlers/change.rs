//! Record-change events from the table.

use super::sync::{sync_policy, SyncReport};
use crate::error::{EvictError, Result};
use crate::exclusions::{ExclusionStore, EXCLUSION_KEY};
use crate::locks::ExclusionLock;
use crate::policy::PolicyPublisher;
use serde::Deserialize;

/// A batch of change notifications for table records.
///
/// The new record image is not modelled. A sync always re-reads the list.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<ChangeRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeRecord {
    #[serde(rename = "eventName", default)]
    pub event_name: String,

    pub dynamodb: ChangeBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeBody {
    #[serde(rename = "Keys")]
    pub keys: ChangeKeys,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeKeys {
    pub id: StringAttribute,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StringAttribute {
    #[serde(rename = "S")]
    pub s: String,
}

impl ChangeEvent {
    /// Parse a batch from its JSON envelope.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| EvictError::UserError(format!("failed to parse change event: {}", e)))
    }

    /// Keys of every record touched by the batch.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.dynamodb.keys.id.s.as_str())
    }

    /// Whether any notification in the batch concerns the exclusion list.
    pub fn touches_exclusion_list(&self) -> bool {
        self.keys().any(|key| key == EXCLUSION_KEY)
    }
}

/// Result of handling one change batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// The policy was re-published from the current list.
    Synced(SyncReport),
    /// The batch only touched other records (such as the lock).
    Skipped,
}

/// Sync the policy once if the batch touched the exclusion list.
pub fn handle_change_event(
    event: &ChangeEvent,
    owner: &str,
    store: &ExclusionStore,
    lock: &ExclusionLock,
    publisher: &dyn PolicyPublisher,
) -> Result<ChangeOutcome> {
    if !event.touches_exclusion_list() {
        tracing::info!("this is not an excluded users update - skipping");
        return Ok(ChangeOutcome::Skipped);
    }

    sync_policy(owner, store, lock, publisher).map(ChangeOutcome::Synced)
}
