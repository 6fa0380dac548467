//! Exclude, restore, and list operations.

use super::expiry::{expiry_for, is_active};
use super::record::{ExcludedPrincipal, ExclusionRecord, EXCLUSION_KEY};
use crate::clock::Clock;
use crate::error::{EvictError, Result};
use crate::table::{ReadConsistency, RecordStore, WriteOutcome};
use std::sync::Arc;

/// Optimistically-concurrent access to the exclusion list record.
#[derive(Clone)]
pub struct ExclusionStore {
    table: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

impl ExclusionStore {
    pub fn new(table: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self { table, clock }
    }

    /// Exclude `principal` for one TTL from now.
    ///
    /// The new entry set is the snapshot's active entries, minus any older
    /// entry for the same principal, plus a fresh entry. The write only
    /// commits if the record is still the one just read.
    ///
    /// # Errors
    ///
    /// * `EvictError::ConcurrentModification` - another writer committed first
    /// * `EvictError::UserError` - empty principal
    /// * `EvictError::StoreError` - backend failure
    pub fn exclude(&self, principal: &str) -> Result<()> {
        validate_principal(principal)?;

        let snapshot = self.read(ReadConsistency::Eventual)?;
        let now = self.clock.now();

        let mut entries: Vec<ExcludedPrincipal> = snapshot
            .iter()
            .flat_map(|s| s.excluded_users.iter())
            .filter(|entry| is_active(entry, now) && entry.username != principal)
            .cloned()
            .collect();
        entries.push(ExcludedPrincipal {
            username: principal.to_string(),
            expires_at: expiry_for(now),
        });

        self.commit(snapshot.as_ref(), entries)?;

        tracing::info!(principal, "excluded principal");
        Ok(())
    }

    /// Remove any entry for `principal`, expired or not.
    ///
    /// Returns `false` without writing anything when no entry matched.
    ///
    /// # Errors
    ///
    /// * `EvictError::ConcurrentModification` - another writer committed first
    /// * `EvictError::UserError` - empty principal
    /// * `EvictError::StoreError` - backend failure
    pub fn remove_user_exclusion(&self, principal: &str) -> Result<bool> {
        validate_principal(principal)?;

        let Some(snapshot) = self.read(ReadConsistency::Eventual)? else {
            tracing::debug!(principal, "no exclusion list yet - nothing to remove");
            return Ok(false);
        };

        let remaining: Vec<ExcludedPrincipal> = snapshot
            .excluded_users
            .iter()
            .filter(|entry| entry.username != principal)
            .cloned()
            .collect();

        if remaining.len() == snapshot.excluded_users.len() {
            tracing::debug!(principal, "principal was not excluded - skipping write");
            return Ok(false);
        }

        let now = self.clock.now();
        let remaining = remaining
            .into_iter()
            .filter(|entry| is_active(entry, now))
            .collect();
        self.commit(Some(&snapshot), remaining)?;

        tracing::info!(principal, "removed principal exclusion");
        Ok(true)
    }

    /// Currently excluded principals, sorted ascending and duplicate-free.
    pub fn get_excluded_users(&self) -> Result<Vec<String>> {
        let mut users: Vec<String> = self
            .active_entries()?
            .into_iter()
            .map(|entry| entry.username)
            .collect();
        users.dedup();
        Ok(users)
    }

    /// Active entries with their expiry stamps, sorted by principal.
    ///
    /// Uses a strongly-consistent read and never writes.
    pub fn active_entries(&self) -> Result<Vec<ExcludedPrincipal>> {
        let Some(record) = self.read(ReadConsistency::Strong)? else {
            return Ok(Vec::new());
        };

        let now = self.clock.now();
        let mut entries: Vec<ExcludedPrincipal> = record
            .excluded_users
            .into_iter()
            .filter(|entry| is_active(entry, now))
            .collect();
        entries.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(entries)
    }

    fn read(&self, consistency: ReadConsistency) -> Result<Option<ExclusionRecord>> {
        self.table
            .get(EXCLUSION_KEY, consistency)?
            .map(ExclusionRecord::from_item)
            .transpose()
    }

    fn commit(
        &self,
        snapshot: Option<&ExclusionRecord>,
        entries: Vec<ExcludedPrincipal>,
    ) -> Result<()> {
        let record = ExclusionRecord::successor(snapshot, entries, self.clock.now());
        let condition = ExclusionRecord::unchanged_since(snapshot);

        match self.table.put(EXCLUSION_KEY, record.to_item()?, condition)? {
            WriteOutcome::Committed => Ok(()),
            WriteOutcome::ConditionFailed => {
                tracing::debug!(
                    read_revision = snapshot.map(|s| s.revision),
                    "exclusion list changed since it was read"
                );
                Err(EvictError::ConcurrentModification {
                    key: EXCLUSION_KEY.to_string(),
                })
            }
        }
    }
}

fn validate_principal(principal: &str) -> Result<()> {
    if principal.trim().is_empty() {
        return Err(EvictError::UserError(
            "principal must not be empty".to_string(),
        ));
    }
    Ok(())
}
