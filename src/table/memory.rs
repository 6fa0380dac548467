//! In-memory record table for tests.
//!
//! Counts operations, remembers the consistency of every read, and can run a
//! one-shot hook right before the next put evaluates its condition, which is
//! how tests stage "another writer committed between my read and my write".

use super::{validate_key, Item, ReadConsistency, RecordStore, WriteCondition, WriteOutcome};
use crate::error::{EvictError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

type PutHook = Box<dyn FnOnce(&mut HashMap<String, Item>) + Send>;

#[derive(Default)]
pub(crate) struct MemoryTable {
    records: Mutex<HashMap<String, Item>>,
    reads: Mutex<Vec<(String, ReadConsistency)>>,
    puts: AtomicUsize,
    deletes: AtomicUsize,
    before_next_put: Mutex<Option<PutHook>>,
    fail_deletes: AtomicBool,
}

impl MemoryTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Store a record directly, bypassing counters and conditions.
    pub(crate) fn insert(&self, key: &str, item: Item) {
        self.records.lock().unwrap().insert(key.to_string(), item);
    }

    /// Remove a record directly, bypassing counters.
    pub(crate) fn remove(&self, key: &str) {
        self.records.lock().unwrap().remove(key);
    }

    pub(crate) fn snapshot(&self, key: &str) -> Option<Item> {
        self.records.lock().unwrap().get(key).cloned()
    }

    pub(crate) fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub(crate) fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub(crate) fn reads(&self) -> Vec<(String, ReadConsistency)> {
        self.reads.lock().unwrap().clone()
    }

    /// Run `hook` against the stored records just before the next put is evaluated.
    pub(crate) fn before_next_put(
        &self,
        hook: impl FnOnce(&mut HashMap<String, Item>) + Send + 'static,
    ) {
        *self.before_next_put.lock().unwrap() = Some(Box::new(hook));
    }

    /// Make every subsequent delete fail.
    pub(crate) fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }
}

impl RecordStore for MemoryTable {
    fn get(&self, key: &str, consistency: ReadConsistency) -> Result<Option<Item>> {
        validate_key(key)?;
        self.reads
            .lock()
            .unwrap()
            .push((key.to_string(), consistency));
        Ok(self.records.lock().unwrap().get(key).cloned())
    }

    fn put(&self, key: &str, item: Item, condition: WriteCondition) -> Result<WriteOutcome> {
        validate_key(key)?;
        self.puts.fetch_add(1, Ordering::SeqCst);

        let hook = self.before_next_put.lock().unwrap().take();
        let mut records = self.records.lock().unwrap();
        if let Some(hook) = hook {
            hook(&mut records);
        }

        if !condition.holds(records.get(key)) {
            return Ok(WriteOutcome::ConditionFailed);
        }
        records.insert(key.to_string(), item);
        Ok(WriteOutcome::Committed)
    }

    fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.deletes.fetch_add(1, Ordering::SeqCst);

        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(EvictError::StoreError(format!(
                "simulated delete failure for '{}'",
                key
            )));
        }
        self.records.lock().unwrap().remove(key);
        Ok(())
    }
}
