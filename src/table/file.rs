//! File-backed record table.
//!
//! Each record lives in `{dir}/{key}.json`. Reads are plain file reads and
//! always see a whole record because writes go through [`atomic_write`].
//!
//! Conditional puts and deletes hold a per-key commit latch
//! (`{dir}/.{key}.latch`, created with `create_new`) only for the span of
//! "read current record, evaluate condition, rename new record into place".
//! That span contains no caller code, so the latch is held for milliseconds.
//! A latch last modified more than [`LATCH_WAIT`] ago belongs to a writer that
//! died mid-commit and is broken. A latch that cannot be taken within
//! [`LATCH_WAIT`] is reported as a store failure rather than waited on forever.

use super::{validate_key, Item, ReadConsistency, RecordStore, WriteCondition, WriteOutcome};
use crate::error::{EvictError, Result};
use crate::fs::atomic_write;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// How long a writer waits for another writer's commit latch.
const LATCH_WAIT: Duration = Duration::from_secs(5);

/// Pause between latch attempts.
const LATCH_POLL: Duration = Duration::from_millis(2);

/// Record table stored as one JSON file per key.
#[derive(Debug, Clone)]
pub struct FileTable {
    dir: PathBuf,
}

impl FileTable {
    /// Open a table rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn latch_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{}.latch", key))
    }

    fn read_record(&self, key: &str) -> Result<Option<Item>> {
        let path = self.record_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(EvictError::StoreError(format!(
                    "failed to read record '{}': {}",
                    path.display(),
                    e
                )));
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(item)) => Ok(Some(item)),
            Ok(_) => Err(EvictError::StoreError(format!(
                "record '{}' is not a JSON object",
                path.display()
            ))),
            Err(e) => Err(EvictError::StoreError(format!(
                "failed to parse record '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    fn take_latch(&self, key: &str) -> Result<CommitLatch> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            EvictError::StoreError(format!(
                "failed to create table directory '{}': {}",
                self.dir.display(),
                e
            ))
        })?;

        let path = self.latch_path(key);
        let started = Instant::now();

        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(CommitLatch { path }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if latch_age(&path).is_some_and(|age| age > LATCH_WAIT) {
                        break_abandoned_latch(&path)?;
                        continue;
                    }
                    if started.elapsed() >= LATCH_WAIT {
                        return Err(EvictError::StoreError(format!(
                            "commit latch '{}' held for more than {}s; remove it if no writer is running",
                            path.display(),
                            LATCH_WAIT.as_secs()
                        )));
                    }
                    std::thread::sleep(LATCH_POLL);
                }
                Err(e) => {
                    return Err(EvictError::StoreError(format!(
                        "failed to create commit latch '{}': {}",
                        path.display(),
                        e
                    )));
                }
            }
        }
    }
}

impl RecordStore for FileTable {
    // Every committed file is complete, so both consistency levels read the same thing.
    fn get(&self, key: &str, _consistency: ReadConsistency) -> Result<Option<Item>> {
        validate_key(key)?;
        self.read_record(key)
    }

    fn put(&self, key: &str, item: Item, condition: WriteCondition) -> Result<WriteOutcome> {
        validate_key(key)?;
        let _latch = self.take_latch(key)?;

        let current = self.read_record(key)?;
        if !condition.holds(current.as_ref()) {
            return Ok(WriteOutcome::ConditionFailed);
        }

        let json = serde_json::to_string_pretty(&Value::Object(item)).map_err(|e| {
            EvictError::StoreError(format!("failed to serialize record '{}': {}", key, e))
        })?;
        atomic_write(self.record_path(key), json.as_bytes())?;

        Ok(WriteOutcome::Committed)
    }

    fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        let _latch = self.take_latch(key)?;

        let path = self.record_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EvictError::StoreError(format!(
                "failed to delete record '{}': {}",
                path.display(),
                e
            ))),
        }
    }
}

/// Time since the latch at `path` was created, if it still exists.
fn latch_age(path: &Path) -> Option<Duration> {
    fs::metadata(path).ok()?.modified().ok()?.elapsed().ok()
}

fn break_abandoned_latch(path: &Path) -> Result<()> {
    tracing::warn!(latch = %path.display(), "breaking abandoned commit latch");
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        // Another writer broke it first
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(EvictError::StoreError(format!(
            "failed to remove abandoned commit latch '{}': {}",
            path.display(),
            e
        ))),
    }
}

/// Exclusive right to commit one key; removed on drop.
struct CommitLatch {
    path: PathBuf,
}

impl Drop for CommitLatch {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(latch = %self.path.display(), error = %e, "failed to remove commit latch");
        }
    }
}
