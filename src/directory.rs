//! Principal resolution.
//!
//! Lifecycle events carry an opaque identity-store user id; the exclusion
//! list stores human-readable usernames. A [`Directory`] maps one to the
//! other.
//!
//! `FileDirectory` reads an exported identity store from `directory.yaml`:
//!
//! ```yaml
//! identity_store_id: d-1234567890
//! users:
//!   9a6b-0001: alice@example.com
//!   9a6b-0002: bob@example.com
//! ```

use crate::error::{EvictError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Resolves identity-store user ids to principal names.
pub trait Directory: Send + Sync {
    /// The username for `user_id`, or `UpstreamFailure` if it cannot be resolved.
    fn username_for_id(&self, user_id: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct DirectoryExport {
    identity_store_id: String,
    #[serde(default)]
    users: BTreeMap<String, String>,
}

/// Directory backed by an exported identity store file.
///
/// The file is re-read on every lookup so edits apply without a restart.
#[derive(Debug, Clone)]
pub struct FileDirectory {
    path: PathBuf,
    identity_store_id: String,
}

impl FileDirectory {
    pub fn new(path: impl Into<PathBuf>, identity_store_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            identity_store_id: identity_store_id.into(),
        }
    }

    fn load(&self) -> Result<DirectoryExport> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            EvictError::UpstreamFailure(format!(
                "failed to read directory '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        serde_yaml::from_str(&content).map_err(|e| {
            EvictError::UpstreamFailure(format!(
                "failed to parse directory '{}': {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl Directory for FileDirectory {
    fn username_for_id(&self, user_id: &str) -> Result<String> {
        let export = self.load()?;

        if export.identity_store_id != self.identity_store_id {
            return Err(EvictError::UpstreamFailure(format!(
                "directory '{}' exports identity store '{}', expected '{}'",
                self.path.display(),
                export.identity_store_id,
                self.identity_store_id
            )));
        }

        export.users.get(user_id).cloned().ok_or_else(|| {
            EvictError::UpstreamFailure(format!(
                "user '{}' not found in identity store '{}'",
                user_id, self.identity_store_id
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_directory(temp_dir: &TempDir, yaml: &str) -> PathBuf {
        let path = temp_dir.path().join("directory.yaml");
        std::fs::write(&path, yaml).unwrap();
        path
    }

    #[test]
    fn resolves_known_user() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_directory(
            &temp_dir,
            "identity_store_id: d-123\nusers:\n  test-id-123: some-email@example.com\n",
        );

        let directory = FileDirectory::new(path, "d-123");
        assert_eq!(
            directory.username_for_id("test-id-123").unwrap(),
            "some-email@example.com"
        );
    }

    #[test]
    fn unknown_user_is_upstream_failure() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_directory(&temp_dir, "identity_store_id: d-123\nusers: {}\n");

        let err = FileDirectory::new(path, "d-123")
            .username_for_id("missing")
            .unwrap_err();
        assert!(matches!(err, EvictError::UpstreamFailure(_)));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn wrong_identity_store_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_directory(
            &temp_dir,
            "identity_store_id: d-other\nusers:\n  u1: a@x.com\n",
        );

        let err = FileDirectory::new(path, "d-123")
            .username_for_id("u1")
            .unwrap_err();
        assert!(err.to_string().contains("d-other"));
    }

    #[test]
    fn missing_file_is_upstream_failure() {
        let temp_dir = TempDir::new().unwrap();
        let directory = FileDirectory::new(temp_dir.path().join("nope.yaml"), "d-123");

        assert!(matches!(
            directory.username_for_id("u1"),
            Err(EvictError::UpstreamFailure(_))
        ));
    }
}
