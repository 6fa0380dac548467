//! Publishing the compiled policy to the policy store.

use super::document::render_policy;
use crate::error::{EvictError, Result};
use crate::fs::atomic_write_file;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Destination for the compiled exclusion policy.
pub trait PolicyPublisher: Send + Sync {
    /// Replace the policy with one denying `excluded_users`.
    ///
    /// Returns the document content as stored by the policy store.
    fn update_policy(&self, excluded_users: &[String]) -> Result<String>;
}

/// A policy as kept in the policy directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPolicy {
    pub id: String,
    pub name: String,
    pub description: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

/// Policy store kept as `{dir}/{id}.json`.
#[derive(Debug, Clone)]
pub struct FilePolicyPublisher {
    dir: PathBuf,
    id: String,
    name: String,
    description: String,
}

impl FilePolicyPublisher {
    pub fn new(
        dir: impl Into<PathBuf>,
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }

    /// Path of the stored policy file.
    pub fn policy_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.id))
    }

    /// Read the currently stored policy, if one was ever published.
    pub fn load(&self) -> Result<Option<StoredPolicy>> {
        load_policy(&self.policy_path())
    }

    fn store(&self, content: String) -> Result<String> {
        let stored = StoredPolicy {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            content,
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string_pretty(&stored).map_err(|e| {
            EvictError::UpstreamFailure(format!("failed to serialize policy '{}': {}", self.id, e))
        })?;
        atomic_write_file(self.policy_path(), &json)
            .map_err(|e| EvictError::UpstreamFailure(e.to_string()))?;

        // Return what the store now holds
        self.load()?.map(|p| p.content).ok_or_else(|| {
            EvictError::UpstreamFailure(format!("policy '{}' missing after update", self.id))
        })
    }
}

impl PolicyPublisher for FilePolicyPublisher {
    fn update_policy(&self, excluded_users: &[String]) -> Result<String> {
        let contents = render_policy(excluded_users)?;

        self.store(contents.clone()).inspect_err(|e| {
            tracing::error!(
                policy_id = %self.id,
                error = %e,
                policy_contents = %contents,
                "failed to update policy"
            );
        })
    }
}

fn load_policy(path: &Path) -> Result<Option<StoredPolicy>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(EvictError::UpstreamFailure(format!(
                "failed to read policy '{}': {}",
                path.display(),
                e
            )));
        }
    };

    serde_json::from_str(&content).map(Some).map_err(|e| {
        EvictError::UpstreamFailure(format!(
            "failed to parse policy '{}': {}",
            path.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn publisher(dir: &Path) -> FilePolicyPublisher {
        FilePolicyPublisher::new(
            dir.join("policies"),
            "p-exclusions",
            "excluded-users",
            "Denies all actions to excluded principals",
        )
    }

    #[test]
    fn update_stores_and_returns_content() {
        let temp_dir = TempDir::new().unwrap();
        let publisher = publisher(temp_dir.path());
        let users = vec!["a@x.com".to_string()];

        let content = publisher.update_policy(&users).unwrap();

        assert_eq!(content, render_policy(&users).unwrap());
        let stored = publisher.load().unwrap().unwrap();
        assert_eq!(stored.id, "p-exclusions");
        assert_eq!(stored.name, "excluded-users");
        assert_eq!(stored.content, content);
    }

    #[test]
    fn update_replaces_previous_policy() {
        let temp_dir = TempDir::new().unwrap();
        let publisher = publisher(temp_dir.path());

        publisher.update_policy(&["a".to_string()]).unwrap();
        let content = publisher.update_policy(&[]).unwrap();

        assert!(!content.contains("*:a"));
        assert_eq!(publisher.load().unwrap().unwrap().content, content);
    }

    #[test]
    fn load_before_first_publish_is_none() {
        let temp_dir = TempDir::new().unwrap();
        assert!(publisher(temp_dir.path()).load().unwrap().is_none());
    }

    #[test]
    fn unwritable_store_is_upstream_failure() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the policy directory should be
        let blocker = temp_dir.path().join("policies");
        std::fs::write(&blocker, "").unwrap();

        let err = publisher(temp_dir.path())
            .update_policy(&["a".to_string()])
            .unwrap_err();
        assert!(matches!(err, EvictError::UpstreamFailure(_)));
    }
}
