//! Config loading, validation, and conversion into runtime settings.

use super::model::Config;
use crate::error::{EvictError, Result};
use crate::locks::LockSettings;
use crate::retry::RetryPolicy;
use std::path::Path;
use std::time::Duration;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(EvictError::UserError)` - Read error, parse error, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            EvictError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty mapping
        if yaml.trim().is_empty() {
            return Ok(Config::default());
        }

        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| EvictError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            EvictError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `policy_id` must be non-empty and use only `[A-Za-z0-9_-]`
    /// - `lock_max_attempts`, `mutation_max_attempts` and `lock_stale_minutes` must be positive
    /// - `lock_backoff_min_ms` must be below `lock_backoff_max_ms`
    pub fn validate(&self) -> Result<()> {
        if self.policy_id.is_empty()
            || !self
                .policy_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(invalid(format!(
                "policy_id must be non-empty and use only letters, digits, '-' or '_' (found '{}')",
                self.policy_id
            )));
        }

        if self.lock_max_attempts == 0 {
            return Err(invalid("lock_max_attempts must be greater than 0"));
        }

        if self.lock_backoff_min_ms >= self.lock_backoff_max_ms {
            return Err(invalid(format!(
                "lock_backoff_min_ms ({}) must be less than lock_backoff_max_ms ({})",
                self.lock_backoff_min_ms, self.lock_backoff_max_ms
            )));
        }

        if self.lock_stale_minutes == 0 {
            return Err(invalid("lock_stale_minutes must be greater than 0"));
        }

        if self.mutation_max_attempts == 0 {
            return Err(invalid("mutation_max_attempts must be greater than 0"));
        }

        Ok(())
    }

    /// Polling bounds for the exclusion lock.
    pub fn lock_settings(&self) -> LockSettings {
        LockSettings {
            max_attempts: self.lock_max_attempts,
            backoff_min: Duration::from_millis(self.lock_backoff_min_ms),
            backoff_max: Duration::from_millis(self.lock_backoff_max_ms),
        }
    }

    /// Conflict retry bounds for list mutations.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.mutation_max_attempts,
            base_delay: Duration::from_millis(self.mutation_backoff_base_ms),
            max_delay: Duration::from_millis(self.mutation_backoff_max_ms),
        }
    }
}

fn invalid(message: impl std::fmt::Display) -> EvictError {
    EvictError::UserError(format!("config validation failed: {}", message))
}
