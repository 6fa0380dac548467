//! Config struct definition and default implementation.

use serde::{Deserialize, Serialize};

/// Configuration for an evict home.
///
/// This struct represents the contents of `<home>/config.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Upstream settings
    // =========================================================================
    /// Identity store whose lifecycle events are accepted.
    #[serde(default = "default_identity_store_id")]
    pub identity_store_id: String,

    /// Id of the published policy; also its file name under `policies/`.
    #[serde(default = "default_policy_id")]
    pub policy_id: String,

    /// Display name stored alongside the policy.
    #[serde(default = "default_policy_name")]
    pub policy_name: String,

    #[serde(default = "default_policy_description")]
    pub policy_description: String,

    // =========================================================================
    // Lock settings
    // =========================================================================
    /// Reads of a held lock before giving up.
    #[serde(default = "default_lock_max_attempts")]
    pub lock_max_attempts: u32,

    /// Lower bound (inclusive) of the wait between lock polls.
    #[serde(default = "default_lock_backoff_min_ms")]
    pub lock_backoff_min_ms: u64,

    /// Upper bound (exclusive) of the wait between lock polls.
    #[serde(default = "default_lock_backoff_max_ms")]
    pub lock_backoff_max_ms: u64,

    /// Minutes after which `lock status` reports a lock as possibly abandoned.
    /// Informational only: a stale lock is never evicted automatically.
    #[serde(default = "default_lock_stale_minutes")]
    pub lock_stale_minutes: u32,

    // =========================================================================
    // Mutation retry settings
    // =========================================================================
    /// Attempts for a list mutation that keeps losing races, including the first.
    #[serde(default = "default_mutation_max_attempts")]
    pub mutation_max_attempts: u32,

    #[serde(default = "default_mutation_backoff_base_ms")]
    pub mutation_backoff_base_ms: u64,

    #[serde(default = "default_mutation_backoff_max_ms")]
    pub mutation_backoff_max_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            identity_store_id: default_identity_store_id(),
            policy_id: default_policy_id(),
            policy_name: default_policy_name(),
            policy_description: default_policy_description(),
            lock_max_attempts: default_lock_max_attempts(),
            lock_backoff_min_ms: default_lock_backoff_min_ms(),
            lock_backoff_max_ms: default_lock_backoff_max_ms(),
            lock_stale_minutes: default_lock_stale_minutes(),
            mutation_max_attempts: default_mutation_max_attempts(),
            mutation_backoff_base_ms: default_mutation_backoff_base_ms(),
            mutation_backoff_max_ms: default_mutation_backoff_max_ms(),
        }
    }
}

fn default_identity_store_id() -> String {
    "d-0000000000".to_string()
}

fn default_policy_id() -> String {
    "deny-excluded-users".to_string()
}

fn default_policy_name() -> String {
    "DenyExcludedUsers".to_string()
}

fn default_policy_description() -> String {
    "Denies all actions to disabled or deleted users".to_string()
}

fn default_lock_max_attempts() -> u32 {
    10
}

fn default_lock_backoff_min_ms() -> u64 {
    500
}

fn default_lock_backoff_max_ms() -> u64 {
    1500
}

fn default_lock_stale_minutes() -> u32 {
    15
}

fn default_mutation_max_attempts() -> u32 {
    5
}

fn default_mutation_backoff_base_ms() -> u64 {
    100
}

fn default_mutation_backoff_max_ms() -> u64 {
    2000
}
