//! Error types for the evict CLI.
//!
//! Uses thiserror for derive macros. Conflict-style failures are distinct
//! variants so callers can decide which ones are worth retrying.

use crate::exit_codes;
use crate::locks::LockRecord;
use thiserror::Error;

/// Main error type for evict operations.
#[derive(Error, Debug)]
pub enum EvictError {
    /// User provided invalid arguments or the home directory is in an invalid state.
    #[error("{0}")]
    UserError(String),

    /// The record backend failed to read, write, or decode a record.
    #[error("Store operation failed: {0}")]
    StoreError(String),

    /// A version-conditioned write found the record changed since it was read.
    #[error("concurrent modification of '{key}': record changed since it was read")]
    ConcurrentModification { key: String },

    /// Another holder created the lock between our read and our create.
    #[error("Lock acquisition failed: lock was created by another holder before '{owner}' could take it")]
    LockConflict { owner: String },

    /// The lock stayed held for every polling attempt.
    #[error(
        "Lock acquisition failed: still held after {attempts} attempt(s); last holder: {}",
        describe_holder(.last_holder)
    )]
    LockTimeout {
        attempts: u32,
        last_holder: Option<LockRecord>,
    },

    /// Principal resolution or policy distribution failed.
    #[error("Upstream call failed: {0}")]
    UpstreamFailure(String),

    /// The protected block failed and releasing the lock failed as well.
    #[error("{error} (lock release also failed: {suppressed})")]
    WithSuppressed {
        #[source]
        error: Box<EvictError>,
        suppressed: Box<EvictError>,
    },
}

fn describe_holder(holder: &Option<LockRecord>) -> String {
    match holder {
        Some(record) => record.to_string(),
        None => "none observed".to_string(),
    }
}

impl EvictError {
    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            EvictError::UserError(_) => exit_codes::USER_ERROR,
            EvictError::StoreError(_) => exit_codes::STORE_FAILURE,
            EvictError::ConcurrentModification { .. } => exit_codes::CONFLICT,
            EvictError::LockConflict { .. } | EvictError::LockTimeout { .. } => {
                exit_codes::LOCK_FAILURE
            }
            EvictError::UpstreamFailure(_) => exit_codes::UPSTREAM_FAILURE,
            EvictError::WithSuppressed { error, .. } => error.exit_code(),
        }
    }

    /// Whether this is a lost optimistic-concurrency race on the list record.
    pub fn is_concurrent_modification(&self) -> bool {
        matches!(self, EvictError::ConcurrentModification { .. })
    }

    /// Attach a release failure to the error that caused the protected block to fail.
    pub fn with_suppressed(self, suppressed: EvictError) -> Self {
        EvictError::WithSuppressed {
            error: Box::new(self),
            suppressed: Box::new(suppressed),
        }
    }
}

/// Result type alias for evict operations.
pub type Result<T> = std::result::Result<T, EvictError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn user_error_has_correct_exit_code() {
        let err = EvictError::UserError("bad argument".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn conflict_has_correct_exit_code() {
        let err = EvictError::ConcurrentModification {
            key: "EXCLUDED_USERS".to_string(),
        };
        assert_eq!(err.exit_code(), exit_codes::CONFLICT);
        assert!(err.is_concurrent_modification());
    }

    #[test]
    fn lock_errors_have_correct_exit_code() {
        let conflict = EvictError::LockConflict {
            owner: "me".to_string(),
        };
        let timeout = EvictError::LockTimeout {
            attempts: 10,
            last_holder: None,
        };
        assert_eq!(conflict.exit_code(), exit_codes::LOCK_FAILURE);
        assert_eq!(timeout.exit_code(), exit_codes::LOCK_FAILURE);
        assert!(!conflict.is_concurrent_modification());
    }

    #[test]
    fn lock_timeout_message_names_last_holder() {
        let err = EvictError::LockTimeout {
            attempts: 10,
            last_holder: Some(LockRecord::new("req-42", Utc::now())),
        };
        let message = err.to_string();
        assert!(message.contains("10 attempt(s)"));
        assert!(message.contains("req-42"));
    }

    #[test]
    fn suppressed_error_keeps_original_exit_code() {
        let err = EvictError::UpstreamFailure("policy rejected".to_string())
            .with_suppressed(EvictError::StoreError("disk full".to_string()));

        assert_eq!(err.exit_code(), exit_codes::UPSTREAM_FAILURE);
        let message = err.to_string();
        assert!(message.contains("policy rejected"));
        assert!(message.contains("disk full"));
    }
}
