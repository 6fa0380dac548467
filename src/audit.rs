//! Audit log for evict.
//!
//! Commands that change state append one record per change to
//! `<home>/events/events.ndjson` (one JSON object per line).
//!
//! # Event Format
//!
//! - `ts`: RFC3339 timestamp
//! - `action`: `init`, `exclude`, `remove_exclusion`, `policy_sync`, `lock_clear`
//! - `actor`: who ran the command (`user@HOST`)
//! - `principal`: the affected principal, when there is one
//! - `details`: freeform object with action-specific details
//!
//! The audit log is not the source of truth; [`record`] only warns when an
//! append fails.

use crate::context::HomeContext;
use crate::error::{EvictError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;

/// Actions that can be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Home initialization
    Init,
    /// Principal added to the exclusion list
    Exclude,
    /// Principal removed from the exclusion list
    RemoveExclusion,
    /// Policy re-published from the list
    PolicySync,
    /// Lock cleared manually
    LockClear,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditAction::Init => write!(f, "init"),
            AuditAction::Exclude => write!(f, "exclude"),
            AuditAction::RemoveExclusion => write!(f, "remove_exclusion"),
            AuditAction::PolicySync => write!(f, "policy_sync"),
            AuditAction::LockClear => write!(f, "lock_clear"),
        }
    }
}

/// One line of the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub ts: DateTime<Utc>,

    pub action: AuditAction,

    /// Who performed the action (e.g., `user@HOST`).
    pub actor: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<String>,

    pub details: Value,
}

impl AuditEvent {
    /// Create an event stamped now, attributed to the local user.
    pub fn new(action: AuditAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: actor_string(),
            principal: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = Some(principal.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            EvictError::UserError(format!("failed to serialize audit event to JSON: {}", e))
        })
    }
}

/// `user@HOST` for the local process.
pub fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append an event to the audit log, creating the file and directory if needed.
pub fn append_audit(ctx: &HomeContext, event: &AuditEvent) -> Result<()> {
    let events_file = ctx.events_file();
    let json_line = event.to_ndjson_line()?;

    fs::create_dir_all(&ctx.events_dir).map_err(|e| {
        EvictError::UserError(format!(
            "failed to create events directory '{}': {}",
            ctx.events_dir.display(),
            e
        ))
    })?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&events_file)
        .map_err(|e| {
            EvictError::UserError(format!(
                "failed to open events file '{}': {}",
                events_file.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        EvictError::UserError(format!(
            "failed to write event to '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    file.sync_all().map_err(|e| {
        EvictError::UserError(format!(
            "failed to sync events file '{}': {}",
            events_file.display(),
            e
        ))
    })
}

/// Append an event, downgrading any failure to a warning.
pub fn record(ctx: &HomeContext, event: AuditEvent) {
    if let Err(e) = append_audit(ctx, &event) {
        tracing::warn!(action = %event.action, error = %e, "failed to append audit event");
    }
}

/// Read every event in the audit log, oldest first.
pub fn read_audit(ctx: &HomeContext) -> Result<Vec<AuditEvent>> {
    let events_file = ctx.events_file();
    if !events_file.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&events_file).map_err(|e| {
        EvictError::UserError(format!(
            "failed to read events file '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str(line).map_err(|e| {
                EvictError::UserError(format!("malformed audit line '{}': {}", line, e))
            })
        })
        .collect()
}
