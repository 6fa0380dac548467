//! Identity lifecycle events.

use crate::clock::Clock;
use crate::directory::Directory;
use crate::error::{EvictError, Result};
use crate::exclusions::ExclusionStore;
use crate::retry::{retry_on_conflict, RetryPolicy};
use serde::Deserialize;

/// An identity-directory API call notification.
///
/// Only the fields the handlers read are modelled; everything else in the
/// envelope is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct LifecycleEvent {
    #[serde(default)]
    pub id: String,

    pub detail: LifecycleDetail,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleDetail {
    pub event_name: String,
    pub request_parameters: RequestParameters,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParameters {
    pub identity_store_id: String,
    pub user_id: String,
}

/// What a lifecycle event asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    /// `DisableUser`: exclude the principal.
    Disable,
    /// `DeleteUser`: exclude the principal.
    Delete,
    /// `EnableUser`: restore the principal.
    Enable,
}

impl LifecycleAction {
    /// Map a directory API event name to an action.
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "DisableUser" => Some(Self::Disable),
            "DeleteUser" => Some(Self::Delete),
            "EnableUser" => Some(Self::Enable),
            _ => None,
        }
    }
}

impl LifecycleEvent {
    /// Parse an event from its JSON envelope.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            EvictError::UserError(format!("failed to parse lifecycle event: {}", e))
        })
    }

    pub fn action(&self) -> Option<LifecycleAction> {
        LifecycleAction::from_event_name(&self.detail.event_name)
    }

    pub fn user_id(&self) -> &str {
        &self.detail.request_parameters.user_id
    }
}

/// Result of handling one lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// The principal is now on the exclusion list.
    Excluded { user_id: String, principal: String },
    /// The principal's exclusion was removed.
    Restored { user_id: String, principal: String },
    /// The principal was not excluded; nothing was written.
    NotExcluded { user_id: String, principal: String },
    /// The event is not one this system acts on.
    Skipped { event_name: String },
}

/// Resolve the event's user and apply the matching list mutation.
///
/// List conflicts are retried per `retry`; resolution failures are returned
/// unchanged as `UpstreamFailure`.
pub fn handle_lifecycle_event(
    event: &LifecycleEvent,
    directory: &dyn Directory,
    store: &ExclusionStore,
    retry: &RetryPolicy,
    clock: &dyn Clock,
) -> Result<LifecycleOutcome> {
    let Some(action) = event.action() else {
        tracing::info!(
            event_name = %event.detail.event_name,
            "not a user lifecycle event - skipping"
        );
        return Ok(LifecycleOutcome::Skipped {
            event_name: event.detail.event_name.clone(),
        });
    };

    let user_id = event.user_id().to_string();
    let principal = directory.username_for_id(&user_id)?;

    match action {
        LifecycleAction::Disable | LifecycleAction::Delete => {
            retry_on_conflict(retry, clock, || store.exclude(&principal))?;
            tracing::info!(%user_id, %principal, ?action, "excluded user");
            Ok(LifecycleOutcome::Excluded { user_id, principal })
        }
        LifecycleAction::Enable => {
            let removed =
                retry_on_conflict(retry, clock, || store.remove_user_exclusion(&principal))?;
            tracing::info!(%user_id, %principal, removed, "removed user exclusion");
            if removed {
                Ok(LifecycleOutcome::Restored { user_id, principal })
            } else {
                Ok(LifecycleOutcome::NotExcluded { user_id, principal })
            }
        }
    }
}
