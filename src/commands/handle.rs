//! `evict handle`: run an upstream event through its handler.

use super::sync::{print_report, record_sync};
use super::Services;
use crate::audit::{self, AuditAction, AuditEvent};
use crate::error::{EvictError, Result};
use crate::handlers::{
    handle_change_event, handle_lifecycle_event, ChangeEvent, ChangeOutcome, LifecycleEvent,
    LifecycleOutcome,
};
use crate::locks::default_owner;
use serde_json::json;

/// Execute `evict handle lifecycle`.
///
/// Only events from the configured identity store are applied; the principal
/// is resolved in that store.
pub fn cmd_handle_lifecycle(services: &Services, payload: &str) -> Result<()> {
    let event = LifecycleEvent::from_json(payload)?;
    let event_store_id = &event.detail.request_parameters.identity_store_id;
    if event.action().is_some() && *event_store_id != services.config.identity_store_id {
        return Err(EvictError::UpstreamFailure(format!(
            "event '{}' is for identity store '{}', expected '{}'",
            event.id, event_store_id, services.config.identity_store_id
        )));
    }
    let directory = services.directory();

    let outcome = handle_lifecycle_event(
        &event,
        &directory,
        &services.store,
        &services.config.retry_policy(),
        services.clock.as_ref(),
    )?;

    match &outcome {
        LifecycleOutcome::Excluded { user_id, principal } => {
            record_lifecycle(services, AuditAction::Exclude, &event, user_id, principal);
            println!("Excluded {} (user {}).", principal, user_id);
        }
        LifecycleOutcome::Restored { user_id, principal } => {
            record_lifecycle(
                services,
                AuditAction::RemoveExclusion,
                &event,
                user_id,
                principal,
            );
            println!("Restored {} (user {}).", principal, user_id);
        }
        LifecycleOutcome::NotExcluded { user_id, principal } => {
            println!("{} (user {}) was not excluded; nothing to do.", principal, user_id);
        }
        LifecycleOutcome::Skipped { event_name } => {
            println!("Ignored event '{}'.", event_name);
        }
    }

    Ok(())
}

fn record_lifecycle(
    services: &Services,
    action: AuditAction,
    event: &LifecycleEvent,
    user_id: &str,
    principal: &str,
) {
    audit::record(
        &services.ctx,
        AuditEvent::new(action)
            .with_principal(principal)
            .with_details(json!({
                "source": "lifecycle",
                "event_id": event.id,
                "event_name": event.detail.event_name,
                "user_id": user_id,
            })),
    );
}

/// Execute `evict handle change`.
pub fn cmd_handle_change(services: &Services, payload: &str, owner: Option<String>) -> Result<()> {
    let event = ChangeEvent::from_json(payload)?;
    let owner = owner.unwrap_or_else(default_owner);

    match handle_change_event(
        &event,
        &owner,
        &services.store,
        &services.lock,
        &services.publisher(),
    )? {
        ChangeOutcome::Synced(report) => {
            record_sync(services, &owner, "change", &report);
            print_report(services, &report);
        }
        ChangeOutcome::Skipped => {
            println!("Batch did not touch the exclusion list; nothing to sync.");
        }
    }

    Ok(())
}
