//! `evict exclude`, `evict restore` and `evict list`.

use super::Services;
use crate::audit::{self, AuditAction, AuditEvent};
use crate::error::{EvictError, Result};
use crate::retry::retry_on_conflict;
use serde_json::json;

/// Add (or refresh) the exclusion of `principal`.
pub fn cmd_exclude(services: &Services, principal: &str) -> Result<()> {
    retry_on_conflict(
        &services.config.retry_policy(),
        services.clock.as_ref(),
        || services.store.exclude(principal),
    )?;

    audit::record(
        &services.ctx,
        AuditEvent::new(AuditAction::Exclude)
            .with_principal(principal)
            .with_details(json!({"source": "cli"})),
    );

    println!("Excluded {}.", principal);
    println!("Run `evict sync` to publish the updated policy.");
    Ok(())
}

/// Remove every exclusion of `principal`.
pub fn cmd_restore(services: &Services, principal: &str) -> Result<()> {
    let removed = retry_on_conflict(
        &services.config.retry_policy(),
        services.clock.as_ref(),
        || services.store.remove_user_exclusion(principal),
    )?;

    if !removed {
        println!("{} is not excluded; nothing to do.", principal);
        return Ok(());
    }

    audit::record(
        &services.ctx,
        AuditEvent::new(AuditAction::RemoveExclusion)
            .with_principal(principal)
            .with_details(json!({"source": "cli"})),
    );

    println!("Restored {}.", principal);
    println!("Run `evict sync` to publish the updated policy.");
    Ok(())
}

/// Print the active exclusions.
pub fn cmd_list(services: &Services, as_json: bool) -> Result<()> {
    println!("{}", render_list(services, as_json)?);
    Ok(())
}

/// Render the active exclusions as a JSON array or a table.
fn render_list(services: &Services, as_json: bool) -> Result<String> {
    if as_json {
        let users = services.store.get_excluded_users()?;
        return serde_json::to_string_pretty(&users).map_err(|e| {
            EvictError::UserError(format!("failed to render exclusion list: {}", e))
        });
    }

    let mut entries = services.store.active_entries()?;
    if entries.is_empty() {
        return Ok("No excluded principals.".to_string());
    }

    entries.sort_by(|a, b| a.username.cmp(&b.username));
    let mut out = format!("Excluded principals ({}):\n", entries.len());
    for entry in &entries {
        out.push_str(&format!(
            "\n  {:<40} expires {}",
            entry.username,
            entry.expires_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }

    Ok(out)
}
