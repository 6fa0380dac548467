//! `evict sync`: publish the policy from the current list.

use super::Services;
use crate::audit::{self, AuditAction, AuditEvent};
use crate::error::Result;
use crate::handlers::{sync_policy, SyncReport};
use crate::locks::default_owner;
use serde_json::json;

/// Execute the `evict sync` command.
pub fn cmd_sync(services: &Services, owner: Option<String>) -> Result<()> {
    let owner = owner.unwrap_or_else(default_owner);
    let report = sync_policy(&owner, &services.store, &services.lock, &services.publisher())?;

    record_sync(services, &owner, "cli", &report);
    print_report(services, &report);
    Ok(())
}

pub(super) fn record_sync(services: &Services, owner: &str, source: &str, report: &SyncReport) {
    audit::record(
        &services.ctx,
        AuditEvent::new(AuditAction::PolicySync).with_details(json!({
            "source": source,
            "owner": owner,
            "policy_id": services.config.policy_id,
            "excluded_users": report.excluded_users,
        })),
    );
}

pub(super) fn print_report(services: &Services, report: &SyncReport) {
    println!(
        "Published policy '{}' excluding {} principal(s).",
        services.config.policy_id,
        report.excluded_users.len()
    );
    for user in &report.excluded_users {
        println!("  {}", user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::read_audit;
    use crate::error::EvictError;
    use crate::locks::{LockRecord, LOCK_KEY};
    use crate::policy::render_policy;
    use crate::test_support::{create_test_home, open_test_services};
    use chrono::Utc;

    #[test]
    fn test_sync_publishes_current_list() {
        let (_temp_dir, ctx) = create_test_home();
        let (_clock, services) = open_test_services(&ctx);
        services.store.exclude("zed@x.com").unwrap();
        services.store.exclude("ann@x.com").unwrap();

        cmd_sync(&services, Some("test-sync".to_string())).unwrap();

        let stored = services.publisher().load().unwrap().unwrap();
        let expected = render_policy(&["ann@x.com".to_string(), "zed@x.com".to_string()]).unwrap();
        assert_eq!(stored.content, expected);
        assert!(services.lock.state().unwrap().holder().is_none());

        let events = read_audit(&ctx).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, AuditAction::PolicySync);
        assert_eq!(events[0].details["owner"], "test-sync");
    }

    #[test]
    fn test_sync_of_empty_list_publishes_empty_conditions() {
        let (_temp_dir, ctx) = create_test_home();
        let (_clock, services) = open_test_services(&ctx);

        cmd_sync(&services, None).unwrap();

        let stored = services.publisher().load().unwrap().unwrap();
        assert_eq!(stored.content, render_policy(&[]).unwrap());
    }

    #[test]
    fn test_sync_times_out_behind_abandoned_lock() {
        let (_temp_dir, ctx) = create_test_home();
        let (clock, services) = open_test_services(&ctx);
        let abandoned = LockRecord::new("crashed-run", Utc::now());
        std::fs::write(
            ctx.table_dir.join(format!("{}.json", LOCK_KEY)),
            serde_json::to_string(&abandoned.to_item().unwrap()).unwrap(),
        )
        .unwrap();

        let err = cmd_sync(&services, None).unwrap_err();

        assert!(matches!(err, EvictError::LockTimeout { attempts: 10, .. }));
        assert_eq!(clock.sleeps().len(), 9);
        assert!(services.publisher().load().unwrap().is_none());
        assert!(read_audit(&ctx).unwrap().is_empty());
    }
}
