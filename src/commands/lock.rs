//! `evict lock status` and `evict lock clear`.

use super::Services;
use crate::audit::{self, AuditAction, AuditEvent};
use crate::error::{EvictError, Result};
use crate::locks::LockState;
use serde_json::json;

/// Show the sync lock holder and how long it has been held.
///
/// A lock older than `lock_stale_minutes` is flagged but never evicted.
pub fn cmd_lock_status(services: &Services) -> Result<()> {
    let LockState::Held(record) = services.lock.state()? else {
        println!("Lock is free.");
        return Ok(());
    };

    let now = services.clock.now();
    let stale_minutes = services.config.lock_stale_minutes;

    println!("Lock is held:");
    println!("  Owner:      {}", record.taken_by);
    println!("  Taken:      {}", record.taken_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Age:        {}", record.age_string(now));
    if record.is_stale(now, stale_minutes) {
        println!("  Status:     STALE (exceeds {} min threshold)", stale_minutes);
        println!();
        println!(
            "If the holder has crashed, run `evict lock clear --force` to remove the lock."
        );
    }

    Ok(())
}

/// Delete a lock left behind by a holder that never released it.
pub fn cmd_lock_clear(services: &Services, force: bool) -> Result<()> {
    // Require --force flag
    if !force {
        return Err(EvictError::UserError(
            "refusing to clear the lock without --force flag.\n\n\
             Clearing the lock while its holder is still running lets two policy syncs overlap.\n\
             Only clear it if you are certain the holder has crashed.\n\n\
             To clear the lock, run:\n  evict lock clear --force"
                .to_string(),
        ));
    }

    let cleared = services.lock.clear()?;
    let now = services.clock.now();
    let was_stale = cleared.is_stale(now, services.config.lock_stale_minutes);

    audit::record(
        &services.ctx,
        AuditEvent::new(AuditAction::LockClear).with_details(json!({
            "owner": cleared.taken_by,
            "taken_at": cleared.taken_at.to_rfc3339(),
            "age_minutes": cleared.age(now).num_minutes(),
            "was_stale": was_stale,
            "force": force,
        })),
    );

    println!("Cleared lock.");
    println!();
    println!("Lock details:");
    println!("  Owner:      {}", cleared.taken_by);
    println!("  Taken:      {}", cleared.taken_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Age:        {}", cleared.age_string(now));
    if was_stale {
        println!("  Status:     was STALE");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::read_audit;
    use crate::exit_codes;
    use crate::test_support::{create_test_home, open_test_services};
    use chrono::TimeDelta;

    #[test]
    fn test_status_of_free_and_held_lock() {
        let (_temp_dir, ctx) = create_test_home();
        let (clock, services) = open_test_services(&ctx);

        cmd_lock_status(&services).unwrap();

        services.lock.take_lock("someone").unwrap();
        clock.advance(TimeDelta::minutes(30));
        cmd_lock_status(&services).unwrap();

        // Status never evicts
        assert!(services.lock.state().unwrap().is_held());
    }

    #[test]
    fn test_clear_refuses_without_force() {
        let (_temp_dir, ctx) = create_test_home();
        let (_clock, services) = open_test_services(&ctx);
        services.lock.take_lock("someone").unwrap();

        let err = cmd_lock_clear(&services, false).unwrap_err();

        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
        assert!(err.to_string().contains("--force"));
        assert!(services.lock.state().unwrap().is_held());
    }

    #[test]
    fn test_clear_with_force_removes_and_audits() {
        let (_temp_dir, ctx) = create_test_home();
        let (clock, services) = open_test_services(&ctx);
        services.lock.take_lock("crashed-run").unwrap();
        clock.advance(TimeDelta::minutes(20));

        cmd_lock_clear(&services, true).unwrap();

        assert!(!services.lock.state().unwrap().is_held());
        let events = read_audit(&ctx).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, AuditAction::LockClear);
        assert_eq!(events[0].details["owner"], "crashed-run");
        assert_eq!(events[0].details["was_stale"], true);
    }

    #[test]
    fn test_clear_of_free_lock_is_user_error() {
        let (_temp_dir, ctx) = create_test_home();
        let (_clock, services) = open_test_services(&ctx);

        let err = cmd_lock_clear(&services, true).unwrap_err();
        assert!(err.to_string().contains("no lock"));
    }
}
