//! Implementation of the `evict init` command.
//!
//! # What `evict init` does
//!
//! 1. Creates the home directory with `table/`, `policies/` and `events/`
//! 2. Creates `config.yaml` with defaults (if missing)
//! 3. Creates an empty `directory.yaml` export for the identity store (if missing)
//! 4. Appends an `init` audit event
//!
//! This command is **idempotent**: running it again never overwrites
//! existing configuration, records, or policies.

use crate::audit::{self, AuditAction, AuditEvent};
use crate::config::Config;
use crate::context::HomeContext;
use crate::error::{EvictError, Result};
use crate::fs::atomic_write_file;
use serde_json::json;
use std::fs;
use std::path::Path;

/// Execute the `evict init` command.
pub fn cmd_init(ctx: &HomeContext, identity_store_id: Option<&str>) -> Result<()> {
    let created = scaffold_home(ctx, identity_store_id)?;
    let config = Config::load(ctx.config_path())?;

    audit::record(
        ctx,
        AuditEvent::new(AuditAction::Init).with_details(json!({
            "home": ctx.home.display().to_string(),
            "identity_store_id": config.identity_store_id,
            "policy_id": config.policy_id,
            "created": created,
        })),
    );

    println!("Initialized evict home: {}", ctx.home.display());
    println!();
    println!("Identity store: {}", config.identity_store_id);
    println!("Policy id:      {}", config.policy_id);
    if !created.is_empty() {
        println!();
        println!("Created:");
        for path in &created {
            println!("  {}", path);
        }
    }
    println!();
    println!(
        "Add users to {} to resolve lifecycle events.",
        ctx.directory_path().display()
    );

    Ok(())
}

/// Create whatever part of the home layout is missing.
///
/// Returns the home-relative paths that were created.
pub(crate) fn scaffold_home(
    ctx: &HomeContext,
    identity_store_id: Option<&str>,
) -> Result<Vec<String>> {
    let mut created = Vec::new();

    for dir in [&ctx.home, &ctx.table_dir, &ctx.policies_dir, &ctx.events_dir] {
        if !dir.is_dir() {
            create_dir(dir)?;
            if dir != &ctx.home {
                created.push(format!("{}/", relative(ctx, dir)));
            }
        }
    }

    let config_path = ctx.config_path();
    let config = if config_path.exists() {
        let existing = Config::load(&config_path)?;
        if let Some(id) = identity_store_id
            && id != existing.identity_store_id
        {
            tracing::warn!(
                configured = %existing.identity_store_id,
                requested = id,
                "config.yaml already exists; leaving identity_store_id unchanged"
            );
        }
        existing
    } else {
        let mut config = Config::default();
        if let Some(id) = identity_store_id {
            config.identity_store_id = id.to_string();
        }
        atomic_write_file(&config_path, &config.to_yaml()?)?;
        created.push(relative(ctx, &config_path));
        config
    };

    let directory_path = ctx.directory_path();
    if !directory_path.exists() {
        let template = format!(
            "# Identity store export: user id -> username\nidentity_store_id: {}\nusers: {{}}\n",
            config.identity_store_id
        );
        atomic_write_file(&directory_path, &template)?;
        created.push(relative(ctx, &directory_path));
    }

    Ok(created)
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| {
        EvictError::UserError(format!(
            "failed to create directory '{}': {}",
            path.display(),
            e
        ))
    })
}

fn relative(ctx: &HomeContext, path: &Path) -> String {
    path.strip_prefix(&ctx.home)
        .unwrap_or(path)
        .display()
        .to_string()
}
