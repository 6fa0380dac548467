//! Command implementations for evict.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Every command except `init` runs against an initialized
//! home through [`Services`].

mod exclusion;
mod handle;
pub(crate) mod init;
mod lock;
mod policy;
mod services;
mod sync;

pub(crate) use services::Services;

use crate::cli::{Command, HandleAction, LockAction, PolicyAction};
use crate::context::HomeContext;
use crate::error::{EvictError, Result};
use std::io::Read;
use std::path::Path;

/// Dispatch a command to its implementation.
///
/// This is the main entry point for command execution. The home is resolved
/// once here and opened for every command except `init`.
pub fn dispatch(home: Option<&Path>, command: Command) -> Result<()> {
    let ctx = HomeContext::resolve(home)?;
    let open = || Services::open(&ctx);

    match command {
        Command::Init(args) => init::cmd_init(&ctx, args.identity_store_id.as_deref()),
        Command::Exclude(args) => exclusion::cmd_exclude(&open()?, &args.principal),
        Command::Restore(args) => exclusion::cmd_restore(&open()?, &args.principal),
        Command::List(args) => exclusion::cmd_list(&open()?, args.json),
        Command::Sync(args) => sync::cmd_sync(&open()?, args.owner),
        Command::Handle(handle_cmd) => match handle_cmd.action {
            HandleAction::Lifecycle(args) => {
                handle::cmd_handle_lifecycle(&open()?, &read_event_input(&args.event)?)
            }
            HandleAction::Change(args) => handle::cmd_handle_change(
                &open()?,
                &read_event_input(&args.event)?,
                args.owner.owner,
            ),
        },
        Command::Lock(lock_cmd) => match lock_cmd.action {
            LockAction::Status => lock::cmd_lock_status(&open()?),
            LockAction::Clear(args) => lock::cmd_lock_clear(&open()?, args.force),
        },
        Command::Policy(policy_cmd) => match policy_cmd.action {
            PolicyAction::Show => policy::cmd_policy_show(&open()?),
        },
    }
}

/// Read an event payload from a file, or from stdin when `source` is `-`.
fn read_event_input(source: &str) -> Result<String> {
    if source == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| EvictError::UserError(format!("failed to read event from stdin: {}", e)))?;
        return Ok(content);
    }

    std::fs::read_to_string(source)
        .map_err(|e| EvictError::UserError(format!("failed to read event file '{}': {}", source, e)))
}
