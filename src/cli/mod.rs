//! CLI argument parsing for evict.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Evict: keep disabled and deleted users out of a shared deny policy.
///
/// State lives in a home directory:
/// - `table/` holds the exclusion list and the sync lock
/// - `policies/` holds the published deny policy
/// - `events/` holds the audit log
#[derive(Parser, Debug)]
#[command(name = "evict")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Home directory (overrides EVICT_HOME; default ./.evict).
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Log filter for diagnostics on stderr (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for evict.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize an evict home.
    ///
    /// Creates the table, policies, and events directories and a default
    /// configuration. Existing files are left untouched.
    Init(InitArgs),

    /// Exclude a principal from all access.
    ///
    /// Replaces any earlier exclusion of the same principal.
    Exclude(PrincipalArgs),

    /// Remove every exclusion of a principal.
    Restore(PrincipalArgs),

    /// List currently excluded principals.
    List(ListArgs),

    /// Publish the policy from the current exclusion list.
    ///
    /// Holds the sync lock while reading the list and publishing.
    Sync(OwnerArgs),

    /// Handle an upstream event delivered as JSON.
    Handle(HandleCommand),

    /// Lock management commands.
    Lock(LockCommand),

    /// Policy inspection commands.
    Policy(PolicyCommand),
}

/// Arguments for the `init` command.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Identity store whose lifecycle events are accepted.
    #[arg(long)]
    pub identity_store_id: Option<String>,
}

/// A principal argument.
#[derive(Parser, Debug)]
pub struct PrincipalArgs {
    /// Principal name (e.g., alice@example.com).
    pub principal: String,
}

/// Arguments for the `list` command.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Print the list as a JSON array.
    #[arg(long)]
    pub json: bool,
}

/// Lock holder override for commands that take the sync lock.
#[derive(Parser, Debug)]
pub struct OwnerArgs {
    /// Identity recorded as the lock holder (default: user@HOST:pid).
    #[arg(long)]
    pub owner: Option<String>,
}

/// Event handling subcommands.
#[derive(Parser, Debug)]
pub struct HandleCommand {
    #[command(subcommand)]
    pub action: HandleAction,
}

/// Available event kinds.
#[derive(Subcommand, Debug)]
pub enum HandleAction {
    /// A user lifecycle event (DisableUser, DeleteUser, EnableUser).
    Lifecycle(LifecycleArgs),

    /// A batch of table change notifications.
    ///
    /// Publishes the policy once if the batch touched the exclusion list.
    Change(ChangeArgs),
}

/// Arguments for `handle lifecycle`.
#[derive(Parser, Debug)]
pub struct LifecycleArgs {
    /// Event file, or `-` for stdin.
    #[arg(long)]
    pub event: String,
}

/// Arguments for `handle change`.
#[derive(Parser, Debug)]
pub struct ChangeArgs {
    /// Event file, or `-` for stdin.
    #[arg(long)]
    pub event: String,

    #[command(flatten)]
    pub owner: OwnerArgs,
}

/// Lock subcommands.
#[derive(Parser, Debug)]
pub struct LockCommand {
    #[command(subcommand)]
    pub action: LockAction,
}

/// Available lock actions.
#[derive(Subcommand, Debug)]
pub enum LockAction {
    /// Show the sync lock holder and its age.
    Status,

    /// Remove a sync lock whose holder never released it.
    ///
    /// Requires --force flag to prevent accidental clearing.
    Clear(LockClearArgs),
}

/// Arguments for the `lock clear` command.
#[derive(Parser, Debug)]
pub struct LockClearArgs {
    /// Force clearing the lock (required for safety).
    #[arg(long)]
    pub force: bool,
}

/// Policy subcommands.
#[derive(Parser, Debug)]
pub struct PolicyCommand {
    #[command(subcommand)]
    pub action: PolicyAction,
}

#[derive(Subcommand, Debug)]
pub enum PolicyAction {
    /// Print the stored policy document.
    Show,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
