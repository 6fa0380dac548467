//! Home directory resolution for evict.
//!
//! Every command operates on one home directory holding the configuration,
//! the exported identity directory, the record table, the published policies,
//! and the audit log:
//!
//! ```text
//! <home>/
//!   config.yaml
//!   directory.yaml
//!   table/
//!   policies/
//!   events/events.ndjson
//! ```
//!
//! The home is taken from `--home`, then `EVICT_HOME`, then `./.evict`.

use crate::error::{EvictError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming the home directory.
pub const HOME_ENV_VAR: &str = "EVICT_HOME";

/// Home directory name used when neither `--home` nor `EVICT_HOME` is set.
pub const DEFAULT_HOME_DIR: &str = ".evict";

/// Resolved paths for an evict home. All paths are absolute.
#[derive(Debug, Clone)]
pub struct HomeContext {
    pub home: PathBuf,

    /// One JSON file per record key.
    pub table_dir: PathBuf,

    /// Stored policy documents.
    pub policies_dir: PathBuf,

    /// Audit log directory.
    pub events_dir: PathBuf,
}

impl HomeContext {
    /// Resolve the home from an explicit path, the environment, or the working directory.
    ///
    /// # Returns
    ///
    /// * `Ok(HomeContext)` - Successfully resolved context
    /// * `Err(EvictError::UserError)` - If the working directory cannot be determined
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(home) = explicit {
            return Self::resolve_from(home);
        }

        if let Some(home) = env::var_os(HOME_ENV_VAR).filter(|v| !v.is_empty()) {
            return Self::resolve_from(PathBuf::from(home));
        }

        let cwd = env::current_dir().map_err(|e| {
            EvictError::UserError(format!("failed to get current working directory: {}", e))
        })?;
        Self::resolve_from(cwd.join(DEFAULT_HOME_DIR))
    }

    /// Build the context for a specific home directory.
    pub fn resolve_from<P: AsRef<Path>>(home: P) -> Result<Self> {
        let home = home.as_ref();
        let home = if home.is_absolute() {
            home.to_path_buf()
        } else {
            env::current_dir()
                .map_err(|e| {
                    EvictError::UserError(format!(
                        "failed to get current working directory: {}",
                        e
                    ))
                })?
                .join(home)
        };

        Ok(Self {
            table_dir: home.join("table"),
            policies_dir: home.join("policies"),
            events_dir: home.join("events"),
            home,
        })
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.yaml")
    }

    /// Exported identity store used to resolve lifecycle events.
    pub fn directory_path(&self) -> PathBuf {
        self.home.join("directory.yaml")
    }

    pub fn events_file(&self) -> PathBuf {
        self.events_dir.join("events.ndjson")
    }

    /// Whether `init` has laid out this home.
    pub fn is_initialized(&self) -> bool {
        self.config_path().is_file() && self.table_dir.is_dir()
    }

    /// Ensure the home is initialized, returning an error if not.
    ///
    /// Called by all commands except `init`.
    pub fn ensure_initialized(&self) -> Result<()> {
        if !self.is_initialized() {
            return Err(EvictError::UserError(format!(
                "evict home not initialized.\n\
                 Expected config at: {}\n\n\
                 Run `evict init` to initialize it, or pass --home / set {}.",
                self.config_path().display(),
                HOME_ENV_VAR
            )));
        }
        Ok(())
    }
}

/// Resolve the home and ensure it is initialized.
pub fn require_initialized_home(explicit: Option<&Path>) -> Result<HomeContext> {
    let ctx = HomeContext::resolve(explicit)?;
    ctx.ensure_initialized()?;
    Ok(ctx)
}
