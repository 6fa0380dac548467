//! Wiring of an initialized home into the stores and collaborators.

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::context::HomeContext;
use crate::directory::FileDirectory;
use crate::error::Result;
use crate::exclusions::ExclusionStore;
use crate::locks::ExclusionLock;
use crate::policy::FilePolicyPublisher;
use crate::table::{FileTable, RecordStore};
use std::sync::Arc;

/// Everything a command needs, opened from one home.
pub(crate) struct Services {
    pub ctx: HomeContext,
    pub config: Config,
    pub clock: Arc<dyn Clock>,
    pub store: ExclusionStore,
    pub lock: ExclusionLock,
}

impl Services {
    /// Open an initialized home with the system clock.
    pub(crate) fn open(ctx: &HomeContext) -> Result<Self> {
        Self::open_with_clock(ctx, Arc::new(SystemClock))
    }

    pub(crate) fn open_with_clock(ctx: &HomeContext, clock: Arc<dyn Clock>) -> Result<Self> {
        ctx.ensure_initialized()?;
        let config = Config::load(ctx.config_path())?;

        let table: Arc<dyn RecordStore> = Arc::new(FileTable::new(&ctx.table_dir));
        let store = ExclusionStore::new(table.clone(), clock.clone());
        let lock = ExclusionLock::new(table, clock.clone(), config.lock_settings());

        Ok(Self {
            ctx: ctx.clone(),
            config,
            clock,
            store,
            lock,
        })
    }

    /// Policy store for the configured policy id.
    pub(crate) fn publisher(&self) -> FilePolicyPublisher {
        FilePolicyPublisher::new(
            &self.ctx.policies_dir,
            &self.config.policy_id,
            &self.config.policy_name,
            &self.config.policy_description,
        )
    }

    /// Directory export for the configured identity store.
    pub(crate) fn directory(&self) -> FileDirectory {
        FileDirectory::new(self.ctx.directory_path(), &self.config.identity_store_id)
    }
}
