use super::config::StoreConfig;
use super::handle::StoreHandle;
use crate::repo::contact_store::{RepoError, RepoResult};
use log::info;
use once_cell::sync::OnceCell;

/// One-time holder for the application's store handle.
///
/// Construct one at startup and pass it (or the handle it yields) to every
/// consumer. Racing first callers are serialized: exactly one opens the
/// database and the rest receive its handle.
#[derive(Default)]
pub struct StoreCell {
    cell: OnceCell<StoreHandle>,
}

impl StoreCell {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Returns the open handle, opening it with `config` on first use.
    ///
    /// # Errors
    /// - Open/bootstrap failures; the cell stays empty so a later call can
    ///   retry.
    /// - `ConfigMismatch` when a handle for a different database is already
    ///   held. Paths naming the same file (`a.db`, `./a.db`, a symlink) are
    ///   treated as the same database.
    pub fn get_or_open(&self, config: &StoreConfig) -> RepoResult<StoreHandle> {
        let handle = self.cell.get_or_try_init(|| {
            info!(
                "event=store_cell_init module=store status=start mode={}",
                config.mode()
            );
            StoreHandle::open(config)
        })?;

        if !handle.config().same_location(config) {
            return Err(RepoError::ConfigMismatch {
                active: handle.config().display_path().to_path_buf(),
                requested: config.display_path().to_path_buf(),
            });
        }

        Ok(handle.clone())
    }

    /// Returns the handle if one has been opened.
    pub fn get(&self) -> Option<StoreHandle> {
        self.cell.get().cloned()
    }
}
