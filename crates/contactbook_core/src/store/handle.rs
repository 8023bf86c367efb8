use super::config::{StoreConfig, StoreLocation};
use super::worker::{self, Command, Job, WorkerContext};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::feed::{ContactFeed, ContactSnapshot};
use crate::repo::contact_store::{ContactStore, RepoError, RepoResult, SqliteContactStore};
use log::{error, info};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot, watch};

const WORKER_THREAD_NAME: &str = "contactbook-store";

/// Whether a job may change table contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Read,
    Write,
}

/// Shared handle to one open contact store.
///
/// Cloning is cheap; all clones talk to the same worker and connection.
#[derive(Clone)]
pub struct StoreHandle {
    shared: Arc<StoreShared>,
}

struct StoreShared {
    config: StoreConfig,
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Arc<ContactSnapshot>>,
}

impl StoreHandle {
    /// Opens the configured database, loads the first snapshot and starts the
    /// storage worker.
    ///
    /// Blocks the calling thread for the duration of the open.
    pub fn open(config: &StoreConfig) -> RepoResult<Self> {
        let started_at = Instant::now();
        info!(
            "event=store_open module=store status=start mode={}",
            config.mode()
        );

        let conn = match &config.location {
            StoreLocation::File(path) => open_db(path)?,
            StoreLocation::InMemory => open_db_in_memory()?,
        };
        let initial = SqliteContactStore::new(&conn).list_all()?;
        let initial_count = initial.len();

        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(ContactSnapshot {
            revision: 0,
            contacts: initial,
        }));
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || worker::run(conn, command_rx, snapshot_tx))
            .map_err(|err| {
                error!(
                    "event=store_open module=store status=error error_code=worker_spawn_failed error={}",
                    err
                );
                DbError::from(err)
            })?;

        info!(
            "event=store_open module=store status=ok mode={} count={} duration_ms={}",
            config.mode(),
            initial_count,
            started_at.elapsed().as_millis()
        );

        Ok(Self {
            shared: Arc::new(StoreShared {
                config: config.clone(),
                commands: command_tx,
                snapshots: snapshot_rx,
            }),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.shared.config
    }

    /// Returns whether both handles refer to the same open store.
    pub fn same_store(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.shared, &b.shared)
    }

    /// Returns whether the worker has stopped accepting jobs.
    pub fn is_closed(&self) -> bool {
        self.shared.commands.is_closed()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<ContactSnapshot> {
        self.shared.snapshots.borrow().clone()
    }

    /// Opens a new feed subscription.
    pub fn subscribe(&self) -> ContactFeed {
        ContactFeed::new(self.shared.snapshots.clone())
    }

    /// Queues `op` on the worker and returns a future for its result.
    ///
    /// The job is enqueued before this function returns, so calls issued in
    /// sequence are applied in sequence whether or not their futures have
    /// been polled yet.
    pub(crate) fn submit<T, F>(
        &self,
        access: Access,
        op: F,
    ) -> impl Future<Output = RepoResult<T>> + Send + 'static
    where
        T: Send + 'static,
        F: FnOnce(&SqliteContactStore<'_>) -> RepoResult<T> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |context: &WorkerContext<'_>| {
            let result = op(context.store());
            if access == Access::Write {
                context.publish_snapshot();
            }
            let _ = reply_tx.send(result);
        });
        let queued = self
            .shared
            .commands
            .send(Command::Run(job))
            .map_err(|_| RepoError::StoreClosed);

        async move {
            match queued {
                Ok(()) => reply_rx.await.unwrap_or(Err(RepoError::StoreClosed)),
                Err(err) => Err(err),
            }
        }
    }

    /// Flushes and closes the store.
    ///
    /// Jobs queued before this call complete first. Afterwards every feed
    /// ends and further operations fail with `StoreClosed`. Closing an
    /// already closed store succeeds.
    pub async fn close(&self) -> RepoResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.shared.commands.send(Command::Shutdown(ack_tx)).is_err() {
            return Ok(());
        }

        match ack_rx.await {
            Ok(result) => result,
            Err(_) => Ok(()),
        }
    }
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle")
            .field("config", &self.shared.config)
            .field("closed", &self.is_closed())
            .finish()
    }
}
