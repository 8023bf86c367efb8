//! Storage worker loop.
//!
//! The worker owns the connection for its whole life. It drains the command
//! queue in order, republishes the sorted snapshot after write jobs, and on
//! shutdown checkpoints and closes the database before acknowledging.

use crate::feed::ContactSnapshot;
use crate::repo::contact_store::{ContactStore, RepoResult, SqliteContactStore};
use log::{debug, error, info};
use rusqlite::Connection;
use std::cell::Cell;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot, watch};

pub(super) type Job = Box<dyn FnOnce(&WorkerContext<'_>) + Send>;

pub(super) enum Command {
    Run(Job),
    Shutdown(oneshot::Sender<RepoResult<()>>),
}

/// Borrowed view of worker state handed to each job.
pub(super) struct WorkerContext<'w> {
    store: SqliteContactStore<'w>,
    snapshots: &'w watch::Sender<Arc<ContactSnapshot>>,
    refresh_pending: &'w Cell<bool>,
}

impl<'w> WorkerContext<'w> {
    pub(super) fn store(&self) -> &SqliteContactStore<'w> {
        &self.store
    }

    /// Re-reads the full table and publishes it when it differs from the
    /// current snapshot.
    ///
    /// A failed read leaves the published snapshot stale and marks a refresh
    /// as pending; the worker retries it before the next job.
    pub(super) fn publish_snapshot(&self) {
        let contacts = match self.store.list_all() {
            Ok(contacts) => contacts,
            Err(err) => {
                self.refresh_pending.set(true);
                error!(
                    "event=snapshot_publish module=store status=error error_code=snapshot_read_failed error={}",
                    err
                );
                return;
            }
        };
        self.refresh_pending.set(false);

        let published = self.snapshots.send_if_modified(move |current| {
            if current.contacts == contacts {
                return false;
            }
            *current = Arc::new(ContactSnapshot {
                revision: current.revision + 1,
                contacts,
            });
            true
        });

        if published {
            let snapshot = self.snapshots.borrow();
            debug!(
                "event=snapshot_publish module=store status=ok revision={} count={}",
                snapshot.revision,
                snapshot.contacts.len()
            );
        }
    }

    fn refresh_if_pending(&self) {
        if self.refresh_pending.get() {
            debug!("event=snapshot_publish module=store status=start phase=retry");
            self.publish_snapshot();
        }
    }
}

pub(super) fn run(
    conn: Connection,
    mut commands: mpsc::UnboundedReceiver<Command>,
    snapshots: watch::Sender<Arc<ContactSnapshot>>,
) {
    info!("event=store_worker module=store status=start");
    let mut shutdown_ack = None;
    let refresh_pending = Cell::new(false);

    while let Some(command) = commands.blocking_recv() {
        match command {
            Command::Run(job) => {
                let context = WorkerContext {
                    store: SqliteContactStore::new(&conn),
                    snapshots: &snapshots,
                    refresh_pending: &refresh_pending,
                };
                context.refresh_if_pending();
                job(&context);
            }
            Command::Shutdown(ack) => {
                shutdown_ack = Some(ack);
                break;
            }
        }
    }

    // Jobs queued behind the shutdown are dropped; their callers observe
    // `StoreClosed`.
    commands.close();
    drop(commands);

    let result = close_connection(conn);
    drop(snapshots);

    match &result {
        Ok(()) => info!("event=store_worker module=store status=ok phase=stop"),
        Err(err) => error!(
            "event=store_worker module=store status=error phase=stop error_code=db_close_failed error={}",
            err
        ),
    }

    if let Some(ack) = shutdown_ack {
        let _ = ack.send(result);
    }
}

fn close_connection(conn: Connection) -> RepoResult<()> {
    let started_at = Instant::now();
    conn.query_row("PRAGMA wal_checkpoint(TRUNCATE);", [], |_| Ok(()))?;
    conn.close().map_err(|(_, err)| err)?;
    debug!(
        "event=db_close module=db status=ok duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::WorkerContext;
    use crate::db::open_db_in_memory;
    use crate::feed::ContactSnapshot;
    use crate::repo::contact_store::SqliteContactStore;
    use std::cell::Cell;
    use std::sync::Arc;
    use tokio::sync::watch;

    #[test]
    fn failed_snapshot_read_is_retried_on_next_job() {
        let conn = open_db_in_memory().unwrap();
        // Table without NOT NULL so an unreadable row can be committed.
        conn.execute_batch(
            "DROP TABLE contacts;
             CREATE TABLE contacts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT,
                phone_number TEXT NOT NULL DEFAULT '',
                image_uri TEXT,
                external_id INTEGER
             );
             INSERT INTO contacts (name, phone_number) VALUES ('Ann', '111');
             INSERT INTO contacts (name, phone_number) VALUES (NULL, '');",
        )
        .unwrap();

        let (snapshots, rx) = watch::channel(Arc::new(ContactSnapshot {
            revision: 0,
            contacts: Vec::new(),
        }));
        let refresh_pending = Cell::new(false);
        let context = WorkerContext {
            store: SqliteContactStore::new(&conn),
            snapshots: &snapshots,
            refresh_pending: &refresh_pending,
        };

        context.publish_snapshot();
        assert!(refresh_pending.get());
        assert_eq!(rx.borrow().revision, 0);

        conn.execute_batch("DELETE FROM contacts WHERE name IS NULL;")
            .unwrap();
        context.refresh_if_pending();

        assert!(!refresh_pending.get());
        let snapshot = rx.borrow();
        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.contacts.len(), 1);
        assert_eq!(snapshot.contacts[0].name, "Ann");
    }
}
