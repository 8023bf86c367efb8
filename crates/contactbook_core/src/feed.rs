//! Live contact list feed.
//!
//! # Responsibility
//! - Deliver full, name-sorted snapshots of the contact table to any number
//!   of subscribers.
//!
//! # Invariants
//! - A new subscriber's first `next()` yields the current snapshot at once.
//! - Snapshots arrive in commit order; a slow subscriber may skip
//!   intermediate snapshots but never sees an older one after a newer one.
//! - Dropping a feed has no effect on the store.
//! - A snapshot that cannot be re-read after a committed write is retried
//!   before the worker's next job, so the feed catches up without waiting
//!   for another write.

use crate::model::contact::{ContactRecord, ExternalId};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::watch;

/// Full table contents at one point in commit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSnapshot {
    /// Incremented by one for every published change; `0` is the state at
    /// open time.
    pub revision: u64,
    /// Every stored contact, sorted by `name ASC, id ASC`.
    pub contacts: Vec<ContactRecord>,
}

impl ContactSnapshot {
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// External ids of every imported contact in this snapshot.
    pub fn external_ids(&self) -> BTreeSet<ExternalId> {
        self.contacts
            .iter()
            .filter_map(|contact| contact.external_id)
            .collect()
    }
}

/// Subscription to the contact list.
pub struct ContactFeed {
    rx: watch::Receiver<Arc<ContactSnapshot>>,
    delivered_initial: bool,
}

impl ContactFeed {
    pub(crate) fn new(rx: watch::Receiver<Arc<ContactSnapshot>>) -> Self {
        Self {
            rx,
            delivered_initial: false,
        }
    }

    /// Latest snapshot, without waiting and without consuming an update.
    pub fn current(&self) -> Arc<ContactSnapshot> {
        self.rx.borrow().clone()
    }

    /// Waits for the next snapshot.
    ///
    /// Returns `None` once the store has been closed and every published
    /// snapshot has been delivered.
    pub async fn next(&mut self) -> Option<Arc<ContactSnapshot>> {
        if !self.delivered_initial {
            self.delivered_initial = true;
            return Some(self.rx.borrow_and_update().clone());
        }

        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}
