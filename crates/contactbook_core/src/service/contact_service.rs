//! Contact use-case service.
//!
//! # Responsibility
//! - Be the single entry point presentation code uses for contacts.
//! - Run every store operation off the calling thread on the store worker.
//! - Republish the live contact list.
//!
//! # Invariants
//! - Operations are enqueued when called, so one caller's sequential calls
//!   commit in call order.
//! - Every failure is returned to the caller; nothing is dropped silently.

use crate::feed::ContactFeed;
use crate::model::contact::{ContactDraft, ContactId, ContactRecord};
use crate::repo::contact_store::{ContactStore, RepoError, RepoResult};
use crate::store::{Access, StoreHandle};
use log::{debug, error, warn};
use std::future::Future;

/// Async facade over the shared contact store.
#[derive(Debug, Clone)]
pub struct ContactService {
    store: StoreHandle,
}

impl ContactService {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    /// Subscribes to the name-sorted contact list.
    pub fn observe_all(&self) -> ContactFeed {
        self.store.subscribe()
    }

    /// Inserts one contact and returns its store-generated id.
    ///
    /// Fails with `Conflict` when the draft's external id is already stored.
    pub fn insert(
        &self,
        draft: ContactDraft,
    ) -> impl Future<Output = RepoResult<ContactId>> + Send + 'static {
        let pending = self
            .store
            .submit(Access::Write, move |store| store.insert(&draft));
        async move { logged("contact_insert", pending.await) }
    }

    /// Inserts each draft independently and returns one result per draft.
    ///
    /// The batch is not atomic: a failing draft never stops the rest. A
    /// single snapshot is published for the whole batch. The outer error is
    /// returned only when the batch could not run at all.
    pub fn insert_many(
        &self,
        drafts: Vec<ContactDraft>,
    ) -> impl Future<Output = RepoResult<Vec<RepoResult<ContactId>>>> + Send + 'static {
        let pending = self.store.submit(Access::Write, move |store| {
            Ok(drafts
                .iter()
                .map(|draft| store.insert(draft))
                .collect::<Vec<_>>())
        });
        async move { logged("contact_insert_many", pending.await) }
    }

    /// Replaces name, phone number and image of the contact with
    /// `record.id`.
    ///
    /// Fails with `NotFound` when no such contact exists.
    pub fn update(
        &self,
        record: ContactRecord,
    ) -> impl Future<Output = RepoResult<()>> + Send + 'static {
        let pending = self
            .store
            .submit(Access::Write, move |store| store.update(&record));
        async move { logged("contact_update", pending.await) }
    }

    /// Permanently deletes one contact.
    ///
    /// Fails with `NotFound` when no such contact exists, which a retrying
    /// caller may treat as success.
    pub fn delete(&self, id: ContactId) -> impl Future<Output = RepoResult<()>> + Send + 'static {
        let pending = self
            .store
            .submit(Access::Write, move |store| store.delete(id));
        async move { logged("contact_delete", pending.await) }
    }

    /// Gets one contact by id, read through the worker queue.
    pub fn get(
        &self,
        id: ContactId,
    ) -> impl Future<Output = RepoResult<Option<ContactRecord>>> + Send + 'static {
        let pending = self.store.submit(Access::Read, move |store| store.get(id));
        async move { logged("contact_get", pending.await) }
    }

    /// One-shot read of the full sorted list, ordered after every write
    /// queued before it.
    pub fn list_all(&self) -> impl Future<Output = RepoResult<Vec<ContactRecord>>> + Send + 'static {
        let pending = self.store.submit(Access::Read, |store| store.list_all());
        async move { logged("contact_list", pending.await) }
    }
}

fn logged<T>(event: &'static str, result: RepoResult<T>) -> RepoResult<T> {
    match &result {
        Ok(_) => debug!("event={} module=service status=ok", event),
        Err(RepoError::Conflict { external_id }) => warn!(
            "event={} module=service status=error error_code=conflict external_id={}",
            event, external_id
        ),
        Err(RepoError::NotFound(id)) => warn!(
            "event={} module=service status=error error_code=not_found contact_id={}",
            event, id
        ),
        Err(err) => error!(
            "event={} module=service status=error error_code=storage error={}",
            event,
            err
        ),
    }
    result
}
