//! Core use-case services.
//!
//! # Responsibility
//! - Expose async contact operations and the live list to callers.
//! - Reconcile the external directory into the store.
//! - Keep presentation layers decoupled from storage details.

pub mod contact_service;
pub mod import_service;
