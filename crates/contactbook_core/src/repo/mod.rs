//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the synchronous contact storage contract.
//! - Isolate SQLite query details from the async service layer.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `Conflict`) in
//!   addition to storage errors.

pub mod contact_store;
