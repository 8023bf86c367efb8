//! Contact domain model.
//!
//! # Responsibility
//! - Define the persisted contact record and the insert request shape.
//!
//! # Invariants
//! - Every stored contact is identified by a store-generated `ContactId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod contact;
