//! Store handle lifecycle.
//!
//! # Responsibility
//! - Own the single open connection inside a storage worker thread.
//! - Serialize every store operation through one FIFO job queue.
//! - Publish a fresh sorted snapshot after each committed write.
//! - Hand out exactly one handle per `StoreCell`.
//!
//! # Invariants
//! - Only the worker thread touches the connection.
//! - Jobs run in submission order.
//! - A write job's snapshot is published before its caller sees the result.

mod cell;
mod config;
mod handle;
mod worker;

pub use cell::StoreCell;
pub use config::{StoreConfig, StoreLocation};
pub(crate) use handle::Access;
pub use handle::StoreHandle;
