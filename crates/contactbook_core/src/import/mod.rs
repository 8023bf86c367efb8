//! Import candidates, selection state and batch reports.
//!
//! # Responsibility
//! - Model what the directory offers for import and what the user picked.
//! - Summarize the per-item outcome of an import batch.
//!
//! # Invariants
//! - Candidates are identified by external id; a listing never repeats one.
//! - Selection is a set: a candidate is either selected or not.

mod candidate;
mod selection;

pub use candidate::{CandidateContact, CandidateListing, ImportFailure, ImportReport};
pub use selection::ImportSelection;
