//! Audit logging for Stride
//!
//! Every create, update and delete performed by the service layer is
//! appended to a line-delimited JSON log with before/after snapshots.
//!
//! - `AuditEntry`: one logged operation
//! - `AuditTarget`: the goal, milestone, ledger entry or transaction it touched
//! - `AuditLogger`: appends entries to and reads them back from the log file
//! - `generate_diff`: one-line summary of the fields that changed

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, AuditTarget, EntityType, Operation};
pub use logger::AuditLogger;
