//! Storage layer for Stride
//!
//! JSON file storage with atomic writes and automatic directory creation.
//! Every mutation that reaches disk is also written to the audit log.

pub mod file_io;
pub mod goals;
pub mod transactions;

pub use file_io::{read_json, write_json_atomic};
pub use goals::GoalRepository;
pub use transactions::TransactionRepository;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, AuditTarget};
use crate::config::paths::StridePaths;
use crate::error::StrideError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: StridePaths,
    pub goals: GoalRepository,
    pub transactions: TransactionRepository,
    audit: AuditLogger,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: StridePaths) -> Result<Self, StrideError> {
        paths.ensure_directories()?;

        Ok(Self {
            goals: GoalRepository::new(paths.goals_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    pub fn paths(&self) -> &StridePaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), StrideError> {
        self.goals.load()?;
        self.transactions.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), StrideError> {
        self.goals.save()?;
        self.transactions.save()?;
        Ok(())
    }

    /// Check if `stride init` has been run
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    pub fn log_create<T: Serialize>(
        &self,
        at: DateTime<Utc>,
        target: AuditTarget,
        entity: &T,
    ) -> Result<(), StrideError> {
        self.audit.log(&AuditEntry::create(at, target, entity))
    }

    /// Log an update; without an explicit summary one is derived from the
    /// two snapshots
    pub fn log_update<T: Serialize>(
        &self,
        at: DateTime<Utc>,
        target: AuditTarget,
        before: &T,
        after: &T,
        summary: Option<String>,
    ) -> Result<(), StrideError> {
        let entry = AuditEntry::update(at, target, before, after);
        let entry = match summary {
            Some(summary) => entry.with_summary(summary),
            None => entry,
        };
        self.audit.log(&entry)
    }

    pub fn log_delete<T: Serialize>(
        &self,
        at: DateTime<Utc>,
        target: AuditTarget,
        entity: &T,
    ) -> Result<(), StrideError> {
        self.audit.log(&AuditEntry::delete(at, target, entity))
    }
}
