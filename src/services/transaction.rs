//! Transaction history service
//!
//! Records the income and expense entries that auto-tracked goals are
//! recalculated from.

use chrono::{DateTime, Utc};

use crate::audit::AuditTarget;
use crate::clock::Clock;
use crate::error::{StrideError, StrideResult};
use crate::models::{Money, TransactionId, TransactionKind, TransactionRecord, UserId};
use crate::storage::Storage;

/// Input for recording a transaction
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: Money,
    /// Defaults to now
    pub date: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub description: Option<String>,
}

impl NewTransaction {
    pub fn new(kind: TransactionKind, amount: Money) -> Self {
        Self {
            kind,
            amount,
            date: None,
            category: None,
            source: None,
            description: None,
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn on(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}

pub struct TransactionService<'a> {
    storage: &'a Storage,
    clock: &'a dyn Clock,
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage, clock: &'a dyn Clock) -> Self {
        Self { storage, clock }
    }

    pub fn add(&self, user_id: &UserId, input: NewTransaction) -> StrideResult<TransactionRecord> {
        let now = self.clock.now();
        let mut record = TransactionRecord::new(
            user_id.clone(),
            input.kind,
            input.amount,
            input.date.unwrap_or(now),
            now,
        );
        record.category = input.category.filter(|c| !c.trim().is_empty());
        record.source = input.source.filter(|s| !s.trim().is_empty());
        record.description = input.description;

        record.validate().map_err(StrideError::Validation)?;

        self.storage.transactions.insert(record.clone())?;
        self.storage.transactions.save()?;

        self.storage.log_create(now, AuditTarget::transaction(&record), &record)?;

        Ok(record)
    }

    /// Newest first, optionally capped
    pub fn list(&self, user_id: &UserId, limit: Option<usize>) -> StrideResult<Vec<TransactionRecord>> {
        let mut records = self.storage.transactions.list_for_user(user_id)?;
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    pub fn delete(&self, user_id: &UserId, id: TransactionId) -> StrideResult<TransactionRecord> {
        let removed = self
            .storage
            .transactions
            .delete(user_id, id)?
            .ok_or_else(|| StrideError::transaction_not_found(id.to_string()))?;
        self.storage.transactions.save()?;

        self.storage.log_delete(self.clock.now(), AuditTarget::transaction(&removed), &removed)?;

        Ok(removed)
    }
}
