//! Transaction history repository
//!
//! Backs auto-tracking: goals query it through their tracking rules.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::StrideError;
use crate::models::{Money, TrackingRules, TransactionId, TransactionKind, TransactionRecord, UserId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    #[serde(default)]
    transactions: Vec<TransactionRecord>,
}

pub struct TransactionRepository {
    path: PathBuf,
    transactions: RwLock<HashMap<TransactionId, TransactionRecord>>,
}

impl TransactionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            transactions: RwLock::new(HashMap::new()),
        }
    }

    fn read(
        &self,
    ) -> Result<RwLockReadGuard<'_, HashMap<TransactionId, TransactionRecord>>, StrideError> {
        self.transactions
            .read()
            .map_err(|e| StrideError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<TransactionId, TransactionRecord>>, StrideError> {
        self.transactions
            .write()
            .map_err(|e| StrideError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    pub fn load(&self) -> Result<(), StrideError> {
        let file_data: TransactionData = read_json(&self.path)?;

        let mut transactions = self.write()?;
        transactions.clear();
        for record in file_data.transactions {
            transactions.insert(record.id, record);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), StrideError> {
        let transactions = self.read()?;

        let mut list: Vec<_> = transactions.values().cloned().collect();
        list.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

        write_json_atomic(&self.path, &TransactionData { transactions: list })
    }

    pub fn insert(&self, record: TransactionRecord) -> Result<(), StrideError> {
        self.write()?.insert(record.id, record);
        Ok(())
    }

    pub fn get(&self, id: TransactionId) -> Result<Option<TransactionRecord>, StrideError> {
        Ok(self.read()?.get(&id).cloned())
    }

    pub fn delete(&self, user_id: &UserId, id: TransactionId) -> Result<Option<TransactionRecord>, StrideError> {
        let mut transactions = self.write()?;
        match transactions.get(&id) {
            Some(record) if &record.user_id == user_id => Ok(transactions.remove(&id)),
            _ => Ok(None),
        }
    }

    /// A user's records, newest first
    pub fn list_for_user(&self, user_id: &UserId) -> Result<Vec<TransactionRecord>, StrideError> {
        let mut list: Vec<_> = self
            .read()?
            .values()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
        Ok(list)
    }

    /// Records of one kind owned by `user_id` that pass `rules`
    pub fn query(
        &self,
        user_id: &UserId,
        rules: &TrackingRules,
        kind: TransactionKind,
    ) -> Result<Vec<TransactionRecord>, StrideError> {
        if !rules.allows_kind(kind) {
            return Ok(Vec::new());
        }
        Ok(self
            .read()?
            .values()
            .filter(|r| &r.user_id == user_id && r.kind == kind && rules.matches(r))
            .cloned()
            .collect())
    }

    /// Total of the records `query` would return
    pub fn sum_matching(
        &self,
        user_id: &UserId,
        rules: &TrackingRules,
        kind: TransactionKind,
    ) -> Result<Money, StrideError> {
        Ok(self
            .query(user_id, rules, kind)?
            .iter()
            .map(|r| r.amount)
            .sum())
    }
}
