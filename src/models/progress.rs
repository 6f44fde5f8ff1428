//! Progress ledger entries
//!
//! Each entry records one signed delta applied to a goal's banked amount.
//! Entries are append-only: corrections are new negative entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::TransactionId;
use super::money::Money;

/// Where a progress entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProgressSource {
    #[default]
    Manual,
    Auto,
    Milestone,
}

impl ProgressSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Auto => "auto",
            Self::Milestone => "milestone",
        }
    }
}

impl fmt::Display for ProgressSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ProgressSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "auto" => Ok(Self::Auto),
            "milestone" => Ok(Self::Milestone),
            other => Err(format!(
                "Invalid progress source '{}'. Valid sources: manual, auto, milestone",
                other
            )),
        }
    }
}

/// One immutable delta in a goal's progress history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub date: DateTime<Utc>,
    /// The delta applied, not the resulting total
    pub amount: Money,
    pub source: ProgressSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_ref: Option<TransactionId>,
}

impl ProgressEntry {
    pub fn new(date: DateTime<Utc>, amount: Money, source: ProgressSource) -> Self {
        Self {
            date,
            amount,
            source,
            description: None,
            transaction_ref: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.trim().is_empty());
        self
    }

    pub fn with_transaction_ref(mut self, transaction_ref: Option<TransactionId>) -> Self {
        self.transaction_ref = transaction_ref;
        self
    }

    pub fn is_correction(&self) -> bool {
        self.amount.is_negative()
    }
}
