//! Auto-tracking filter rules
//!
//! A goal with `auto_track` enabled derives its banked amount from the
//! transaction records these rules select.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::transaction::{TransactionKind, TransactionRecord};

/// Which transaction records count toward an auto-tracked goal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackingRules {
    /// Only these categories count (empty = all)
    #[serde(default)]
    pub include_categories: Vec<String>,
    /// These categories never count
    #[serde(default)]
    pub exclude_categories: Vec<String>,
    /// Only these sources count (empty = all)
    #[serde(default)]
    pub sources: Vec<String>,
    /// Only these kinds count (empty = both)
    #[serde(default)]
    pub transaction_types: Vec<TransactionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

impl TrackingRules {
    /// True when no rule narrows anything down
    pub fn is_empty(&self) -> bool {
        self.include_categories.is_empty()
            && self.exclude_categories.is_empty()
            && self.sources.is_empty()
            && self.transaction_types.is_empty()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    pub fn allows_kind(&self, kind: TransactionKind) -> bool {
        self.transaction_types.is_empty() || self.transaction_types.contains(&kind)
    }

    /// Whether a record passes every rule
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        if !self.allows_kind(record.kind) {
            return false;
        }

        let category = record.category.as_deref();
        if !self.include_categories.is_empty()
            && !category.is_some_and(|c| contains_ignore_case(&self.include_categories, c))
        {
            return false;
        }
        if category.is_some_and(|c| contains_ignore_case(&self.exclude_categories, c)) {
            return false;
        }

        if !self.sources.is_empty()
            && !record
                .source
                .as_deref()
                .is_some_and(|s| contains_ignore_case(&self.sources, s))
        {
            return false;
        }

        if self.start_date.is_some_and(|start| record.date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| record.date > end) {
            return false;
        }

        true
    }
}

fn contains_ignore_case(list: &[String], value: &str) -> bool {
    list.iter().any(|item| item.eq_ignore_ascii_case(value))
}
