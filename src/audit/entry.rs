//! Audit entry data structures
//!
//! Milestones and ledger entries live inside their goal's document, so they
//! are addressed as `<goal id>#<index>`. Every entry except a transaction's
//! can be traced back to the goal it touched.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Goal, GoalId, TransactionRecord};

use super::diff::generate_diff;

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Entity was created
    Create,
    /// Entity was modified
    Update,
    /// Entity was removed
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Types of entities that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Goal,
    Milestone,
    /// One entry in a goal's progress ledger
    ProgressEntry,
    /// Income/expense record
    Transaction,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Goal => "Goal",
            EntityType::Milestone => "Milestone",
            EntityType::ProgressEntry => "Progress",
            EntityType::Transaction => "Transaction",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// What an audit entry is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTarget {
    pub entity_type: EntityType,
    pub entity_id: String,
    /// Goal name, milestone name or transaction description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
}

impl AuditTarget {
    pub fn goal(goal: &Goal) -> Self {
        Self {
            entity_type: EntityType::Goal,
            entity_id: goal.id.to_string(),
            entity_name: Some(goal.name.clone()),
        }
    }

    pub fn milestone(goal: &Goal, index: usize, name: &str) -> Self {
        Self {
            entity_type: EntityType::Milestone,
            entity_id: format!("{}#{}", goal.id, index),
            entity_name: Some(name.to_string()),
        }
    }

    /// The ledger entry at `index`
    pub fn progress(goal: &Goal, index: usize) -> Self {
        Self {
            entity_type: EntityType::ProgressEntry,
            entity_id: format!("{}#{}", goal.id, index),
            entity_name: Some(goal.name.clone()),
        }
    }

    pub fn transaction(record: &TransactionRecord) -> Self {
        Self {
            entity_type: EntityType::Transaction,
            entity_id: record.id.to_string(),
            entity_name: record.description.clone(),
        }
    }

    /// Goal owning the entity; `None` for transactions
    pub fn goal_id(&self) -> Option<GoalId> {
        if self.entity_type == EntityType::Transaction {
            return None;
        }
        let goal_part = self.entity_id.split('#').next()?;
        goal_part.parse().ok()
    }
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC, from the injected clock)
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    #[serde(flatten)]
    pub target: AuditTarget,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    fn new(
        timestamp: DateTime<Utc>,
        operation: Operation,
        target: AuditTarget,
        before: Option<Value>,
        after: Option<Value>,
    ) -> Self {
        Self {
            timestamp,
            operation,
            target,
            before,
            after,
            diff_summary: None,
        }
    }

    pub fn create<T: Serialize>(timestamp: DateTime<Utc>, target: AuditTarget, entity: &T) -> Self {
        Self::new(
            timestamp,
            Operation::Create,
            target,
            None,
            serde_json::to_value(entity).ok(),
        )
    }

    /// Update entry whose summary is derived from the two snapshots
    pub fn update<T: Serialize>(
        timestamp: DateTime<Utc>,
        target: AuditTarget,
        before: &T,
        after: &T,
    ) -> Self {
        let mut entry = Self::new(
            timestamp,
            Operation::Update,
            target,
            serde_json::to_value(before).ok(),
            serde_json::to_value(after).ok(),
        );
        if let (Some(b), Some(a)) = (&entry.before, &entry.after) {
            entry.diff_summary = generate_diff(b, a);
        }
        entry
    }

    pub fn delete<T: Serialize>(timestamp: DateTime<Utc>, target: AuditTarget, entity: &T) -> Self {
        Self::new(
            timestamp,
            Operation::Delete,
            target,
            serde_json::to_value(entity).ok(),
            None,
        )
    }

    /// Replace the derived summary
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.diff_summary = Some(summary.into());
        self
    }

    pub fn concerns_goal(&self, goal_id: GoalId) -> bool {
        self.target.goal_id() == Some(goal_id)
    }

    /// One line per entry, plus the change summary when there is one
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {:<6} {:<9} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.target.entity_type,
            self.target.entity_id
        );

        if let Some(name) = &self.target.entity_name {
            output.push_str(&format!(" ({})", name));
        }

        if let Some(diff) = &self.diff_summary {
            output.push_str(&format!("\n  Changes: {}", diff));
        }

        output
    }
}
