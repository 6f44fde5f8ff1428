//! Milestones: ordered sub-targets embedded in a goal
//!
//! Milestones have no identity outside their parent goal and are addressed by
//! position. Auto-completion is one-way; reopening is a manual edit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::money::Money;

/// Validation errors for milestones
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MilestoneValidationError {
    EmptyName,
    NegativeTarget,
}

impl std::fmt::Display for MilestoneValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Milestone name cannot be empty"),
            Self::NegativeTarget => write!(f, "Milestone target amount cannot be negative"),
        }
    }
}

impl std::error::Error for MilestoneValidationError {}

/// A sub-target within a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub target_amount: Money,
    pub target_date: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update for a milestone; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MilestonePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub target_amount: Option<Money>,
    pub target_date: Option<DateTime<Utc>>,
    pub completed: Option<bool>,
    pub notes: Option<String>,
}

impl Milestone {
    pub fn new(name: impl Into<String>, target_amount: Money, target_date: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            description: None,
            target_amount,
            target_date,
            completed: false,
            completed_date: None,
            notes: None,
        }
    }

    pub fn validate(&self) -> Result<(), MilestoneValidationError> {
        if self.name.trim().is_empty() {
            return Err(MilestoneValidationError::EmptyName);
        }
        if self.target_amount.is_negative() {
            return Err(MilestoneValidationError::NegativeTarget);
        }
        Ok(())
    }

    /// Mark complete if the banked amount has reached this milestone.
    /// Returns true when this call flipped the flag.
    pub fn complete_if_reached(&mut self, current_amount: Money, now: DateTime<Utc>) -> bool {
        if self.completed || current_amount < self.target_amount {
            return false;
        }
        self.completed = true;
        self.completed_date = Some(now);
        true
    }

    /// Merge a patch into this milestone
    pub fn apply(&mut self, patch: MilestonePatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(target_amount) = patch.target_amount {
            self.target_amount = target_amount;
        }
        if let Some(target_date) = patch.target_date {
            self.target_date = target_date;
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
        match patch.completed {
            Some(true) if !self.completed => {
                self.completed = true;
                self.completed_date = Some(now);
            }
            Some(false) => {
                self.completed = false;
                self.completed_date = None;
            }
            _ => {}
        }
    }

    pub fn is_lapsed(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.target_date < now
    }
}
