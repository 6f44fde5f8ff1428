//! Goal aggregate
//!
//! A goal owns its milestones and progress ledger outright (they are embedded,
//! not referenced). All mutation of the banked amount goes through
//! [`Goal::record_progress`] or [`Goal::set_current_amount`], which keep the
//! ledger, milestone completion and status transitions in step.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::ids::{GoalId, TransactionId, UserId};
use super::milestone::Milestone;
use super::money::Money;
use super::progress::{ProgressEntry, ProgressSource};
use super::tracking::TrackingRules;

/// Generates Display/FromStr/`all()` for a snake_case string enum
macro_rules! string_enum {
    ($name:ident, $label:literal, { $($variant:ident => $text:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_lowercase().replace('-', "_");
                match normalized.as_str() {
                    $($text $(| $alias)* => Ok($name::$variant),)+
                    _ => {
                        let valid: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        Err(format!(
                            "Invalid {} '{}'. Valid values: {}",
                            $label,
                            s,
                            valid.join(", ")
                        ))
                    }
                }
            }
        }
    };
}

/// What kind of financial target a goal is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    #[default]
    Savings,
    Investment,
    DebtPayoff,
    Revenue,
    ExpenseReduction,
    EmergencyFund,
    Custom,
}

string_enum!(GoalType, "goal type", {
    Savings => "savings",
    Investment => "investment",
    DebtPayoff => "debt_payoff" | "debt",
    Revenue => "revenue",
    ExpenseReduction => "expense_reduction",
    EmergencyFund => "emergency_fund" | "emergency",
    Custom => "custom",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

string_enum!(GoalPriority, "priority", {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

impl GoalPriority {
    pub fn is_urgent(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

/// Lifecycle state of a goal
///
/// `draft → active → completed | failed | cancelled`, with `paused` as a
/// reversible detour from `active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    Draft,
    Active,
    Completed,
    Paused,
    Failed,
    Cancelled,
}

string_enum!(GoalStatus, "status", {
    Draft => "draft",
    Active => "active",
    Completed => "completed",
    Paused => "paused",
    Failed => "failed",
    Cancelled => "cancelled" | "canceled",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReminderFrequency {
    Daily,
    Weekly,
    #[serde(alias = "bi-weekly")]
    BiWeekly,
    #[default]
    Monthly,
}

string_enum!(ReminderFrequency, "reminder frequency", {
    Daily => "daily",
    Weekly => "weekly",
    BiWeekly => "bi_weekly" | "biweekly",
    Monthly => "monthly",
});

impl ReminderFrequency {
    /// Minimum gap between two reminders
    pub fn interval(&self) -> Duration {
        match self {
            Self::Daily => Duration::days(1),
            Self::Weekly => Duration::days(7),
            Self::BiWeekly => Duration::days(14),
            Self::Monthly => Duration::days(30),
        }
    }
}

/// Validation errors for goals
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalValidationError {
    EmptyName,
    NonPositiveTarget,
    NegativeInitialAmount,
    NegativeCurrentAmount,
    EmptyCurrency,
    DeadlineBeforeStart,
    InvalidMilestone(usize, String),
}

impl fmt::Display for GoalValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Goal name cannot be empty"),
            Self::NonPositiveTarget => write!(f, "Target amount must be greater than zero"),
            Self::NegativeInitialAmount => write!(f, "Initial amount cannot be negative"),
            Self::NegativeCurrentAmount => write!(f, "Current amount cannot be negative"),
            Self::EmptyCurrency => write!(f, "Currency code cannot be empty"),
            Self::DeadlineBeforeStart => write!(f, "Deadline cannot be before the start date"),
            Self::InvalidMilestone(index, reason) => {
                write!(f, "Milestone {}: {}", index, reason)
            }
        }
    }
}

impl std::error::Error for GoalValidationError {}

/// A tracked financial target owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub user_id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    pub target_amount: Money,
    pub current_amount: Money,
    /// Progress already banked before the goal was created
    #[serde(default)]
    pub initial_amount: Money,
    pub currency: String,
    pub deadline: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub priority: GoalPriority,
    #[serde(default)]
    pub status: GoalStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub auto_track: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_rules: Option<TrackingRules>,

    #[serde(default)]
    pub reminder_enabled: bool,
    #[serde(default)]
    pub reminder_frequency: ReminderFrequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reminder_sent: Option<DateTime<Utc>>,

    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub progress_history: Vec<ProgressEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_calculated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGoal {
    pub name: String,
    pub description: Option<String>,
    pub goal_type: GoalType,
    pub target_amount: Money,
    pub initial_amount: Money,
    /// Falls back to the configured default currency when `None`
    pub currency: Option<String>,
    pub deadline: DateTime<Utc>,
    /// Defaults to the creation instant
    pub start_date: Option<DateTime<Utc>>,
    pub priority: GoalPriority,
    pub status: GoalStatus,
    pub category: Option<String>,
    pub tags: BTreeSet<String>,
    pub notes: Option<String>,
    pub auto_track: bool,
    pub tracking_rules: Option<TrackingRules>,
    pub reminder_enabled: bool,
    pub reminder_frequency: ReminderFrequency,
    pub milestones: Vec<Milestone>,
}

impl NewGoal {
    /// Minimal input; everything else takes its default
    pub fn new(name: impl Into<String>, target_amount: Money, deadline: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            description: None,
            goal_type: GoalType::default(),
            target_amount,
            initial_amount: Money::zero(),
            currency: None,
            deadline,
            start_date: None,
            priority: GoalPriority::default(),
            status: GoalStatus::default(),
            category: None,
            tags: BTreeSet::new(),
            notes: None,
            auto_track: false,
            tracking_rules: None,
            reminder_enabled: false,
            reminder_frequency: ReminderFrequency::default(),
            milestones: Vec::new(),
        }
    }
}

/// Partial update for a goal; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub goal_type: Option<GoalType>,
    pub target_amount: Option<Money>,
    pub current_amount: Option<Money>,
    pub initial_amount: Option<Money>,
    pub currency: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub priority: Option<GoalPriority>,
    pub status: Option<GoalStatus>,
    pub category: Option<String>,
    pub tags: Option<BTreeSet<String>>,
    pub notes: Option<String>,
    pub auto_track: Option<bool>,
    pub tracking_rules: Option<TrackingRules>,
    pub reminder_enabled: Option<bool>,
    pub reminder_frequency: Option<ReminderFrequency>,
}

impl GoalPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.goal_type.is_none()
            && self.target_amount.is_none()
            && self.current_amount.is_none()
            && self.initial_amount.is_none()
            && self.currency.is_none()
            && self.deadline.is_none()
            && self.start_date.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.category.is_none()
            && self.tags.is_none()
            && self.notes.is_none()
            && self.auto_track.is_none()
            && self.tracking_rules.is_none()
            && self.reminder_enabled.is_none()
            && self.reminder_frequency.is_none()
    }
}

/// What a reconciliation pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Indices of milestones that flipped to complete
    pub completed_milestones: Vec<usize>,
    pub activated: bool,
    pub completed: bool,
}

impl Goal {
    pub fn new(user_id: UserId, input: NewGoal, default_currency: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: GoalId::new(),
            user_id,
            name: input.name.trim().to_string(),
            description: input.description,
            goal_type: input.goal_type,
            target_amount: input.target_amount,
            current_amount: input.initial_amount,
            initial_amount: input.initial_amount,
            currency: input
                .currency
                .unwrap_or_else(|| default_currency.to_string())
                .to_uppercase(),
            deadline: input.deadline,
            start_date: input.start_date.unwrap_or(now),
            priority: input.priority,
            status: input.status,
            category: input.category,
            tags: input.tags,
            notes: input.notes,
            auto_track: input.auto_track,
            tracking_rules: input.tracking_rules,
            reminder_enabled: input.reminder_enabled,
            reminder_frequency: input.reminder_frequency,
            last_reminder_sent: None,
            milestones: input.milestones,
            progress_history: Vec::new(),
            completed_date: None,
            failed_date: None,
            paused_date: None,
            last_calculated_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), GoalValidationError> {
        if self.name.trim().is_empty() {
            return Err(GoalValidationError::EmptyName);
        }
        if !self.target_amount.is_positive() {
            return Err(GoalValidationError::NonPositiveTarget);
        }
        if self.initial_amount.is_negative() {
            return Err(GoalValidationError::NegativeInitialAmount);
        }
        if self.current_amount.is_negative() {
            return Err(GoalValidationError::NegativeCurrentAmount);
        }
        if self.currency.trim().is_empty() {
            return Err(GoalValidationError::EmptyCurrency);
        }
        if self.deadline < self.start_date {
            return Err(GoalValidationError::DeadlineBeforeStart);
        }
        for (index, milestone) in self.milestones.iter().enumerate() {
            milestone
                .validate()
                .map_err(|e| GoalValidationError::InvalidMilestone(index, e.to_string()))?;
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status == GoalStatus::Active
    }

    /// Apply a signed delta to the banked amount and append it to the ledger.
    ///
    /// The amount is floored at zero; the ledger keeps the requested delta.
    pub fn record_progress(
        &mut self,
        delta: Money,
        source: ProgressSource,
        description: Option<String>,
        transaction_ref: Option<TransactionId>,
        now: DateTime<Utc>,
    ) -> Reconciliation {
        self.current_amount = (self.current_amount + delta).non_negative();
        self.progress_history.push(
            ProgressEntry::new(now, delta, source)
                .with_description(description)
                .with_transaction_ref(transaction_ref),
        );
        self.updated_at = now;
        self.reconcile(now)
    }

    /// Replace the banked amount outright, recording the difference in the
    /// ledger. A zero difference leaves the ledger untouched.
    pub fn set_current_amount(
        &mut self,
        amount: Money,
        source: ProgressSource,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> Reconciliation {
        let amount = amount.non_negative();
        let delta = amount - self.current_amount;
        if !delta.is_zero() {
            self.current_amount = amount;
            self.progress_history
                .push(ProgressEntry::new(now, delta, source).with_description(description));
        }
        self.updated_at = now;
        self.reconcile(now)
    }

    /// Run the automatic transitions that follow any change to the banked
    /// amount: milestone completion, draft activation, goal completion.
    pub fn reconcile(&mut self, now: DateTime<Utc>) -> Reconciliation {
        let mut result = Reconciliation::default();

        for (index, milestone) in self.milestones.iter_mut().enumerate() {
            if milestone.complete_if_reached(self.current_amount, now) {
                result.completed_milestones.push(index);
            }
        }

        if self.status == GoalStatus::Draft && self.current_amount > self.initial_amount {
            self.status = GoalStatus::Active;
            result.activated = true;
        }

        if self.status == GoalStatus::Active && self.current_amount >= self.target_amount {
            self.status = GoalStatus::Completed;
            self.completed_date = Some(now);
            result.completed = true;
        }

        result
    }

    /// Explicit status change requested by the caller
    pub fn set_status(&mut self, status: GoalStatus, now: DateTime<Utc>) {
        match status {
            GoalStatus::Active => {
                // Reactivation wipes the lifecycle dates
                self.completed_date = None;
                self.paused_date = None;
                self.failed_date = None;
            }
            GoalStatus::Paused => self.paused_date = Some(now),
            GoalStatus::Failed => self.failed_date = Some(now),
            GoalStatus::Completed => self.completed_date = Some(now),
            GoalStatus::Draft | GoalStatus::Cancelled => {}
        }
        self.status = status;
        self.updated_at = now;
    }

    /// Merge a patch. Amount changes go through the ledger and trigger the
    /// automatic transitions; an explicit status is applied before them.
    pub fn apply(&mut self, patch: GoalPatch, now: DateTime<Utc>) -> Reconciliation {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(goal_type) = patch.goal_type {
            self.goal_type = goal_type;
        }
        if let Some(currency) = patch.currency {
            self.currency = currency.to_uppercase();
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(category) = patch.category {
            self.category = Some(category);
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
        if let Some(auto_track) = patch.auto_track {
            self.auto_track = auto_track;
        }
        if let Some(rules) = patch.tracking_rules {
            self.tracking_rules = Some(rules);
        }
        if let Some(enabled) = patch.reminder_enabled {
            self.reminder_enabled = enabled;
        }
        if let Some(frequency) = patch.reminder_frequency {
            self.reminder_frequency = frequency;
        }
        if let Some(status) = patch.status {
            self.set_status(status, now);
        }

        let amounts_changed = patch.target_amount.is_some()
            || patch.initial_amount.is_some()
            || patch.current_amount.is_some();
        if let Some(target) = patch.target_amount {
            self.target_amount = target;
        }
        if let Some(initial) = patch.initial_amount {
            self.initial_amount = initial;
        }
        self.updated_at = now;

        match patch.current_amount {
            Some(amount) => self.set_current_amount(
                amount,
                ProgressSource::Manual,
                Some("Manual adjustment".to_string()),
                now,
            ),
            None if amounts_changed => self.reconcile(now),
            None => Reconciliation::default(),
        }
    }

    /// Incomplete milestone with the soonest target date
    pub fn next_milestone(&self) -> Option<&Milestone> {
        self.milestones
            .iter()
            .filter(|m| !m.completed)
            .min_by_key(|m| m.target_date)
    }

    pub fn remove_milestone(&mut self, index: usize) -> Option<Milestone> {
        if index < self.milestones.len() {
            Some(self.milestones.remove(index))
        } else {
            None
        }
    }

    /// Whether a reminder is owed at `now`
    pub fn reminder_due(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active() || !self.reminder_enabled {
            return false;
        }
        match self.last_reminder_sent {
            None => true,
            Some(last) => now - last >= self.reminder_frequency.interval(),
        }
    }

    /// Case-insensitive substring match over name, description and notes
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        let hit = |text: &str| text.to_lowercase().contains(&query);

        hit(&self.name)
            || self.description.as_deref().is_some_and(hit)
            || self.notes.as_deref().is_some_and(hit)
            || self
                .milestones
                .iter()
                .any(|m| m.notes.as_deref().is_some_and(hit))
    }

    /// Whether an auto-tracking recalculation can run
    pub fn can_auto_track(&self) -> bool {
        self.auto_track && self.tracking_rules.as_ref().is_some_and(|r| !r.is_empty())
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} / {} {})",
            self.name, self.current_amount, self.target_amount, self.currency
        )
    }
}
