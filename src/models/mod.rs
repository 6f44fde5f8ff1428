//! Core data models for Stride
//!
//! The goal aggregate and everything embedded in it (milestones, progress
//! ledger, tracking rules), the income/expense records auto-tracking reads,
//! and the derived metrics computed over them.

pub mod goal;
pub mod ids;
pub mod metrics;
pub mod milestone;
pub mod money;
pub mod progress;
pub mod tracking;
pub mod transaction;

pub use goal::{
    Goal, GoalPatch, GoalPriority, GoalStatus, GoalType, GoalValidationError, NewGoal,
    Reconciliation, ReminderFrequency,
};
pub use ids::{GoalId, TransactionId, UserId};
pub use metrics::{GoalMetrics, GoalWithMetrics};
pub use milestone::{Milestone, MilestonePatch, MilestoneValidationError};
pub use money::{Money, MoneyParseError};
pub use progress::{ProgressEntry, ProgressSource};
pub use tracking::TrackingRules;
pub use transaction::{TransactionKind, TransactionRecord};
