//! Service layer for Stride
//!
//! The service layer provides business logic on top of the storage layer:
//! owner scoping, validation, audit logging and derived metrics on every read.

pub mod filter;
pub mod goal;
pub mod milestone;
pub mod reminder;
pub mod statistics;
pub mod transaction;

pub use filter::{GoalFilter, GoalPage, PageRequest, SortField, SortOrder};
pub use goal::GoalService;
pub use milestone::MilestoneService;
pub use reminder::ReminderService;
pub use statistics::{GoalStatistics, StatisticsService, UpcomingMilestone};
pub use transaction::{NewTransaction, TransactionService};
