//! Display formatting for terminal output
//!
//! Plain-text tables and detail views for goals, milestones, statistics and
//! transaction history.

pub mod goal;
pub mod transaction;

pub use goal::{
    format_goal_details, format_goal_list, format_history, format_milestone_list,
    format_reminders, format_statistics,
};
pub use transaction::format_transaction_list;
