//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod goal;
pub mod milestone;
pub mod reminder;
pub mod transaction;

pub use goal::{handle_goal_command, GoalCommands};
pub use milestone::{handle_milestone_command, MilestoneCommands};
pub use reminder::{handle_reminder_command, ReminderCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::clock::Clock;
use crate::config::settings::Settings;
use crate::error::{StrideError, StrideResult};
use crate::models::{Goal, Money, UserId};
use crate::services::GoalService;
use crate::storage::Storage;

/// Everything a command handler needs
pub struct CommandContext<'a> {
    pub storage: &'a Storage,
    pub settings: &'a Settings,
    pub clock: &'a dyn Clock,
    pub user: UserId,
}

impl<'a> CommandContext<'a> {
    pub fn goals(&self) -> GoalService<'a> {
        GoalService::new(self.storage, self.clock).with_currency(self.settings.currency_code.clone())
    }

    pub fn symbol(&self) -> &str {
        &self.settings.currency_symbol
    }

    /// Resolve a goal by id, short id or name for the current user
    pub fn find_goal(&self, identifier: &str) -> StrideResult<Goal> {
        self.goals()
            .find(&self.user, identifier)?
            .ok_or_else(|| StrideError::goal_not_found(identifier))
    }
}

pub(crate) fn parse_money(value: &str) -> StrideResult<Money> {
    Money::parse(value).map_err(|e| {
        StrideError::Validation(format!(
            "Invalid amount: '{}'. Use format like '100.00' or '100'. Error: {}",
            value, e
        ))
    })
}

/// Parse `YYYY-MM-DD` as midnight UTC
pub(crate) fn parse_date(value: &str) -> StrideResult<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        StrideError::Validation(format!("Invalid date: '{}'. Use YYYY-MM-DD format", value))
    })?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc())
}

pub(crate) fn parse_optional_date(value: Option<&str>) -> StrideResult<Option<DateTime<Utc>>> {
    value.map(parse_date).transpose()
}

/// Parse one of the string enums (status, type, priority, ...)
pub(crate) fn parse_choice<T>(value: &str) -> StrideResult<T>
where
    T: FromStr<Err = String>,
{
    value.parse::<T>().map_err(StrideError::Validation)
}

pub(crate) fn parse_choices<T>(values: &[String]) -> StrideResult<Vec<T>>
where
    T: FromStr<Err = String>,
{
    values.iter().map(|v| parse_choice(v)).collect()
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> StrideResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
