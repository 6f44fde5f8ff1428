//! Reminder CLI commands

use clap::Subcommand;

use crate::display::format_reminders;
use crate::error::StrideResult;
use crate::models::GoalId;
use crate::services::ReminderService;

use super::{print_json, CommandContext};

/// Reminder subcommands
#[derive(Subcommand)]
pub enum ReminderCommands {
    /// List goals with a reminder due
    Due {
        /// Scan every user's goals
        #[arg(long)]
        all_users: bool,
        #[arg(long)]
        json: bool,
    },
    /// Record that a reminder was sent for a goal
    Sent {
        /// Goal name or ID
        goal: String,
    },
}

/// Handle a reminder command
pub fn handle_reminder_command(ctx: &CommandContext<'_>, cmd: ReminderCommands) -> StrideResult<()> {
    let service = ReminderService::new(ctx.storage, ctx.clock);

    match cmd {
        ReminderCommands::Due { all_users, json } => {
            let user = (!all_users).then_some(&ctx.user);
            let due = service.goals_needing_reminders(user)?;
            if json {
                print_json(&due)?;
            } else {
                print!("{}", format_reminders(&due, ctx.symbol()));
            }
        }

        ReminderCommands::Sent { goal } => {
            // A full id may belong to any user; names resolve for the current one
            let id = match goal.parse::<GoalId>() {
                Ok(id) => id,
                Err(_) => ctx.find_goal(&goal)?.id,
            };
            let updated = service.mark_reminder_sent(id)?;
            println!("Reminder recorded for {}", updated.goal.name);
        }
    }

    Ok(())
}
