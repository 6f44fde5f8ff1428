//! Milestone CLI commands

use clap::Subcommand;

use crate::display::format_milestone_list;
use crate::error::StrideResult;
use crate::models::{Milestone, MilestonePatch};
use crate::services::MilestoneService;

use super::{parse_date, parse_money, parse_optional_date, CommandContext};

/// Milestone subcommands
#[derive(Subcommand)]
pub enum MilestoneCommands {
    /// Add a milestone to a goal
    Add {
        /// Goal name or ID
        goal: String,
        /// Milestone name
        name: String,
        /// Amount the goal must reach
        amount: String,
        /// Target date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List a goal's milestones with their indices
    List {
        /// Goal name or ID
        goal: String,
    },
    /// Edit the milestone at an index
    Edit {
        /// Goal name or ID
        goal: String,
        /// Position shown by `milestone list`
        index: usize,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Mark as completed
        #[arg(long, conflicts_with = "reopen")]
        complete: bool,
        /// Mark as not completed
        #[arg(long)]
        reopen: bool,
    },
    /// Delete the milestone at an index
    Delete {
        /// Goal name or ID
        goal: String,
        /// Position shown by `milestone list`
        index: usize,
    },
}

/// Handle a milestone command
pub fn handle_milestone_command(ctx: &CommandContext<'_>, cmd: MilestoneCommands) -> StrideResult<()> {
    let service = MilestoneService::new(ctx.storage, ctx.clock);

    match cmd {
        MilestoneCommands::Add {
            goal,
            name,
            amount,
            date,
            description,
            notes,
        } => {
            let found = ctx.find_goal(&goal)?;
            let mut milestone = Milestone::new(name, parse_money(&amount)?, parse_date(&date)?);
            milestone.description = description;
            milestone.notes = notes;

            let updated = service.add(&ctx.user, found.id, milestone)?;
            println!(
                "Added milestone #{} to {}",
                updated.goal.milestones.len() - 1,
                updated.goal.name
            );
        }

        MilestoneCommands::List { goal } => {
            let found = ctx.find_goal(&goal)?;
            let milestones = service.list(&ctx.user, found.id)?;
            print!("{}", format_milestone_list(&milestones, ctx.symbol()));
        }

        MilestoneCommands::Edit {
            goal,
            index,
            name,
            amount,
            date,
            description,
            notes,
            complete,
            reopen,
        } => {
            let found = ctx.find_goal(&goal)?;
            let completed = match (complete, reopen) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let patch = MilestonePatch {
                name,
                description,
                target_amount: amount.as_deref().map(parse_money).transpose()?,
                target_date: parse_optional_date(date.as_deref())?,
                completed,
                notes,
            };

            let updated = service.update(&ctx.user, found.id, index, patch)?;
            let milestone = &updated.goal.milestones[index];
            println!(
                "Updated milestone #{}: {}{}",
                index,
                milestone.name,
                if milestone.completed { " (completed)" } else { "" }
            );
        }

        MilestoneCommands::Delete { goal, index } => {
            let found = ctx.find_goal(&goal)?;
            let (_, removed) = service.delete(&ctx.user, found.id, index)?;
            println!("Deleted milestone: {}", removed.name);
        }
    }

    Ok(())
}
