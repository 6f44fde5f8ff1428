//! Goal CLI commands
//!
//! Implements CLI commands for goal management, progress and statistics.

use std::collections::BTreeSet;

use clap::Subcommand;

use crate::display::{format_goal_details, format_goal_list, format_history, format_statistics};
use crate::error::{StrideError, StrideResult};
use crate::models::{
    GoalPatch, GoalPriority, GoalStatus, GoalType, NewGoal, ProgressSource, ReminderFrequency,
    TrackingRules, TransactionId, TransactionKind,
};
use crate::services::{GoalFilter, PageRequest, SortField, SortOrder, StatisticsService};

use super::{
    parse_choice, parse_choices, parse_date, parse_money, parse_optional_date, print_json,
    CommandContext,
};

/// Auto-tracking filter options shared by create and edit
#[derive(clap::Args, Debug, Default)]
pub struct TrackingArgs {
    /// Only count transactions in this category (repeatable)
    #[arg(long = "track-category")]
    pub include_categories: Vec<String>,
    /// Never count transactions in this category (repeatable)
    #[arg(long = "skip-category")]
    pub exclude_categories: Vec<String>,
    /// Only count transactions from this source (repeatable)
    #[arg(long = "track-source")]
    pub sources: Vec<String>,
    /// Only count these transaction kinds: income, expense (repeatable)
    #[arg(long = "track-kind")]
    pub kinds: Vec<String>,
    /// Ignore transactions before this date (YYYY-MM-DD)
    #[arg(long = "track-from")]
    pub from: Option<String>,
    /// Ignore transactions after this date (YYYY-MM-DD)
    #[arg(long = "track-to")]
    pub to: Option<String>,
}

impl TrackingArgs {
    fn is_empty(&self) -> bool {
        self.include_categories.is_empty()
            && self.exclude_categories.is_empty()
            && self.sources.is_empty()
            && self.kinds.is_empty()
            && self.from.is_none()
            && self.to.is_none()
    }

    /// Overlay the given flags on `base`; each flag replaces only its own
    /// field. `None` when no flag was given.
    fn merged_with(self, base: Option<&TrackingRules>) -> StrideResult<Option<TrackingRules>> {
        if self.is_empty() {
            return Ok(None);
        }
        let mut rules = base.cloned().unwrap_or_default();
        if !self.kinds.is_empty() {
            rules.transaction_types = parse_choices::<TransactionKind>(&self.kinds)?;
        }
        if let Some(from) = parse_optional_date(self.from.as_deref())? {
            rules.start_date = Some(from);
        }
        if let Some(to) = parse_optional_date(self.to.as_deref())? {
            rules.end_date = Some(to);
        }
        if !self.include_categories.is_empty() {
            rules.include_categories = self.include_categories;
        }
        if !self.exclude_categories.is_empty() {
            rules.exclude_categories = self.exclude_categories;
        }
        if !self.sources.is_empty() {
            rules.sources = self.sources;
        }
        Ok(Some(rules))
    }
}

/// Goal subcommands
#[derive(Subcommand)]
pub enum GoalCommands {
    /// Create a new goal
    Create {
        /// Goal name
        name: String,
        /// Target amount (e.g., "5000" or "5000.00")
        target: String,
        /// Deadline (YYYY-MM-DD)
        #[arg(short, long)]
        deadline: String,
        /// Goal type (savings, investment, debt_payoff, revenue, expense_reduction, emergency_fund, custom)
        #[arg(short = 't', long = "type", default_value = "savings")]
        goal_type: String,
        /// Priority (low, medium, high, critical)
        #[arg(short, long, default_value = "medium")]
        priority: String,
        /// Initial status (draft or active)
        #[arg(short, long, default_value = "draft")]
        status: String,
        /// Amount already saved before tracking starts
        #[arg(long, default_value = "0")]
        initial: String,
        /// Start of the planning window (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        start: Option<String>,
        /// Currency code (defaults to the configured currency)
        #[arg(long)]
        currency: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Derive progress from transaction history
        #[arg(long)]
        auto_track: bool,
        #[command(flatten)]
        tracking: TrackingArgs,
        /// Enable reminders at this frequency (daily, weekly, bi-weekly, monthly)
        #[arg(long)]
        remind: Option<String>,
    },
    /// List goals
    List {
        /// Filter by status (comma separated)
        #[arg(short, long, value_delimiter = ',')]
        status: Vec<String>,
        /// Filter by type (comma separated)
        #[arg(short = 't', long = "type", value_delimiter = ',')]
        goal_type: Vec<String>,
        /// Filter by priority (comma separated)
        #[arg(short, long, value_delimiter = ',')]
        priority: Vec<String>,
        #[arg(short, long)]
        category: Option<String>,
        /// Only overdue goals
        #[arg(long)]
        overdue: bool,
        /// Only goals behind schedule
        #[arg(long)]
        behind: bool,
        /// Only goals needing attention
        #[arg(long)]
        attention: bool,
        /// Deadline on or after (YYYY-MM-DD)
        #[arg(long)]
        due_after: Option<String>,
        /// Deadline on or before (YYYY-MM-DD)
        #[arg(long)]
        due_before: Option<String>,
        /// Search name, description and notes
        #[arg(long)]
        search: Option<String>,
        /// Goals carrying any of these tags (comma separated)
        #[arg(long = "tag", value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(long, default_value = "1")]
        page: usize,
        /// Goals per page (defaults to the configured page size)
        #[arg(long)]
        limit: Option<usize>,
        /// Sort field (created_at, updated_at, deadline, name, target_amount, current_amount, priority, progress)
        #[arg(long, default_value = "created_at")]
        sort: String,
        /// Sort order (asc, desc)
        #[arg(long, default_value = "desc")]
        order: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show goal details
    Show {
        /// Goal name or ID
        goal: String,
        #[arg(long)]
        json: bool,
    },
    /// Edit a goal
    Edit {
        /// Goal name or ID
        goal: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long)]
        target: Option<String>,
        /// Overwrite the current amount (recorded in the ledger)
        #[arg(long)]
        current: Option<String>,
        #[arg(long)]
        initial: Option<String>,
        #[arg(short, long)]
        deadline: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(short, long)]
        status: Option<String>,
        #[arg(short, long)]
        priority: Option<String>,
        #[arg(short = 't', long = "type")]
        goal_type: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        /// Replace the tag set (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Remove every tag
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Turn auto-tracking on or off
        #[arg(long)]
        auto_track: Option<bool>,
        /// Tracking flags replace only the rule fields they name
        #[command(flatten)]
        tracking: TrackingArgs,
        /// Drop every tracking rule
        #[arg(
            long,
            conflicts_with_all = ["include_categories", "exclude_categories", "sources", "kinds", "from", "to"]
        )]
        clear_tracking: bool,
        /// Enable reminders at this frequency
        #[arg(long, conflicts_with = "no_remind")]
        remind: Option<String>,
        /// Disable reminders
        #[arg(long)]
        no_remind: bool,
    },
    /// Record progress (negative amounts are corrections)
    Progress {
        /// Goal name or ID
        goal: String,
        /// Amount to add, e.g. "250" or "-40.00"
        #[arg(allow_hyphen_values = true)]
        amount: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Attribution (manual, auto, milestone)
        #[arg(long, default_value = "manual")]
        source: String,
        /// Related transaction ID
        #[arg(long)]
        txn: Option<String>,
    },
    /// Delete one or more goals
    Delete {
        /// Goal names or IDs
        #[arg(required = true)]
        goals: Vec<String>,
    },
    /// Show the audit trail of a goal, its milestones and its ledger
    History {
        /// Goal name or ID
        goal: String,
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
    /// Recalculate an auto-tracked goal from transaction history
    Recalc {
        /// Goal name or ID
        goal: String,
    },
    /// Show statistics across your goals
    Stats {
        #[arg(long)]
        json: bool,
    },
}

/// Handle a goal command
pub fn handle_goal_command(ctx: &CommandContext<'_>, cmd: GoalCommands) -> StrideResult<()> {
    let service = ctx.goals();

    match cmd {
        GoalCommands::Create {
            name,
            target,
            deadline,
            goal_type,
            priority,
            status,
            initial,
            start,
            currency,
            category,
            tags,
            description,
            notes,
            auto_track,
            tracking,
            remind,
        } => {
            let mut input = NewGoal::new(name, parse_money(&target)?, parse_date(&deadline)?);
            input.goal_type = parse_choice::<GoalType>(&goal_type)?;
            input.priority = parse_choice::<GoalPriority>(&priority)?;
            input.status = parse_choice::<GoalStatus>(&status)?;
            input.initial_amount = parse_money(&initial)?;
            input.start_date = parse_optional_date(start.as_deref())?;
            input.currency = currency;
            input.category = category;
            input.tags = tags.into_iter().collect();
            input.description = description;
            input.notes = notes;
            input.auto_track = auto_track;
            input.tracking_rules = tracking.merged_with(None)?;
            if let Some(frequency) = remind {
                input.reminder_enabled = true;
                input.reminder_frequency = parse_choice::<ReminderFrequency>(&frequency)?;
            }

            let created = service.create(&ctx.user, input)?;
            let goal = &created.goal;

            println!("Created goal: {}", goal.name);
            println!(
                "  Target:   {} {}",
                goal.target_amount.format_with_symbol(ctx.symbol()),
                goal.currency
            );
            println!("  Deadline: {}", goal.deadline.format("%Y-%m-%d"));
            println!("  Status:   {}", goal.status);
            println!("  ID:       {}", goal.id);
        }

        GoalCommands::List {
            status,
            goal_type,
            priority,
            category,
            overdue,
            behind,
            attention,
            due_after,
            due_before,
            search,
            tags,
            page,
            limit,
            sort,
            order,
            json,
        } => {
            let filter = GoalFilter {
                statuses: parse_choices(&status)?,
                types: parse_choices(&goal_type)?,
                priorities: parse_choices(&priority)?,
                category,
                overdue: overdue.then_some(true),
                on_track: behind.then_some(false),
                needs_attention: attention.then_some(true),
                deadline_from: parse_optional_date(due_after.as_deref())?,
                deadline_to: parse_optional_date(due_before.as_deref())?,
                search,
                tags,
            };
            let request = PageRequest::new(page, limit.unwrap_or(ctx.settings.page_size)).sorted(
                parse_choice::<SortField>(&sort)?,
                parse_choice::<SortOrder>(&order)?,
            );

            let result = service.list(&ctx.user, &filter, &request)?;
            if json {
                print_json(&result)?;
            } else {
                print!("{}", format_goal_list(&result, ctx.symbol()));
            }
        }

        GoalCommands::Show { goal, json } => {
            let found = ctx.find_goal(&goal)?;
            let entry = service.get(&ctx.user, found.id)?;
            if json {
                print_json(&entry)?;
            } else {
                print!("{}", format_goal_details(&entry, ctx.symbol()));
            }
        }

        GoalCommands::Edit {
            goal,
            name,
            target,
            current,
            initial,
            deadline,
            start,
            status,
            priority,
            goal_type,
            currency,
            category,
            tags,
            clear_tags,
            description,
            notes,
            auto_track,
            tracking,
            clear_tracking,
            remind,
            no_remind,
        } => {
            let found = ctx.find_goal(&goal)?;

            let reminder_frequency = remind
                .as_deref()
                .map(parse_choice::<ReminderFrequency>)
                .transpose()?;
            let reminder_enabled = if no_remind {
                Some(false)
            } else {
                reminder_frequency.map(|_| true)
            };

            let patch = GoalPatch {
                name,
                description,
                goal_type: goal_type.as_deref().map(parse_choice).transpose()?,
                target_amount: target.as_deref().map(parse_money).transpose()?,
                current_amount: current.as_deref().map(parse_money).transpose()?,
                initial_amount: initial.as_deref().map(parse_money).transpose()?,
                currency,
                deadline: parse_optional_date(deadline.as_deref())?,
                start_date: parse_optional_date(start.as_deref())?,
                priority: priority.as_deref().map(parse_choice).transpose()?,
                status: status.as_deref().map(parse_choice).transpose()?,
                category,
                tags: if clear_tags {
                    Some(BTreeSet::new())
                } else {
                    (!tags.is_empty()).then(|| tags.into_iter().collect::<BTreeSet<_>>())
                },
                notes,
                auto_track,
                tracking_rules: if clear_tracking {
                    Some(TrackingRules::default())
                } else {
                    tracking.merged_with(found.tracking_rules.as_ref())?
                },
                reminder_enabled,
                reminder_frequency,
            };

            if patch.is_empty() {
                println!("No changes specified. Run 'stride goal edit --help' for options.");
                return Ok(());
            }

            let updated = service.update(&ctx.user, found.id, patch)?;
            println!("Updated goal: {}", updated.goal.name);
            println!("  Status:   {}", updated.goal.status);
            println!(
                "  Progress: {:.2}%",
                updated.metrics.progress_percentage
            );
        }

        GoalCommands::Progress {
            goal,
            amount,
            description,
            source,
            txn,
        } => {
            let found = ctx.find_goal(&goal)?;
            let delta = parse_money(&amount)?;
            let source = parse_choice::<ProgressSource>(&source)?;
            let transaction_ref = txn
                .as_deref()
                .map(|t| {
                    t.parse::<TransactionId>().map_err(|_| {
                        StrideError::Validation(format!("Invalid transaction ID: '{}'", t))
                    })
                })
                .transpose()?;

            let before_status = found.status;
            let updated = service.record_progress(
                &ctx.user,
                found.id,
                delta,
                source,
                description,
                transaction_ref,
            )?;
            let goal = &updated.goal;

            println!(
                "Recorded {} for {}",
                delta.format_with_symbol(ctx.symbol()),
                goal.name
            );
            println!(
                "  Now {} of {} ({:.2}%)",
                goal.current_amount.format_with_symbol(ctx.symbol()),
                goal.target_amount.format_with_symbol(ctx.symbol()),
                updated.metrics.progress_percentage
            );
            if goal.status != before_status {
                println!("  Status: {} -> {}", before_status, goal.status);
            }
        }

        GoalCommands::Delete { goals } => {
            let mut ids = Vec::with_capacity(goals.len());
            for identifier in &goals {
                ids.push(ctx.find_goal(identifier)?.id);
            }

            if let [id] = ids.as_slice() {
                let removed = service.delete(&ctx.user, *id)?;
                println!("Deleted goal: {}", removed.name);
            } else {
                let count = service.bulk_delete(&ctx.user, &ids)?;
                println!("Deleted {} goals", count);
            }
        }

        GoalCommands::History { goal, limit } => {
            let found = ctx.find_goal(&goal)?;
            let entries = service.history(&ctx.user, found.id, limit)?;
            print!("{}", format_history(&entries));
        }

        GoalCommands::Recalc { goal } => {
            let found = ctx.find_goal(&goal)?;
            let updated = service.recalculate_auto_progress(&ctx.user, found.id)?;
            println!(
                "Recalculated {}: {} ({:.2}%)",
                updated.goal.name,
                updated.goal.current_amount.format_with_symbol(ctx.symbol()),
                updated.metrics.progress_percentage
            );
        }

        GoalCommands::Stats { json } => {
            let stats = StatisticsService::new(ctx.storage, ctx.clock).statistics(&ctx.user)?;
            if json {
                print_json(&stats)?;
            } else {
                print!("{}", format_statistics(&stats, ctx.symbol()));
            }
        }
    }

    Ok(())
}
