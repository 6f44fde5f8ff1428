//! Goal display formatting
//!
//! Formats goals, milestones and statistics for terminal output in table and
//! detail views.

use crate::audit::AuditEntry;
use crate::models::{GoalWithMetrics, Milestone, Money};
use crate::services::{GoalPage, GoalStatistics};

/// Format a page of goals as a table
pub fn format_goal_list(page: &GoalPage, symbol: &str) -> String {
    if page.goals.is_empty() {
        return "No goals found.\n".to_string();
    }

    let name_width = page
        .goals
        .iter()
        .map(|g| g.goal.name.chars().count())
        .max()
        .unwrap_or(4)
        .clamp(4, 30);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<13}  {:<name_width$}  {:<9}  {:>12}  {:>12}  {:>7}  {:<10}  {}\n",
        "ID",
        "Name",
        "Status",
        "Current",
        "Target",
        "Pct",
        "Deadline",
        "Flags",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<13}  {:-<name_width$}  {:-<9}  {:->12}  {:->12}  {:->7}  {:-<10}  {:-<5}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for entry in &page.goals {
        let goal = &entry.goal;
        output.push_str(&format!(
            "{:<13}  {:<name_width$}  {:<9}  {:>12}  {:>12}  {:>6.2}%  {:<10}  {}\n",
            goal.id.short(),
            truncate(&goal.name, name_width),
            goal.status,
            goal.current_amount.format_with_symbol(symbol),
            goal.target_amount.format_with_symbol(symbol),
            entry.metrics.progress_percentage,
            goal.deadline.format("%Y-%m-%d"),
            flags(entry),
            name_width = name_width,
        ));
    }

    output.push_str(&format!(
        "\nPage {} of {} ({} goals)\n",
        page.page,
        page.total_pages.max(1),
        page.total
    ));

    output
}

/// Short attention markers for the list view
fn flags(entry: &GoalWithMetrics) -> String {
    let mut flags = Vec::new();
    if entry.metrics.is_overdue {
        flags.push("OVERDUE");
    }
    if !entry.metrics.is_on_track {
        flags.push("behind");
    }
    if entry.metrics.needs_attention {
        flags.push("!");
    }
    flags.join(" ")
}

/// Format a single goal's details
pub fn format_goal_details(entry: &GoalWithMetrics, symbol: &str) -> String {
    let goal = &entry.goal;
    let metrics = &entry.metrics;
    let money = |m: Money| m.format_with_symbol(symbol);

    let mut output = String::new();

    output.push_str(&format!("Goal: {}\n", goal.name));
    output.push_str(&format!("  ID:        {}\n", goal.id));
    output.push_str(&format!("  Type:      {}\n", goal.goal_type));
    output.push_str(&format!("  Status:    {}\n", goal.status));
    output.push_str(&format!("  Priority:  {}\n", goal.priority));
    if let Some(category) = &goal.category {
        output.push_str(&format!("  Category:  {}\n", category));
    }
    if !goal.tags.is_empty() {
        let tags: Vec<&str> = goal.tags.iter().map(String::as_str).collect();
        output.push_str(&format!("  Tags:      {}\n", tags.join(", ")));
    }
    if let Some(description) = &goal.description {
        output.push_str(&format!("  About:     {}\n", description));
    }

    output.push('\n');
    output.push_str(&format!(
        "  Progress:  {} / {} {} ({:.2}%)\n",
        money(goal.current_amount),
        money(goal.target_amount),
        goal.currency,
        metrics.progress_percentage
    ));
    if !goal.initial_amount.is_zero() {
        output.push_str(&format!("  Baseline:  {}\n", money(goal.initial_amount)));
    }
    output.push_str(&format!(
        "  Window:    {} -> {} ({} days remaining)\n",
        goal.start_date.format("%Y-%m-%d"),
        goal.deadline.format("%Y-%m-%d"),
        metrics.days_remaining
    ));
    output.push_str(&format!(
        "  On track:  {}{}\n",
        if metrics.is_on_track { "Yes" } else { "No" },
        if metrics.is_overdue { " (overdue)" } else { "" }
    ));
    if metrics.required_monthly_savings.is_positive() {
        output.push_str(&format!(
            "  Needed:    {} per month\n",
            money(metrics.required_monthly_savings)
        ));
    }
    if metrics.needs_attention {
        output.push_str("  Attention: this goal needs attention\n");
    }

    if let Some(next) = &metrics.next_milestone {
        output.push_str(&format!(
            "  Next:      {} ({} by {})\n",
            next.name,
            money(next.target_amount),
            next.target_date.format("%Y-%m-%d")
        ));
    }

    if goal.auto_track {
        output.push('\n');
        output.push_str("  Auto-tracking: enabled\n");
        if let Some(at) = goal.last_calculated_at {
            output.push_str(&format!(
                "  Last calculated: {}\n",
                at.format("%Y-%m-%d %H:%M UTC")
            ));
        }
    }

    if goal.reminder_enabled {
        output.push_str(&format!("  Reminders: {}\n", goal.reminder_frequency));
    }

    if !goal.milestones.is_empty() {
        output.push('\n');
        output.push_str(&format_milestone_list(
            &goal.milestones.iter().cloned().enumerate().collect::<Vec<_>>(),
            symbol,
        ));
    }

    if !goal.progress_history.is_empty() {
        output.push('\n');
        output.push_str("  Recent progress:\n");
        for entry in goal.progress_history.iter().rev().take(5) {
            output.push_str(&format!(
                "    {}  {:>12}  {:<9}  {}\n",
                entry.date.format("%Y-%m-%d"),
                money(entry.amount),
                entry.source,
                entry.description.as_deref().unwrap_or("")
            ));
        }
    }

    if let Some(notes) = &goal.notes {
        output.push('\n');
        output.push_str(&format!("  Notes: {}\n", notes));
    }

    output.push('\n');
    output.push_str(&format!(
        "  Created:  {}\n",
        goal.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output.push_str(&format!(
        "  Modified: {}\n",
        goal.updated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    output
}

/// Format indexed milestones
pub fn format_milestone_list(milestones: &[(usize, Milestone)], symbol: &str) -> String {
    if milestones.is_empty() {
        return "No milestones.\n".to_string();
    }

    let mut output = String::from("  Milestones:\n");
    for (index, milestone) in milestones {
        let mark = if milestone.completed { "x" } else { " " };
        output.push_str(&format!(
            "    [{}] {:>2}. {:<24} {:>12}  by {}\n",
            mark,
            index,
            truncate(&milestone.name, 24),
            milestone.target_amount.format_with_symbol(symbol),
            milestone.target_date.format("%Y-%m-%d")
        ));
    }
    output
}

/// Format aggregate statistics
pub fn format_statistics(stats: &GoalStatistics, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Goals: {}\n", stats.total_goals));
    for (status, count) in &stats.by_status {
        output.push_str(&format!("  {:<10} {}\n", status.to_string(), count));
    }

    output.push('\n');
    output.push_str(&format!(
        "Active totals: {} of {} ({:.2}%)\n",
        stats.total_current_amount.format_with_symbol(symbol),
        stats.total_target_amount.format_with_symbol(symbol),
        stats.overall_progress
    ));
    output.push_str(&format!("  On track:        {}\n", stats.on_track_count));
    output.push_str(&format!("  Need attention:  {}\n", stats.needs_attention_count));

    if !stats.upcoming_milestones.is_empty() {
        output.push_str("\nUpcoming milestones:\n");
        for upcoming in &stats.upcoming_milestones {
            output.push_str(&format!(
                "  {}  {} / {}\n",
                upcoming.milestone.target_date.format("%Y-%m-%d"),
                upcoming.goal_name,
                upcoming.milestone.name
            ));
        }
    }

    if !stats.upcoming_deadlines.is_empty() {
        output.push_str("\nDeadlines in the next 30 days:\n");
        for entry in &stats.upcoming_deadlines {
            output.push_str(&format!(
                "  {}  {} ({:.2}%)\n",
                entry.goal.deadline.format("%Y-%m-%d"),
                entry.goal.name,
                entry.metrics.progress_percentage
            ));
        }
    }

    if !stats.recently_completed.is_empty() {
        output.push_str("\nCompleted in the last 30 days:\n");
        for entry in &stats.recently_completed {
            output.push_str(&format!("  {}\n", entry.goal.name));
        }
    }

    output
}

/// Format goals with a reminder due
pub fn format_reminders(goals: &[GoalWithMetrics], symbol: &str) -> String {
    if goals.is_empty() {
        return "No reminders due.\n".to_string();
    }

    let mut output = String::new();
    for entry in goals {
        output.push_str(&format!(
            "{}  {}  {:.2}% ({} needed per month)\n",
            entry.goal.id.short(),
            entry.goal.name,
            entry.metrics.progress_percentage,
            entry.metrics.required_monthly_savings.format_with_symbol(symbol)
        ));
    }
    output
}

/// Format a goal's audit trail
pub fn format_history(entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return "No history recorded.\n".to_string();
    }

    let mut output = String::new();
    for entry in entries {
        output.push_str(&entry.format_human_readable());
        output.push('\n');
    }
    output
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
