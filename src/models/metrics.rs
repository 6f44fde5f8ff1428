//! Derived goal metrics
//!
//! Pure functions of a goal and an instant. Nothing here is persisted; every
//! read path (single goal, listing, statistics) calls these same functions.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::goal::Goal;
use super::milestone::Milestone;
use super::money::Money;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Fraction of expected progress a goal may fall behind and still be on track
const ON_TRACK_TOLERANCE: f64 = 0.9;

/// Metrics computed for a goal at read time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalMetrics {
    pub progress_percentage: f64,
    pub days_remaining: i64,
    pub is_overdue: bool,
    pub is_on_track: bool,
    pub required_monthly_savings: Money,
    pub needs_attention: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_milestone: Option<Milestone>,
}

impl GoalMetrics {
    pub fn compute(goal: &Goal, now: DateTime<Utc>) -> Self {
        Self {
            progress_percentage: progress_percentage(goal),
            days_remaining: days_remaining(goal, now),
            is_overdue: is_overdue(goal, now),
            is_on_track: is_on_track(goal, now),
            required_monthly_savings: required_monthly_savings(goal, now),
            needs_attention: needs_attention(goal, now),
            next_milestone: goal.next_milestone().cloned(),
        }
    }
}

/// A goal together with its metrics as of the read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalWithMetrics {
    #[serde(flatten)]
    pub goal: Goal,
    pub metrics: GoalMetrics,
}

impl GoalWithMetrics {
    pub fn new(goal: Goal, now: DateTime<Utc>) -> Self {
        let metrics = GoalMetrics::compute(&goal, now);
        Self { goal, metrics }
    }
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Progress made since the goal's baseline, as 0–100
pub fn progress_percentage(goal: &Goal) -> f64 {
    if !goal.target_amount.is_positive() {
        return 0.0;
    }
    let effective_target = goal.target_amount - goal.initial_amount;
    if !effective_target.is_positive() {
        return 100.0;
    }
    let gained = goal.current_amount - goal.initial_amount;
    round2(gained.as_f64() / effective_target.as_f64() * 100.0).clamp(0.0, 100.0)
}

/// Whole days until the deadline, rounded up; negative once overdue
pub fn days_remaining(goal: &Goal, now: DateTime<Utc>) -> i64 {
    let millis = (goal.deadline - now).num_milliseconds() as f64;
    (millis / MILLIS_PER_DAY).ceil() as i64
}

pub fn is_overdue(goal: &Goal, now: DateTime<Utc>) -> bool {
    goal.is_active() && now > goal.deadline
}

/// Share of the planned window that has elapsed, as a percentage.
/// Not clamped: past the deadline it exceeds 100.
pub fn expected_progress(goal: &Goal, now: DateTime<Utc>) -> f64 {
    let window = (goal.deadline - goal.start_date).num_milliseconds();
    if window <= 0 {
        return 100.0;
    }
    let elapsed = (now - goal.start_date).num_milliseconds();
    elapsed as f64 / window as f64 * 100.0
}

pub fn is_on_track(goal: &Goal, now: DateTime<Utc>) -> bool {
    if !goal.is_active() {
        return true;
    }
    progress_percentage(goal) >= expected_progress(goal, now) * ON_TRACK_TOLERANCE
}

/// Calendar-month distance between two instants, ignoring the day of month
pub fn calendar_months_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let years = i64::from(to.year() - from.year());
    let months = i64::from(to.month()) - i64::from(from.month());
    years * 12 + months
}

/// Amount that must be banked each month to hit the target by the deadline
pub fn required_monthly_savings(goal: &Goal, now: DateTime<Utc>) -> Money {
    if !goal.is_active() {
        return Money::zero();
    }
    let months = calendar_months_between(now, goal.deadline).max(1);
    let remaining = (goal.target_amount - goal.current_amount).non_negative();
    remaining.split_evenly(months as u32)
}

pub fn needs_attention(goal: &Goal, now: DateTime<Utc>) -> bool {
    if !goal.is_active() {
        return false;
    }
    if is_overdue(goal, now) {
        return true;
    }
    if goal.priority.is_urgent() && progress_percentage(goal) < 50.0 && days_remaining(goal, now) < 30
    {
        return true;
    }
    if !is_on_track(goal, now) {
        return true;
    }
    goal.next_milestone().is_some_and(|m| m.is_lapsed(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GoalPriority, GoalStatus, NewGoal, ProgressSource};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap()
    }

    /// Active goal whose planned window is centred on `now()`
    fn goal(target: i64, current: i64, days_total: i64, days_left: i64) -> Goal {
        let deadline = now() + Duration::days(days_left);
        let mut input = NewGoal::new("Test", Money::from_units(target), deadline);
        input.start_date = Some(deadline - Duration::days(days_total));
        input.status = GoalStatus::Active;
        let mut goal = Goal::new("u".into(), input, "USD", now());
        goal.current_amount = Money::from_units(current);
        goal
    }

    #[test]
    fn test_progress_percentage() {
        assert_eq!(progress_percentage(&goal(1000, 300, 100, 50)), 30.0);
        assert_eq!(progress_percentage(&goal(3, 1, 100, 50)), 33.33);
        assert_eq!(progress_percentage(&goal(1000, 1500, 100, 50)), 100.0);
    }

    #[test]
    fn test_progress_percentage_uses_baseline() {
        let mut g = goal(1000, 600, 100, 50);
        g.initial_amount = Money::from_units(200);
        assert_eq!(progress_percentage(&g), 50.0);

        // Corrected below the baseline
        g.current_amount = Money::from_units(100);
        assert_eq!(progress_percentage(&g), 0.0);

        // Baseline already meets the target
        g.initial_amount = Money::from_units(1000);
        assert_eq!(progress_percentage(&g), 100.0);
    }

    #[test]
    fn test_progress_percentage_bounds_over_many_states() {
        for target in [1, 7, 100, 2500] {
            for current in [0, 1, 50, 99, 2500, 9999] {
                for initial in [0, 3, 100, 5000] {
                    let mut g = goal(target, current, 10, 5);
                    g.initial_amount = Money::from_units(initial);
                    let pct = progress_percentage(&g);
                    assert!((0.0..=100.0).contains(&pct), "{} out of bounds", pct);
                }
            }
        }
    }

    #[test]
    fn test_days_remaining_rounds_up_and_goes_negative() {
        let mut g = goal(1000, 0, 100, 10);
        assert_eq!(days_remaining(&g, now()), 10);

        g.deadline = now() + Duration::hours(1);
        assert_eq!(days_remaining(&g, now()), 1);

        g.deadline = now() - Duration::hours(36);
        assert_eq!(days_remaining(&g, now()), -1);
    }

    #[test]
    fn test_overdue_only_when_active() {
        let mut g = goal(1000, 0, 100, -1);
        assert!(is_overdue(&g, now()));
        g.status = GoalStatus::Paused;
        assert!(!is_overdue(&g, now()));
    }

    #[test]
    fn test_on_track_with_grace() {
        // Halfway through the window: expected 50, threshold 45
        assert!(is_on_track(&goal(1000, 450, 100, 50), now()));
        assert!(!is_on_track(&goal(1000, 440, 100, 50), now()));

        let mut behind = goal(1000, 0, 100, 50);
        behind.status = GoalStatus::Completed;
        assert!(is_on_track(&behind, now()));
    }

    #[test]
    fn test_required_monthly_savings() {
        let mut g = goal(1000, 400, 200, 0);
        g.deadline = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        // March -> June is 3 calendar months
        assert_eq!(required_monthly_savings(&g, now()), Money::from_units(200));

        // Same month: at least one
        g.deadline = Utc.with_ymd_and_hms(2025, 3, 30, 0, 0, 0).unwrap();
        assert_eq!(required_monthly_savings(&g, now()), Money::from_units(600));

        g.current_amount = Money::from_units(1200);
        assert_eq!(required_monthly_savings(&g, now()), Money::zero());

        g.status = GoalStatus::Paused;
        g.current_amount = Money::zero();
        assert_eq!(required_monthly_savings(&g, now()), Money::zero());
    }

    #[test]
    fn test_required_monthly_savings_rounds_to_cent() {
        let mut g = goal(100, 0, 200, 0);
        g.deadline = Utc.with_ymd_and_hms(2025, 6, 20, 0, 0, 0).unwrap();
        assert_eq!(required_monthly_savings(&g, now()).cents(), 3333);
    }

    #[test]
    fn test_critical_goal_near_deadline_needs_attention() {
        // 20% done with 10 days left; window mostly unused so on-track alone
        // would not flag it
        let mut g = goal(1000, 200, 12, 10);
        g.priority = GoalPriority::Critical;
        assert_eq!(days_remaining(&g, now()), 10);
        assert!(is_on_track(&g, now()));
        assert!(needs_attention(&g, now()));

        g.priority = GoalPriority::Low;
        assert!(!needs_attention(&g, now()));
    }

    #[test]
    fn test_lapsed_milestone_needs_attention() {
        let mut g = goal(1000, 500, 100, 50);
        assert!(!needs_attention(&g, now()));

        g.milestones.push(crate::models::Milestone::new(
            "overdue step",
            Money::from_units(800),
            now() - Duration::days(1),
        ));
        assert!(needs_attention(&g, now()));

        g.status = GoalStatus::Paused;
        assert!(!needs_attention(&g, now()));
    }

    #[test]
    fn test_metrics_are_stable_across_reads() {
        let mut g = goal(1000, 0, 100, 50);
        g.record_progress(Money::from_units(123), ProgressSource::Manual, None, None, now());

        let first = GoalMetrics::compute(&g, now());
        let second = GoalMetrics::compute(&g, now());
        assert_eq!(first, second);
    }

    #[test]
    fn test_goal_with_metrics_flattens() {
        let g = goal(1000, 250, 100, 50);
        let json = serde_json::to_value(GoalWithMetrics::new(g, now())).unwrap();
        assert_eq!(json["name"], "Test");
        assert_eq!(json["metrics"]["progress_percentage"], 25.0);
    }
}
