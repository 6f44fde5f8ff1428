//! Goal statistics
//!
//! Read-only aggregation over every goal a user owns.

use std::collections::BTreeMap;

use chrono::Duration;
use serde::Serialize;

use crate::clock::Clock;
use crate::error::StrideResult;
use crate::models::metrics::{is_on_track, needs_attention, round2};
use crate::models::{
    GoalId, GoalPriority, GoalStatus, GoalType, GoalWithMetrics, Milestone, Money, UserId,
};
use crate::storage::Storage;

const UPCOMING_MILESTONE_LIMIT: usize = 5;
const RECENT_WINDOW_DAYS: i64 = 30;

/// An incomplete milestone with the goal it belongs to
#[derive(Debug, Clone, Serialize)]
pub struct UpcomingMilestone {
    pub goal_id: GoalId,
    pub goal_name: String,
    pub index: usize,
    pub milestone: Milestone,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalStatistics {
    pub total_goals: usize,
    pub by_status: BTreeMap<GoalStatus, usize>,
    pub by_type: BTreeMap<GoalType, usize>,
    pub by_priority: BTreeMap<GoalPriority, usize>,
    /// Sum over active goals only
    pub total_target_amount: Money,
    /// Sum over active goals only
    pub total_current_amount: Money,
    pub overall_progress: f64,
    pub on_track_count: usize,
    pub needs_attention_count: usize,
    pub upcoming_milestones: Vec<UpcomingMilestone>,
    pub recently_completed: Vec<GoalWithMetrics>,
    pub upcoming_deadlines: Vec<GoalWithMetrics>,
}

pub struct StatisticsService<'a> {
    storage: &'a Storage,
    clock: &'a dyn Clock,
}

impl<'a> StatisticsService<'a> {
    pub fn new(storage: &'a Storage, clock: &'a dyn Clock) -> Self {
        Self { storage, clock }
    }

    pub fn statistics(&self, user_id: &UserId) -> StrideResult<GoalStatistics> {
        let now = self.clock.now();
        let goals = self.storage.goals.list_for_user(user_id)?;

        let mut by_status = BTreeMap::new();
        let mut by_type = BTreeMap::new();
        let mut by_priority = BTreeMap::new();
        let mut total_target_amount = Money::zero();
        let mut total_current_amount = Money::zero();
        let mut on_track_count = 0;
        let mut needs_attention_count = 0;
        let mut upcoming_milestones = Vec::new();

        for goal in &goals {
            *by_status.entry(goal.status).or_insert(0) += 1;
            *by_type.entry(goal.goal_type).or_insert(0) += 1;
            *by_priority.entry(goal.priority).or_insert(0) += 1;

            if !goal.is_active() {
                continue;
            }

            total_target_amount += goal.target_amount;
            total_current_amount += goal.current_amount;
            if is_on_track(goal, now) {
                on_track_count += 1;
            }
            if needs_attention(goal, now) {
                needs_attention_count += 1;
            }

            upcoming_milestones.extend(
                goal.milestones
                    .iter()
                    .enumerate()
                    .filter(|(_, m)| !m.completed && m.target_date >= now)
                    .map(|(index, m)| UpcomingMilestone {
                        goal_id: goal.id,
                        goal_name: goal.name.clone(),
                        index,
                        milestone: m.clone(),
                    }),
            );
        }

        upcoming_milestones.sort_by_key(|u| u.milestone.target_date);
        upcoming_milestones.truncate(UPCOMING_MILESTONE_LIMIT);

        let overall_progress = if total_target_amount.is_positive() {
            round2(total_current_amount.as_f64() / total_target_amount.as_f64() * 100.0)
        } else {
            0.0
        };

        let window = Duration::days(RECENT_WINDOW_DAYS);

        let mut recently_completed: Vec<_> = goals
            .iter()
            .filter(|g| g.status == GoalStatus::Completed)
            .filter(|g| g.completed_date.is_some_and(|d| d <= now && now - d <= window))
            .cloned()
            .collect();
        recently_completed.sort_by(|a, b| b.completed_date.cmp(&a.completed_date));

        let mut upcoming_deadlines: Vec<_> = goals
            .iter()
            .filter(|g| g.is_active() && g.deadline >= now && g.deadline - now <= window)
            .cloned()
            .collect();
        upcoming_deadlines.sort_by_key(|g| g.deadline);

        Ok(GoalStatistics {
            total_goals: goals.len(),
            by_status,
            by_type,
            by_priority,
            total_target_amount,
            total_current_amount,
            overall_progress,
            on_track_count,
            needs_attention_count,
            upcoming_milestones,
            recently_completed: recently_completed
                .into_iter()
                .map(|g| GoalWithMetrics::new(g, now))
                .collect(),
            upcoming_deadlines: upcoming_deadlines
                .into_iter()
                .map(|g| GoalWithMetrics::new(g, now))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::paths::StridePaths;
    use crate::models::{GoalPatch, NewGoal, ProgressSource};
    use crate::services::GoalService;
    use chrono::{DateTime, TimeZone, Utc};
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap()
    }

    fn setup() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = StridePaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn input(name: &str, target: i64, days_left: i64, status: GoalStatus) -> NewGoal {
        let mut input = NewGoal::new(name, Money::from_units(target), now() + Duration::days(days_left));
        input.status = status;
        input
    }

    #[test]
    fn test_empty_statistics() {
        let (_temp_dir, storage) = setup();
        let clock = FixedClock::new(now());
        let stats = StatisticsService::new(&storage, &clock)
            .statistics(&"alice".into())
            .unwrap();

        assert_eq!(stats.total_goals, 0);
        assert_eq!(stats.overall_progress, 0.0);
        assert!(stats.upcoming_milestones.is_empty());
    }

    #[test]
    fn test_counts_and_active_totals() {
        let (_temp_dir, storage) = setup();
        let clock = FixedClock::new(now());
        let goals = GoalService::new(&storage, &clock);
        let user: UserId = "alice".into();

        let a = goals.create(&user, input("A", 1000, 200, GoalStatus::Active)).unwrap().goal.id;
        goals.create(&user, input("B", 3000, 200, GoalStatus::Active)).unwrap();
        goals.create(&user, input("C", 5000, 200, GoalStatus::Paused)).unwrap();
        goals.create(&user, input("D", 100, 200, GoalStatus::Draft)).unwrap();
        goals.create(&"bob".into(), input("E", 100, 200, GoalStatus::Active)).unwrap();

        goals
            .record_progress(&user, a, Money::from_units(1000), ProgressSource::Manual, None, None)
            .unwrap();

        let stats = StatisticsService::new(&storage, &clock).statistics(&user).unwrap();

        assert_eq!(stats.total_goals, 4);
        assert_eq!(stats.by_status.get(&GoalStatus::Completed), Some(&1));
        assert_eq!(stats.by_status.get(&GoalStatus::Active), Some(&1));
        assert_eq!(stats.by_type.get(&GoalType::Savings), Some(&4));
        // Only B is still active
        assert_eq!(stats.total_target_amount, Money::from_units(3000));
        assert_eq!(stats.total_current_amount, Money::zero());
        assert_eq!(stats.overall_progress, 0.0);
        assert_eq!(stats.recently_completed.len(), 1);
        assert_eq!(stats.recently_completed[0].goal.name, "A");
    }

    #[test]
    fn test_upcoming_milestones_top_five() {
        let (_temp_dir, storage) = setup();
        let clock = FixedClock::new(now());
        let user: UserId = "alice".into();

        let mut active = input("Active", 10_000, 300, GoalStatus::Active);
        for days in [50, 10, 40, 20, 60, 30, -5] {
            active.milestones.push(Milestone::new(
                format!("m{}", days),
                Money::from_units(9_000),
                now() + Duration::days(days),
            ));
        }
        let mut paused = input("Paused", 10_000, 300, GoalStatus::Paused);
        paused
            .milestones
            .push(Milestone::new("hidden", Money::from_units(1), now() + Duration::days(1)));

        let goals = GoalService::new(&storage, &clock);
        goals.create(&user, active).unwrap();
        goals.create(&user, paused).unwrap();

        let stats = StatisticsService::new(&storage, &clock).statistics(&user).unwrap();
        let names: Vec<_> = stats
            .upcoming_milestones
            .iter()
            .map(|u| u.milestone.name.as_str())
            .collect();
        assert_eq!(names, vec!["m10", "m20", "m30", "m40", "m50"]);
    }

    #[test]
    fn test_upcoming_deadlines_and_attention() {
        let (_temp_dir, storage) = setup();
        let clock = FixedClock::new(now());
        let goals = GoalService::new(&storage, &clock);
        let user: UserId = "alice".into();

        goals.create(&user, input("Soon", 100, 20, GoalStatus::Active)).unwrap();
        goals.create(&user, input("Sooner", 100, 5, GoalStatus::Active)).unwrap();
        goals.create(&user, input("Far", 100, 90, GoalStatus::Active)).unwrap();
        let late = goals.create(&user, input("Late", 100, 90, GoalStatus::Active)).unwrap().goal.id;
        goals.create(&user, input("Parked", 100, 3, GoalStatus::Paused)).unwrap();

        // Make "Late" overdue by moving its window into the past
        goals
            .update(
                &user,
                late,
                GoalPatch {
                    start_date: Some(now() - Duration::days(60)),
                    deadline: Some(now() - Duration::days(1)),
                    ..Default::default()
                },
            )
            .unwrap();

        let stats = StatisticsService::new(&storage, &clock).statistics(&user).unwrap();
        let names: Vec<_> = stats
            .upcoming_deadlines
            .iter()
            .map(|g| g.goal.name.as_str())
            .collect();
        assert_eq!(names, vec!["Sooner", "Soon"]);

        assert_eq!(stats.needs_attention_count, 1);
        assert_eq!(stats.on_track_count, 3);
    }
}
