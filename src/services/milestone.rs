//! Milestone service
//!
//! Milestones are addressed by their position in the goal's list. Deleting
//! one shifts every later index down, so callers must re-list before reusing
//! an index.

use crate::audit::AuditTarget;
use crate::clock::Clock;
use crate::error::{StrideError, StrideResult};
use crate::models::{Goal, GoalId, GoalWithMetrics, Milestone, MilestonePatch, UserId};
use crate::storage::Storage;

use super::goal::GoalService;

pub struct MilestoneService<'a> {
    storage: &'a Storage,
    clock: &'a dyn Clock,
}

impl<'a> MilestoneService<'a> {
    pub fn new(storage: &'a Storage, clock: &'a dyn Clock) -> Self {
        Self { storage, clock }
    }

    fn load(&self, user_id: &UserId, goal_id: GoalId) -> StrideResult<Goal> {
        GoalService::new(self.storage, self.clock).load(user_id, goal_id)
    }

    fn persist(&self, goal: &Goal) -> StrideResult<()> {
        self.storage.goals.upsert(goal.clone())?;
        self.storage.goals.save()
    }

    fn check_index(goal: &Goal, index: usize) -> StrideResult<()> {
        if index >= goal.milestones.len() {
            return Err(StrideError::OutOfRange {
                index,
                len: goal.milestones.len(),
            });
        }
        Ok(())
    }

    /// Milestones of a goal with their current indices
    pub fn list(&self, user_id: &UserId, goal_id: GoalId) -> StrideResult<Vec<(usize, Milestone)>> {
        let goal = self.load(user_id, goal_id)?;
        Ok(goal.milestones.into_iter().enumerate().collect())
    }

    /// The incomplete milestone due soonest
    pub fn next(&self, user_id: &UserId, goal_id: GoalId) -> StrideResult<Option<Milestone>> {
        let goal = self.load(user_id, goal_id)?;
        Ok(goal.next_milestone().cloned())
    }

    /// Append a milestone
    pub fn add(
        &self,
        user_id: &UserId,
        goal_id: GoalId,
        milestone: Milestone,
    ) -> StrideResult<GoalWithMetrics> {
        let now = self.clock.now();
        milestone
            .validate()
            .map_err(|e| StrideError::Validation(e.to_string()))?;

        let mut goal = self.load(user_id, goal_id)?;
        goal.milestones.push(milestone);
        goal.updated_at = now;
        self.persist(&goal)?;

        let index = goal.milestones.len() - 1;
        self.storage.log_create(
            now,
            AuditTarget::milestone(&goal, index, &goal.milestones[index].name),
            &goal.milestones[index],
        )?;

        tracing::info!(goal_id = %goal.id, index, "milestone added");

        Ok(GoalWithMetrics::new(goal, now))
    }

    /// Merge a patch into the milestone at `index`
    pub fn update(
        &self,
        user_id: &UserId,
        goal_id: GoalId,
        index: usize,
        patch: MilestonePatch,
    ) -> StrideResult<GoalWithMetrics> {
        let now = self.clock.now();
        let mut goal = self.load(user_id, goal_id)?;
        Self::check_index(&goal, index)?;

        let before = goal.milestones[index].clone();
        let milestone = &mut goal.milestones[index];
        milestone.apply(patch, now);
        milestone
            .validate()
            .map_err(|e| StrideError::Validation(e.to_string()))?;

        goal.updated_at = now;
        self.persist(&goal)?;

        self.storage.log_update(
            now,
            AuditTarget::milestone(&goal, index, &goal.milestones[index].name),
            &before,
            &goal.milestones[index],
            None,
        )?;

        Ok(GoalWithMetrics::new(goal, now))
    }

    /// Remove the milestone at `index`
    pub fn delete(
        &self,
        user_id: &UserId,
        goal_id: GoalId,
        index: usize,
    ) -> StrideResult<(GoalWithMetrics, Milestone)> {
        let now = self.clock.now();
        let mut goal = self.load(user_id, goal_id)?;

        let removed = goal.remove_milestone(index).ok_or(StrideError::OutOfRange {
            index,
            len: goal.milestones.len(),
        })?;
        goal.updated_at = now;
        self.persist(&goal)?;

        self.storage.log_delete(
            now,
            AuditTarget::milestone(&goal, index, &removed.name),
            &removed,
        )?;

        tracing::info!(goal_id = %goal.id, index, "milestone removed");

        Ok((GoalWithMetrics::new(goal, now), removed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::paths::StridePaths;
    use crate::models::{GoalStatus, Money, NewGoal, ProgressSource};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap()
    }

    fn setup() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = StridePaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn create_goal(storage: &Storage, clock: &FixedClock) -> GoalId {
        let mut input = NewGoal::new("Trip", Money::from_units(1000), now() + Duration::days(90));
        input.status = GoalStatus::Active;
        GoalService::new(storage, clock)
            .create(&"alice".into(), input)
            .unwrap()
            .goal
            .id
    }

    fn milestone(name: &str, units: i64, days: i64) -> Milestone {
        Milestone::new(name, Money::from_units(units), now() + Duration::days(days))
    }

    #[test]
    fn test_add_and_list() {
        let (_temp_dir, storage) = setup();
        let clock = FixedClock::new(now());
        let id = create_goal(&storage, &clock);
        let service = MilestoneService::new(&storage, &clock);
        let user: UserId = "alice".into();

        service.add(&user, id, milestone("Flights", 400, 30)).unwrap();
        // Duplicate names are allowed
        service.add(&user, id, milestone("Flights", 500, 40)).unwrap();

        let listed = service.list(&user, id).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].0, 1);
        assert_eq!(listed[1].1.target_amount, Money::from_units(500));
    }

    #[test]
    fn test_add_rejects_invalid_milestone() {
        let (_temp_dir, storage) = setup();
        let clock = FixedClock::new(now());
        let id = create_goal(&storage, &clock);
        let service = MilestoneService::new(&storage, &clock);

        let err = service
            .add(&"alice".into(), id, milestone(" ", 10, 5))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_update_milestone_out_of_range() {
        let (_temp_dir, storage) = setup();
        let clock = FixedClock::new(now());
        let id = create_goal(&storage, &clock);
        let service = MilestoneService::new(&storage, &clock);
        let user: UserId = "alice".into();

        service.add(&user, id, milestone("One", 100, 10)).unwrap();
        service.add(&user, id, milestone("Two", 200, 20)).unwrap();

        let err = service
            .update(&user, id, 5, MilestonePatch::default())
            .unwrap_err();
        assert!(matches!(err, StrideError::OutOfRange { index: 5, len: 2 }));

        let err = service.delete(&user, id, 2).unwrap_err();
        assert!(err.is_out_of_range());
    }

    #[test]
    fn test_missing_goal_is_not_found_before_index_check() {
        let (_temp_dir, storage) = setup();
        let clock = FixedClock::new(now());
        let service = MilestoneService::new(&storage, &clock);

        let err = service
            .update(&"alice".into(), GoalId::new(), 0, MilestonePatch::default())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_shifts_indices() {
        let (_temp_dir, storage) = setup();
        let clock = FixedClock::new(now());
        let id = create_goal(&storage, &clock);
        let service = MilestoneService::new(&storage, &clock);
        let user: UserId = "alice".into();

        for (name, days) in [("a", 10), ("b", 20), ("c", 30)] {
            service.add(&user, id, milestone(name, 100, days)).unwrap();
        }

        let (_, removed) = service.delete(&user, id, 0).unwrap();
        assert_eq!(removed.name, "a");

        let listed = service.list(&user, id).unwrap();
        assert_eq!(listed[0], (0, milestone("b", 100, 20)));
        assert_eq!(listed[1].1.name, "c");
    }

    #[test]
    fn test_manual_reopen_sticks_until_next_progress() {
        let (_temp_dir, storage) = setup();
        let clock = FixedClock::new(now());
        let id = create_goal(&storage, &clock);
        let service = MilestoneService::new(&storage, &clock);
        let goals = GoalService::new(&storage, &clock);
        let user: UserId = "alice".into();

        service.add(&user, id, milestone("Half", 500, 30)).unwrap();
        goals
            .record_progress(&user, id, Money::from_units(600), ProgressSource::Manual, None, None)
            .unwrap();

        let reopened = service
            .update(
                &user,
                id,
                0,
                MilestonePatch {
                    completed: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!reopened.goal.milestones[0].completed);
        assert!(reopened.goal.milestones[0].completed_date.is_none());

        // The next ledger write re-evaluates it
        let goal = goals
            .record_progress(&user, id, Money::from_units(1), ProgressSource::Manual, None, None)
            .unwrap()
            .goal;
        assert!(goal.milestones[0].completed);
    }

    #[test]
    fn test_next_milestone() {
        let (_temp_dir, storage) = setup();
        let clock = FixedClock::new(now());
        let id = create_goal(&storage, &clock);
        let service = MilestoneService::new(&storage, &clock);
        let user: UserId = "alice".into();

        assert!(service.next(&user, id).unwrap().is_none());

        service.add(&user, id, milestone("later", 800, 60)).unwrap();
        service.add(&user, id, milestone("sooner", 300, 15)).unwrap();
        assert_eq!(service.next(&user, id).unwrap().unwrap().name, "sooner");
    }
}
