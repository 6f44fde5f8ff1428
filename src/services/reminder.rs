//! Reminder scheduling
//!
//! Finding due reminders is a pure read; sending one is recorded separately
//! with [`ReminderService::mark_reminder_sent`].

use crate::audit::AuditTarget;
use crate::clock::Clock;
use crate::error::{StrideError, StrideResult};
use crate::models::{GoalId, GoalWithMetrics, UserId};
use crate::storage::Storage;

pub struct ReminderService<'a> {
    storage: &'a Storage,
    clock: &'a dyn Clock,
}

impl<'a> ReminderService<'a> {
    pub fn new(storage: &'a Storage, clock: &'a dyn Clock) -> Self {
        Self { storage, clock }
    }

    /// Active goals with reminders enabled whose cadence has elapsed.
    /// `None` scans every user's goals.
    pub fn goals_needing_reminders(
        &self,
        user_id: Option<&UserId>,
    ) -> StrideResult<Vec<GoalWithMetrics>> {
        let now = self.clock.now();
        let goals = match user_id {
            Some(user_id) => self.storage.goals.list_for_user(user_id)?,
            None => self.storage.goals.list_all()?,
        };

        Ok(goals
            .into_iter()
            .filter(|g| g.reminder_due(now))
            .map(|g| GoalWithMetrics::new(g, now))
            .collect())
    }

    /// Stamp `last_reminder_sent` with the current time
    pub fn mark_reminder_sent(&self, goal_id: GoalId) -> StrideResult<GoalWithMetrics> {
        let now = self.clock.now();
        let mut goal = self
            .storage
            .goals
            .get(goal_id)?
            .ok_or_else(|| StrideError::goal_not_found(goal_id.to_string()))?;

        let before = goal.clone();
        goal.last_reminder_sent = Some(now);
        goal.updated_at = now;

        self.storage.goals.upsert(goal.clone())?;
        self.storage.goals.save()?;

        self.storage.log_update(
            now,
            AuditTarget::goal(&goal),
            &before,
            &goal,
            Some("reminder sent".to_string()),
        )?;

        tracing::debug!(goal_id = %goal.id, "reminder marked as sent");

        Ok(GoalWithMetrics::new(goal, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::paths::StridePaths;
    use crate::models::{GoalStatus, Money, NewGoal, ReminderFrequency};
    use crate::services::GoalService;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 8, 0, 0).unwrap()
    }

    fn setup() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = StridePaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn reminded(name: &str, frequency: ReminderFrequency, status: GoalStatus) -> NewGoal {
        let mut input = NewGoal::new(name, Money::from_units(100), now() + Duration::days(365));
        input.status = status;
        input.reminder_enabled = true;
        input.reminder_frequency = frequency;
        input
    }

    #[test]
    fn test_never_sent_is_due() {
        let (_temp_dir, storage) = setup();
        let clock = FixedClock::new(now());
        let goals = GoalService::new(&storage, &clock);
        let user: UserId = "alice".into();

        goals
            .create(&user, reminded("Weekly", ReminderFrequency::Weekly, GoalStatus::Active))
            .unwrap();
        goals
            .create(&user, reminded("Paused", ReminderFrequency::Daily, GoalStatus::Paused))
            .unwrap();
        let mut quiet = reminded("Quiet", ReminderFrequency::Daily, GoalStatus::Active);
        quiet.reminder_enabled = false;
        goals.create(&user, quiet).unwrap();

        let due = ReminderService::new(&storage, &clock)
            .goals_needing_reminders(Some(&user))
            .unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].goal.name, "Weekly");
    }

    #[test]
    fn test_mark_sent_resets_cadence() {
        let (_temp_dir, storage) = setup();
        let clock = FixedClock::new(now());
        let user: UserId = "alice".into();
        let id = GoalService::new(&storage, &clock)
            .create(&user, reminded("Bi", ReminderFrequency::BiWeekly, GoalStatus::Active))
            .unwrap()
            .goal
            .id;

        let service = ReminderService::new(&storage, &clock);
        let marked = service.mark_reminder_sent(id).unwrap();
        assert_eq!(marked.goal.last_reminder_sent, Some(now()));
        assert!(service.goals_needing_reminders(Some(&user)).unwrap().is_empty());

        let later = FixedClock::new(now() + Duration::days(13));
        assert!(ReminderService::new(&storage, &later)
            .goals_needing_reminders(Some(&user))
            .unwrap()
            .is_empty());

        let later = FixedClock::new(now() + Duration::days(14));
        assert_eq!(
            ReminderService::new(&storage, &later)
                .goals_needing_reminders(Some(&user))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_scan_across_users() {
        let (_temp_dir, storage) = setup();
        let clock = FixedClock::new(now());
        let goals = GoalService::new(&storage, &clock);

        goals
            .create(&"alice".into(), reminded("A", ReminderFrequency::Monthly, GoalStatus::Active))
            .unwrap();
        goals
            .create(&"bob".into(), reminded("B", ReminderFrequency::Monthly, GoalStatus::Active))
            .unwrap();

        let service = ReminderService::new(&storage, &clock);
        assert_eq!(service.goals_needing_reminders(None).unwrap().len(), 2);
        assert_eq!(
            service
                .goals_needing_reminders(Some(&"bob".into()))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_mark_unknown_goal() {
        let (_temp_dir, storage) = setup();
        let clock = FixedClock::new(now());
        let err = ReminderService::new(&storage, &clock)
            .mark_reminder_sent(GoalId::new())
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
