//! Goal repository for JSON storage
//!
//! Goals are stored whole, milestones and progress history embedded, in a
//! single `goals.json` document. Deleting a goal deletes everything it owns.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::StrideError;
use crate::models::{Goal, GoalId, UserId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct GoalData {
    #[serde(default)]
    goals: Vec<Goal>,
}

/// Repository for goal aggregates
pub struct GoalRepository {
    path: PathBuf,
    goals: RwLock<HashMap<GoalId, Goal>>,
}

impl GoalRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            goals: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<GoalId, Goal>>, StrideError> {
        self.goals
            .read()
            .map_err(|e| StrideError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<GoalId, Goal>>, StrideError> {
        self.goals
            .write()
            .map_err(|e| StrideError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load goals from disk, replacing what is in memory
    pub fn load(&self) -> Result<(), StrideError> {
        let file_data: GoalData = read_json(&self.path)?;

        let mut goals = self.write()?;
        goals.clear();
        for goal in file_data.goals {
            goals.insert(goal.id, goal);
        }

        Ok(())
    }

    /// Save all goals to disk
    pub fn save(&self) -> Result<(), StrideError> {
        let goals = self.read()?;

        let mut list: Vec<_> = goals.values().cloned().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        write_json_atomic(&self.path, &GoalData { goals: list })
    }

    /// Get a goal by id regardless of owner
    pub fn get(&self, id: GoalId) -> Result<Option<Goal>, StrideError> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// Get a goal by id, only if `user_id` owns it
    pub fn get_owned(&self, user_id: &UserId, id: GoalId) -> Result<Option<Goal>, StrideError> {
        Ok(self
            .read()?
            .get(&id)
            .filter(|g| &g.user_id == user_id)
            .cloned())
    }

    /// All goals owned by a user, oldest first
    pub fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Goal>, StrideError> {
        let mut list: Vec<_> = self
            .read()?
            .values()
            .filter(|g| &g.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(list)
    }

    /// Every goal of every user, oldest first
    pub fn list_all(&self) -> Result<Vec<Goal>, StrideError> {
        let mut list: Vec<_> = self.read()?.values().cloned().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(list)
    }

    /// Insert or replace a goal
    pub fn upsert(&self, goal: Goal) -> Result<(), StrideError> {
        self.write()?.insert(goal.id, goal);
        Ok(())
    }

    /// Remove a goal owned by `user_id`, returning it
    pub fn delete(&self, user_id: &UserId, id: GoalId) -> Result<Option<Goal>, StrideError> {
        let mut goals = self.write()?;
        match goals.get(&id) {
            Some(goal) if &goal.user_id == user_id => Ok(goals.remove(&id)),
            _ => Ok(None),
        }
    }

    pub fn count(&self) -> Result<usize, StrideError> {
        Ok(self.read()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Milestone, Money, NewGoal};
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn goal_for(user: &str, name: &str) -> Goal {
        let now = Utc::now();
        let input = NewGoal::new(name, Money::from_units(1000), now + Duration::days(30));
        Goal::new(user.into(), input, "USD", now)
    }

    #[test]
    fn test_owner_scoping() {
        let temp_dir = TempDir::new().unwrap();
        let repo = GoalRepository::new(temp_dir.path().join("goals.json"));

        let goal = goal_for("alice", "Car");
        let id = goal.id;
        repo.upsert(goal).unwrap();

        assert!(repo.get_owned(&"alice".into(), id).unwrap().is_some());
        assert!(repo.get_owned(&"bob".into(), id).unwrap().is_none());
        assert!(repo.delete(&"bob".into(), id).unwrap().is_none());
        assert_eq!(repo.count().unwrap(), 1);

        assert!(repo.delete(&"alice".into(), id).unwrap().is_some());
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_save_and_load_keeps_embedded_documents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("goals.json");
        let repo = GoalRepository::new(path.clone());

        let mut goal = goal_for("alice", "House");
        goal.milestones.push(Milestone::new(
            "Deposit",
            Money::from_units(200),
            Utc::now() + Duration::days(10),
        ));
        let id = goal.id;
        repo.upsert(goal).unwrap();
        repo.save().unwrap();

        let reloaded = GoalRepository::new(path);
        reloaded.load().unwrap();
        let goal = reloaded.get(id).unwrap().unwrap();
        assert_eq!(goal.milestones.len(), 1);
        assert_eq!(goal.milestones[0].name, "Deposit");
    }

    #[test]
    fn test_list_for_user() {
        let temp_dir = TempDir::new().unwrap();
        let repo = GoalRepository::new(temp_dir.path().join("goals.json"));
        repo.upsert(goal_for("alice", "A")).unwrap();
        repo.upsert(goal_for("alice", "B")).unwrap();
        repo.upsert(goal_for("bob", "C")).unwrap();

        assert_eq!(repo.list_for_user(&"alice".into()).unwrap().len(), 2);
        assert_eq!(repo.list_all().unwrap().len(), 3);
    }
}
