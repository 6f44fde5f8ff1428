//! Goal service
//!
//! Owner-scoped CRUD over goals plus the operations that move money through
//! the progress ledger: manual progress, patches and auto-tracking
//! recalculation. Every read is returned with freshly computed metrics.

use crate::audit::{AuditEntry, AuditTarget};
use crate::clock::Clock;
use crate::error::{StrideError, StrideResult};
use crate::models::{
    Goal, GoalId, GoalPatch, GoalType, GoalWithMetrics, Money, NewGoal, ProgressSource,
    Reconciliation, TransactionId, TransactionKind, UserId,
};
use crate::storage::Storage;

use super::filter::{paginate, GoalFilter, GoalPage, PageRequest};

const DEFAULT_CURRENCY: &str = "USD";

/// Service for goal management
pub struct GoalService<'a> {
    storage: &'a Storage,
    clock: &'a dyn Clock,
    currency: String,
}

impl<'a> GoalService<'a> {
    pub fn new(storage: &'a Storage, clock: &'a dyn Clock) -> Self {
        Self {
            storage,
            clock,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Currency stamped on new goals that don't name one
    pub fn with_currency(mut self, code: impl Into<String>) -> Self {
        self.currency = code.into();
        self
    }

    /// Load a goal owned by `user_id`, or fail with NotFound
    pub(crate) fn load(&self, user_id: &UserId, id: GoalId) -> StrideResult<Goal> {
        self.storage
            .goals
            .get_owned(user_id, id)?
            .ok_or_else(|| StrideError::goal_not_found(id.to_string()))
    }

    fn persist(&self, goal: &Goal) -> StrideResult<()> {
        self.storage.goals.upsert(goal.clone())?;
        self.storage.goals.save()
    }

    fn with_metrics(&self, goal: Goal) -> GoalWithMetrics {
        GoalWithMetrics::new(goal, self.clock.now())
    }

    /// Get a goal with its metrics
    pub fn get(&self, user_id: &UserId, id: GoalId) -> StrideResult<GoalWithMetrics> {
        let goal = self.load(user_id, id)?;
        Ok(self.with_metrics(goal))
    }

    /// Find a goal by full id, short id (`goal-1a2b3c4d` or the bare hex
    /// prefix) or name
    pub fn find(&self, user_id: &UserId, identifier: &str) -> StrideResult<Option<Goal>> {
        let identifier = identifier.trim();

        if let Ok(id) = identifier.parse::<GoalId>() {
            return self.storage.goals.get_owned(user_id, id);
        }

        let goals = self.storage.goals.list_for_user(user_id)?;

        let prefix = identifier.strip_prefix("goal-").unwrap_or(identifier);
        if prefix.len() >= 8 && prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
            let prefix = prefix.to_lowercase();
            let mut hits = goals.iter().filter(|g| g.id.to_string().starts_with(&prefix));
            if let (Some(goal), None) = (hits.next(), hits.next()) {
                return Ok(Some(goal.clone()));
            }
        }

        Ok(goals
            .into_iter()
            .find(|g| g.name.eq_ignore_ascii_case(identifier)))
    }

    /// List goals matching `filter`, one page at a time
    pub fn list(
        &self,
        user_id: &UserId,
        filter: &GoalFilter,
        request: &PageRequest,
    ) -> StrideResult<GoalPage> {
        let goals = self.storage.goals.list_for_user(user_id)?;
        paginate(goals, filter, request, self.clock.now())
    }

    /// Audit trail for one goal, its milestones and its ledger; newest last
    pub fn history(
        &self,
        user_id: &UserId,
        id: GoalId,
        limit: usize,
    ) -> StrideResult<Vec<AuditEntry>> {
        let goal = self.load(user_id, id)?;
        self.storage.audit().read_for_goal(goal.id, limit)
    }

    /// Create a new goal
    pub fn create(&self, user_id: &UserId, input: NewGoal) -> StrideResult<GoalWithMetrics> {
        let now = self.clock.now();
        let mut goal = Goal::new(user_id.clone(), input, &self.currency, now);

        goal.validate()
            .map_err(|e| StrideError::Validation(e.to_string()))?;

        let result = goal.reconcile(now);
        trace_reconciliation(&goal, &result);

        self.persist(&goal)?;

        self.storage.log_create(now, AuditTarget::goal(&goal), &goal)?;

        tracing::info!(goal_id = %goal.id, user = %user_id, "goal created");

        Ok(self.with_metrics(goal))
    }

    /// Apply a partial update
    pub fn update(
        &self,
        user_id: &UserId,
        id: GoalId,
        patch: GoalPatch,
    ) -> StrideResult<GoalWithMetrics> {
        let now = self.clock.now();
        let mut goal = self.load(user_id, id)?;

        if patch.is_empty() {
            return Ok(self.with_metrics(goal));
        }
        if patch.current_amount.is_some_and(|a| a.is_negative()) {
            return Err(StrideError::Validation(
                "Current amount cannot be negative".into(),
            ));
        }

        let before = goal.clone();
        let result = goal.apply(patch, now);

        goal.validate()
            .map_err(|e| StrideError::Validation(e.to_string()))?;
        trace_reconciliation(&goal, &result);

        self.persist(&goal)?;

        self.storage.log_update(
            now,
            AuditTarget::goal(&goal),
            &before,
            &goal,
            None,
        )?;

        Ok(self.with_metrics(goal))
    }

    /// Append a signed delta to the goal's progress ledger
    pub fn record_progress(
        &self,
        user_id: &UserId,
        id: GoalId,
        delta: Money,
        source: ProgressSource,
        description: Option<String>,
        transaction_ref: Option<TransactionId>,
    ) -> StrideResult<GoalWithMetrics> {
        let now = self.clock.now();
        let mut goal = self.load(user_id, id)?;
        if goal.current_amount.checked_add(delta).is_none() {
            return Err(StrideError::Validation(format!(
                "Progress of {} would put goal '{}' out of range",
                delta, goal.name
            )));
        }
        let before = goal.clone();

        let result = goal.record_progress(delta, source, description, transaction_ref, now);
        trace_reconciliation(&goal, &result);

        self.persist(&goal)?;

        if let Some(entry) = goal.progress_history.last() {
            self.storage.log_create(
                now,
                AuditTarget::progress(&goal, goal.progress_history.len() - 1),
                entry,
            )?;
        }
        self.storage.log_update(
            now,
            AuditTarget::goal(&goal),
            &before,
            &goal,
            Some(format!(
                "current_amount: {} -> {} ({})",
                before.current_amount, goal.current_amount, source
            )),
        )?;

        tracing::debug!(goal_id = %goal.id, delta = %delta, %source, "progress recorded");

        Ok(self.with_metrics(goal))
    }

    /// Delete a goal, its milestones and its ledger
    pub fn delete(&self, user_id: &UserId, id: GoalId) -> StrideResult<Goal> {
        let removed = self
            .storage
            .goals
            .delete(user_id, id)?
            .ok_or_else(|| StrideError::goal_not_found(id.to_string()))?;
        self.storage.goals.save()?;

        self.storage.log_delete(self.clock.now(), AuditTarget::goal(&removed), &removed)?;

        tracing::info!(goal_id = %removed.id, "goal deleted");

        Ok(removed)
    }

    /// Delete every listed goal the user owns; returns how many were removed.
    /// Ids that don't resolve are skipped.
    pub fn bulk_delete(&self, user_id: &UserId, ids: &[GoalId]) -> StrideResult<usize> {
        let now = self.clock.now();
        let mut removed = Vec::new();

        for &id in ids {
            match self.storage.goals.delete(user_id, id)? {
                Some(goal) => removed.push(goal),
                None => tracing::warn!(goal_id = %id, "bulk delete skipped unknown goal"),
            }
        }

        if removed.is_empty() {
            return Ok(0);
        }
        self.storage.goals.save()?;

        for goal in &removed {
            self.storage.log_delete(now, AuditTarget::goal(goal), goal)?;
        }

        tracing::info!(requested = ids.len(), removed = removed.len(), "bulk delete finished");

        Ok(removed.len())
    }

    /// Rebuild `current_amount` from the transaction history the goal's
    /// tracking rules select
    pub fn recalculate_auto_progress(
        &self,
        user_id: &UserId,
        id: GoalId,
    ) -> StrideResult<GoalWithMetrics> {
        let now = self.clock.now();
        let mut goal = self.load(user_id, id)?;

        if !goal.can_auto_track() {
            let reason = if goal.auto_track {
                format!("Goal '{}' has no tracking rules", goal.name)
            } else {
                format!("Auto-tracking is disabled for goal '{}'", goal.name)
            };
            return Err(StrideError::Precondition(reason));
        }
        let rules = goal.tracking_rules.clone().unwrap_or_default();

        let transactions = &self.storage.transactions;
        let income = transactions.sum_matching(user_id, &rules, TransactionKind::Income)?;
        let expenses = transactions.sum_matching(user_id, &rules, TransactionKind::Expense)?;

        let net = match goal.goal_type {
            GoalType::ExpenseReduction => income - expenses,
            GoalType::DebtPayoff => income + expenses,
            _ => income,
        };

        let before = goal.clone();
        let result = goal.set_current_amount(
            goal.initial_amount + net,
            ProgressSource::Auto,
            Some("Auto-tracking recalculation".to_string()),
            now,
        );
        goal.last_calculated_at = Some(now);
        trace_reconciliation(&goal, &result);

        self.persist(&goal)?;

        self.storage.log_update(
            now,
            AuditTarget::goal(&goal),
            &before,
            &goal,
            Some(format!(
                "recalculated: {} -> {}",
                before.current_amount, goal.current_amount
            )),
        )?;

        tracing::info!(
            goal_id = %goal.id,
            income = %income,
            expenses = %expenses,
            current = %goal.current_amount,
            "auto-tracking recalculated"
        );

        Ok(self.with_metrics(goal))
    }
}

fn trace_reconciliation(goal: &Goal, result: &Reconciliation) {
    for index in &result.completed_milestones {
        tracing::info!(goal_id = %goal.id, milestone = index, "milestone reached");
    }
    if result.activated {
        tracing::info!(goal_id = %goal.id, "goal activated by first progress");
    }
    if result.completed {
        tracing::info!(goal_id = %goal.id, "goal completed");
    }
}
