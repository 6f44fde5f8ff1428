//! Goal listing: filtering, sorting and pagination
//!
//! Derived flags (overdue, on-track, needs-attention) are evaluated per goal
//! before paging, so `total` always counts every match.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StrideError, StrideResult};
use crate::models::{Goal, GoalPriority, GoalStatus, GoalType, GoalWithMetrics};

pub const MAX_PAGE_SIZE: usize = 100;

/// Options for filtering goals; empty sets and `None` match everything
#[derive(Debug, Clone, Default)]
pub struct GoalFilter {
    pub statuses: Vec<GoalStatus>,
    pub types: Vec<GoalType>,
    pub priorities: Vec<GoalPriority>,
    /// Exact match, case-insensitive
    pub category: Option<String>,
    pub overdue: Option<bool>,
    pub on_track: Option<bool>,
    pub needs_attention: Option<bool>,
    /// Inclusive lower bound on the deadline
    pub deadline_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the deadline
    pub deadline_to: Option<DateTime<Utc>>,
    pub search: Option<String>,
    /// A goal matches if it carries any of these
    pub tags: Vec<String>,
}

impl GoalFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: GoalStatus) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn goal_type(mut self, goal_type: GoalType) -> Self {
        self.types.push(goal_type);
        self
    }

    pub fn priority(mut self, priority: GoalPriority) -> Self {
        self.priorities.push(priority);
        self
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search = Some(query.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn deadline_between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.deadline_from = Some(from);
        self.deadline_to = Some(to);
        self
    }

    /// Whether a goal (with metrics already computed) passes every filter
    pub fn matches(&self, entry: &GoalWithMetrics) -> bool {
        let goal = &entry.goal;
        let metrics = &entry.metrics;

        if !self.statuses.is_empty() && !self.statuses.contains(&goal.status) {
            return false;
        }
        if !self.types.is_empty() && !self.types.contains(&goal.goal_type) {
            return false;
        }
        if !self.priorities.is_empty() && !self.priorities.contains(&goal.priority) {
            return false;
        }
        if let Some(category) = &self.category {
            if !goal
                .category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category))
            {
                return false;
            }
        }
        if self.overdue.is_some_and(|want| metrics.is_overdue != want) {
            return false;
        }
        if self.on_track.is_some_and(|want| metrics.is_on_track != want) {
            return false;
        }
        if self
            .needs_attention
            .is_some_and(|want| metrics.needs_attention != want)
        {
            return false;
        }
        if self.deadline_from.is_some_and(|from| goal.deadline < from) {
            return false;
        }
        if self.deadline_to.is_some_and(|to| goal.deadline > to) {
            return false;
        }
        if let Some(query) = self.search.as_deref().filter(|q| !q.trim().is_empty()) {
            if !goal.matches_search(query.trim()) {
                return false;
            }
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|t| goal.tags.contains(t)) {
            return false;
        }

        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Deadline,
    Name,
    TargetAmount,
    CurrentAmount,
    Priority,
    Progress,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Deadline => "deadline",
            Self::Name => "name",
            Self::TargetAmount => "target_amount",
            Self::CurrentAmount => "current_amount",
            Self::Priority => "priority",
            Self::Progress => "progress",
        }
    }

    fn compare(&self, a: &GoalWithMetrics, b: &GoalWithMetrics) -> Ordering {
        match self {
            Self::CreatedAt => a.goal.created_at.cmp(&b.goal.created_at),
            Self::UpdatedAt => a.goal.updated_at.cmp(&b.goal.updated_at),
            Self::Deadline => a.goal.deadline.cmp(&b.goal.deadline),
            Self::Name => a.goal.name.to_lowercase().cmp(&b.goal.name.to_lowercase()),
            Self::TargetAmount => a.goal.target_amount.cmp(&b.goal.target_amount),
            Self::CurrentAmount => a.goal.current_amount.cmp(&b.goal.current_amount),
            Self::Priority => a.goal.priority.cmp(&b.goal.priority),
            Self::Progress => a
                .metrics
                .progress_percentage
                .total_cmp(&b.metrics.progress_percentage),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "created_at" | "created" => Ok(Self::CreatedAt),
            "updated_at" | "updated" => Ok(Self::UpdatedAt),
            "deadline" => Ok(Self::Deadline),
            "name" => Ok(Self::Name),
            "target_amount" | "target" => Ok(Self::TargetAmount),
            "current_amount" | "current" => Ok(Self::CurrentAmount),
            "priority" => Ok(Self::Priority),
            "progress" | "progress_percentage" => Ok(Self::Progress),
            _ => Err(format!(
                "Invalid sort field '{}'. Valid fields: created_at, updated_at, deadline, name, \
                 target_amount, current_amount, priority, progress",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(format!("Invalid sort order '{}'. Use asc or desc", s)),
        }
    }
}

/// Which page of results to return, and in what order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl PageRequest {
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page,
            limit,
            ..Default::default()
        }
    }

    pub fn sorted(mut self, sort_by: SortField, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }

    pub fn validate(&self) -> StrideResult<()> {
        if self.page == 0 {
            return Err(StrideError::Validation("Page must be at least 1".into()));
        }
        if self.limit == 0 || self.limit > MAX_PAGE_SIZE {
            return Err(StrideError::Validation(format!(
                "Limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        Ok(())
    }
}

/// One page of goals plus the totals needed to page through the rest
#[derive(Debug, Clone, Serialize)]
pub struct GoalPage {
    pub goals: Vec<GoalWithMetrics>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

/// Compute metrics, filter, sort and slice out the requested page
pub fn paginate(
    goals: Vec<Goal>,
    filter: &GoalFilter,
    request: &PageRequest,
    now: DateTime<Utc>,
) -> StrideResult<GoalPage> {
    request.validate()?;

    let mut matched: Vec<GoalWithMetrics> = goals
        .into_iter()
        .map(|g| GoalWithMetrics::new(g, now))
        .filter(|g| filter.matches(g))
        .collect();

    matched.sort_by(|a, b| {
        let ordering = request.sort_by.compare(a, b);
        let ordering = match request.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        };
        ordering.then_with(|| a.goal.id.cmp(&b.goal.id))
    });

    let total = matched.len();
    let total_pages = total.div_ceil(request.limit);
    let goals = matched
        .into_iter()
        .skip((request.page - 1) * request.limit)
        .take(request.limit)
        .collect();

    Ok(GoalPage {
        goals,
        total,
        page: request.page,
        limit: request.limit,
        total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, NewGoal};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn goal(name: &str, target: i64, status: GoalStatus, days_left: i64) -> Goal {
        let deadline = now() + Duration::days(days_left);
        let mut input = NewGoal::new(name, Money::from_units(target), deadline);
        input.start_date = Some(now() - Duration::days(100));
        input.status = status;
        Goal::new("u".into(), input, "USD", now() - Duration::days(100))
    }

    #[test]
    fn test_status_and_type_sets() {
        let goals = vec![
            goal("a", 100, GoalStatus::Active, 30),
            goal("b", 100, GoalStatus::Paused, 30),
            goal("c", 100, GoalStatus::Draft, 30),
        ];
        let filter = GoalFilter::new()
            .status(GoalStatus::Active)
            .status(GoalStatus::Paused);
        let page = paginate(goals, &filter, &PageRequest::default(), now()).unwrap();
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_derived_flags_filter_before_paging() {
        let mut goals = Vec::new();
        for i in 0..5 {
            goals.push(goal(&format!("late {}", i), 100, GoalStatus::Active, -1));
        }
        for i in 0..5 {
            goals.push(goal(&format!("paused {}", i), 100, GoalStatus::Paused, -1));
        }

        let filter = GoalFilter {
            overdue: Some(true),
            ..Default::default()
        };
        let page = paginate(goals, &filter, &PageRequest::new(2, 2), now()).unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.goals.len(), 2);
        assert!(page.goals.iter().all(|g| g.metrics.is_overdue));
    }

    #[test]
    fn test_search_and_tags() {
        let mut a = goal("Beach trip", 100, GoalStatus::Active, 30);
        a.tags.insert("travel".into());
        let mut b = goal("Laptop", 100, GoalStatus::Active, 30);
        b.notes = Some("for the beach house office".into());
        let c = goal("Car", 100, GoalStatus::Active, 30);

        let page = paginate(
            vec![a.clone(), b.clone(), c.clone()],
            &GoalFilter::new().search("BEACH"),
            &PageRequest::default(),
            now(),
        )
        .unwrap();
        assert_eq!(page.total, 2);

        let page = paginate(
            vec![a, b, c],
            &GoalFilter::new().tag("travel").tag("home"),
            &PageRequest::default(),
            now(),
        )
        .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.goals[0].goal.name, "Beach trip");
    }

    #[test]
    fn test_deadline_range_is_inclusive() {
        let goals = vec![
            goal("a", 100, GoalStatus::Active, 10),
            goal("b", 100, GoalStatus::Active, 20),
            goal("c", 100, GoalStatus::Active, 30),
        ];
        let filter = GoalFilter::new()
            .deadline_between(now() + Duration::days(10), now() + Duration::days(20));
        let page = paginate(goals, &filter, &PageRequest::default(), now()).unwrap();
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_sorting() {
        let goals = vec![
            goal("b", 300, GoalStatus::Active, 30),
            goal("a", 100, GoalStatus::Active, 30),
            goal("c", 200, GoalStatus::Active, 30),
        ];

        let request = PageRequest::default().sorted(SortField::TargetAmount, SortOrder::Asc);
        let page = paginate(goals.clone(), &GoalFilter::new(), &request, now()).unwrap();
        let names: Vec<_> = page.goals.iter().map(|g| g.goal.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "b"]);

        let request = PageRequest::default().sorted(SortField::Name, SortOrder::Desc);
        let page = paginate(goals, &GoalFilter::new(), &request, now()).unwrap();
        let names: Vec<_> = page.goals.iter().map(|g| g.goal.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_invalid_paging() {
        let err = paginate(Vec::new(), &GoalFilter::new(), &PageRequest::new(0, 10), now())
            .unwrap_err();
        assert!(err.is_validation());

        let err = paginate(Vec::new(), &GoalFilter::new(), &PageRequest::new(1, 101), now())
            .unwrap_err();
        assert!(err.is_validation());

        let page = paginate(Vec::new(), &GoalFilter::new(), &PageRequest::new(1, 100), now())
            .unwrap();
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_sort_field_parsing() {
        assert_eq!("progress".parse::<SortField>().unwrap(), SortField::Progress);
        assert_eq!("target-amount".parse::<SortField>().unwrap(), SortField::TargetAmount);
        assert!("color".parse::<SortField>().is_err());
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
    }
}
