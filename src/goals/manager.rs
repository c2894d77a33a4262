use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::{check_index, LedgerError, Result};
use crate::goals::evaluator::{check_and_update_status, progress};
use crate::models::{DayEntry, DurationUnit, Goal, GoalKind, GoalStatus};

/// User-editable part of a goal.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalDraft {
    pub name: String,
    pub kind: GoalKind,
    pub target_value: f64,
    pub deadline: Option<String>,
    pub duration: Option<(u32, DurationUnit)>,
}

impl GoalDraft {
    pub fn new(name: impl Into<String>, kind: GoalKind, target_value: f64) -> Self {
        Self {
            name: name.into(),
            kind,
            target_value,
            deadline: None,
            duration: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::InvalidInput("goal name is empty".to_string()));
        }
        if !self.target_value.is_finite() {
            return Err(LedgerError::InvalidInput(
                "goal target must be a finite number".to_string(),
            ));
        }
        if let Some(deadline) = &self.deadline {
            if crate::models::goal::parse_deadline(deadline).is_none() {
                return Err(LedgerError::InvalidInput(format!(
                    "'{}' is not a date",
                    deadline
                )));
            }
        }
        Ok(())
    }

    fn into_goal(self, created_at: DateTime<Utc>) -> Goal {
        let (duration_amount, duration_unit) = match self.duration {
            Some((amount, unit)) => (Some(amount), Some(unit)),
            None => (None, None),
        };
        Goal {
            name: self.name.trim().to_string(),
            kind: self.kind,
            target_value: self.target_value,
            completed: false,
            completed_at: None,
            failed: false,
            failed_at: None,
            deadline: self.deadline.map(|d| d.trim().to_string()),
            duration_amount,
            duration_unit,
            created_at,
        }
    }
}

pub fn add_goal(goals: &[Goal], draft: GoalDraft, now: DateTime<Utc>) -> Result<Vec<Goal>> {
    draft.validate()?;
    let mut next = goals.to_vec();
    next.push(draft.into_goal(now));
    Ok(next)
}

/// Replace a goal's definition. `created_at` is kept and the goal becomes
/// active again, so it is re-evaluated from scratch.
pub fn edit_goal(goals: &[Goal], index: usize, draft: GoalDraft) -> Result<Vec<Goal>> {
    check_index(index, goals.len())?;
    draft.validate()?;
    let mut next = goals.to_vec();
    let created_at = next[index].created_at;
    next[index] = draft.into_goal(created_at);
    Ok(next)
}

pub fn delete_goal(goals: &[Goal], index: usize) -> Result<Vec<Goal>> {
    check_index(index, goals.len())?;
    let mut next = goals.to_vec();
    next.remove(index);
    Ok(next)
}

/// Mark a goal done by hand. Terminal goals are left alone.
pub fn complete_goal(goals: &[Goal], index: usize, now: DateTime<Utc>) -> Result<Vec<Goal>> {
    check_index(index, goals.len())?;
    let mut next = goals.to_vec();
    let goal = &mut next[index];
    if !goal.is_terminal() {
        goal.completed = true;
        goal.completed_at = Some(now);
    }
    Ok(next)
}

pub fn evaluate_all(
    goals: &[Goal],
    current_balance: f64,
    initial_balance: f64,
    days: &[DayEntry],
    now: DateTime<Utc>,
) -> Vec<Goal> {
    goals
        .iter()
        .map(|g| check_and_update_status(g, current_balance, initial_balance, days, now))
        .collect()
}

/// What a goal list row shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSummary {
    pub name: String,
    pub kind: GoalKind,
    pub target_value: f64,
    pub progress: f64,
    pub status: GoalStatus,
    pub deadline: Option<DateTime<Utc>>,
    /// Whole days left until the deadline; negative once it has passed.
    pub days_remaining: Option<i64>,
}

pub fn goal_summary(
    goal: &Goal,
    current_balance: f64,
    initial_balance: f64,
    days: &[DayEntry],
    now: DateTime<Utc>,
) -> GoalSummary {
    let deadline = goal.resolved_deadline();
    let progress = if goal.completed {
        100.0
    } else {
        progress(goal, current_balance, initial_balance, days, now)
    };
    GoalSummary {
        name: goal.name.clone(),
        kind: goal.kind,
        target_value: goal.target_value,
        progress,
        status: goal.status(),
        deadline,
        days_remaining: deadline.map(|d| (d - now).num_days()),
    }
}
