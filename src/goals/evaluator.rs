use chrono::{DateTime, Utc};

use crate::models::{DayEntry, Goal, GoalKind};

/// Days considered by the daily-target hit rate.
pub const HIT_RATE_WINDOW: usize = 7;
/// Share of progress taken away from a goal that is behind schedule at its deadline.
const MAX_URGENCY_PENALTY: f64 = 0.5;

fn clamp_pct(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 100.0)
    }
}

/// Number of consecutive profitable days counted back from the latest one.
pub fn trailing_streak(days: &[DayEntry]) -> usize {
    days.iter().rev().take_while(|d| d.is_profitable()).count()
}

/// Share (0-100) of the last [`HIT_RATE_WINDOW`] days that reached `threshold`.
pub fn hit_rate(days: &[DayEntry], threshold: f64) -> f64 {
    let window = &days[days.len().saturating_sub(HIT_RATE_WINDOW)..];
    if window.is_empty() {
        return 0.0;
    }
    let hits = window.iter().filter(|d| d.percentage >= threshold).count();
    hits as f64 / window.len() as f64 * 100.0
}

/// Progress before any deadline adjustment.
pub fn base_progress(
    goal: &Goal,
    current_balance: f64,
    initial_balance: f64,
    days: &[DayEntry],
) -> f64 {
    let target = goal.target_value;
    if !target.is_finite() {
        return 0.0;
    }

    match goal.kind {
        GoalKind::DepositTarget => {
            if target <= initial_balance {
                return 100.0;
            }
            clamp_pct((current_balance - initial_balance) / (target - initial_balance) * 100.0)
        }
        GoalKind::PercentageGrowthTarget => {
            if target == 0.0 {
                return 100.0;
            }
            if initial_balance <= 0.0 {
                return 0.0;
            }
            let growth = (current_balance - initial_balance) / initial_balance * 100.0;
            clamp_pct(growth / target * 100.0)
        }
        GoalKind::ConsecutiveProfitableDaysTarget => {
            if target <= 0.0 {
                return 100.0;
            }
            clamp_pct(trailing_streak(days) as f64 / target * 100.0)
        }
        GoalKind::DailyTargetHitRateTarget => clamp_pct(hit_rate(days, target)),
    }
}

/// Display progress (0-100), penalised when a deadline-bound goal trails
/// its time budget.
pub fn progress(
    goal: &Goal,
    current_balance: f64,
    initial_balance: f64,
    days: &[DayEntry],
    now: DateTime<Utc>,
) -> f64 {
    let base = base_progress(goal, current_balance, initial_balance, days);
    let Some(deadline) = goal.resolved_deadline() else {
        return base;
    };

    if base >= 100.0 {
        return base;
    }
    if now > deadline {
        return 0.0;
    }

    let budget = (deadline - goal.created_at).num_milliseconds() as f64;
    let remaining = (deadline - now).num_milliseconds() as f64;
    let (time_fraction, urgency) = if budget > 0.0 {
        let elapsed = (now - goal.created_at).num_milliseconds() as f64;
        (
            (elapsed / budget).clamp(0.0, 1.0),
            (1.0 - remaining / budget).clamp(0.0, 1.0),
        )
    } else {
        (1.0, 1.0)
    };

    if base > time_fraction * 100.0 {
        return base;
    }
    (base * (1.0 - urgency * MAX_URGENCY_PENALTY)).max(0.0)
}

/// Returns the goal with `completed` or `failed` set when it has just
/// reached one of them. Terminal goals come back unchanged.
pub fn check_and_update_status(
    goal: &Goal,
    current_balance: f64,
    initial_balance: f64,
    days: &[DayEntry],
    now: DateTime<Utc>,
) -> Goal {
    let mut next = goal.clone();
    if goal.is_terminal() {
        return next;
    }

    if progress(goal, current_balance, initial_balance, days, now) >= 100.0 {
        next.completed = true;
        next.completed_at = Some(now);
    } else if goal.resolved_deadline().is_some_and(|deadline| now > deadline) {
        next.failed = true;
        next.failed_at = Some(now);
    }
    next
}
