use serde::Serialize;

/// Upper bound for [`days_to_reach`]; anything slower counts as unreachable.
const MAX_PROJECTION_DAYS: u32 = 3650;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectionPoint {
    pub day: u32,
    pub balance: f64,
}

/// Growth per day when every day hits `daily_target` percent under `leverage`.
pub fn daily_factor(leverage: f64, daily_target: f64) -> f64 {
    1.0 + leverage * daily_target / 100.0
}

/// Compound projection of `balance` over `days` days. Day 0 is the
/// starting balance.
pub fn project(balance: f64, leverage: f64, daily_target: f64, days: u32) -> Vec<ProjectionPoint> {
    let factor = daily_factor(leverage, daily_target);
    let mut current = balance;
    let mut points = Vec::with_capacity(days as usize + 1);
    points.push(ProjectionPoint { day: 0, balance });
    for day in 1..=days {
        current *= factor;
        points.push(ProjectionPoint { day, balance: current });
    }
    points
}

/// Days of on-target trading needed to grow `balance` to `target`.
///
/// `Some(0)` when already there; `None` when the projection never gets there.
pub fn days_to_reach(balance: f64, leverage: f64, daily_target: f64, target: f64) -> Option<u32> {
    if !balance.is_finite() || !target.is_finite() {
        return None;
    }
    if balance >= target {
        return Some(0);
    }
    let factor = daily_factor(leverage, daily_target);
    if balance <= 0.0 || factor <= 1.0 || !factor.is_finite() {
        return None;
    }
    let days = ((target / balance).ln() / factor.ln()).ceil();
    if days > MAX_PROJECTION_DAYS as f64 {
        None
    } else {
        Some(days as u32)
    }
}
