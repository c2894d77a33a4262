use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GoalKind {
    DepositTarget,
    PercentageGrowthTarget,
    ConsecutiveProfitableDaysTarget,
    DailyTargetHitRateTarget,
}

impl GoalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalKind::DepositTarget => "depositTarget",
            GoalKind::PercentageGrowthTarget => "percentageGrowthTarget",
            GoalKind::ConsecutiveProfitableDaysTarget => "consecutiveProfitableDaysTarget",
            GoalKind::DailyTargetHitRateTarget => "dailyTargetHitRateTarget",
        }
    }

    /// Accepts the serialized names plus the short forms used on the command line.
    pub fn from_str_loose(s: &str) -> Option<GoalKind> {
        match s.trim().to_lowercase().as_str() {
            "deposit" | "deposittarget" => Some(GoalKind::DepositTarget),
            "growth" | "percentage" | "percentagegrowthtarget" => {
                Some(GoalKind::PercentageGrowthTarget)
            }
            "streak" | "consecutiveprofitabledaystarget" => {
                Some(GoalKind::ConsecutiveProfitableDaysTarget)
            }
            "hit-rate" | "hitrate" | "dailytargethitratetarget" => {
                Some(GoalKind::DailyTargetHitRateTarget)
            }
            _ => None,
        }
    }
}

impl fmt::Display for GoalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Days,
    Weeks,
    Months,
}

impl DurationUnit {
    pub fn from_str_loose(s: &str) -> Option<DurationUnit> {
        match s.trim().to_lowercase().as_str() {
            "d" | "day" | "days" => Some(DurationUnit::Days),
            "w" | "week" | "weeks" => Some(DurationUnit::Weeks),
            "m" | "month" | "months" => Some(DurationUnit::Months),
            _ => None,
        }
    }

    /// Months are added on the calendar, so a month from Jan 31 lands on the
    /// last day of February.
    pub fn add_to(&self, start: DateTime<Utc>, amount: u32) -> Option<DateTime<Utc>> {
        match self {
            DurationUnit::Days => start.checked_add_signed(Duration::days(amount as i64)),
            DurationUnit::Weeks => start.checked_add_signed(Duration::weeks(amount as i64)),
            DurationUnit::Months => start.checked_add_months(Months::new(amount)),
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationUnit::Days => write!(f, "days"),
            DurationUnit::Weeks => write!(f, "weeks"),
            DurationUnit::Months => write!(f, "months"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Active,
    Completed,
    Failed,
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalStatus::Active => write!(f, "active"),
            GoalStatus::Completed => write!(f, "completed"),
            GoalStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: GoalKind,
    /// NaN when the stored value was not a number; such goals never complete.
    #[serde(deserialize_with = "lenient_f64")]
    pub target_value: f64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub failed: bool,
    #[serde(default)]
    pub failed_at: Option<DateTime<Utc>>,
    /// Kept as text: imported files may carry dates we cannot parse.
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub duration_amount: Option<u32>,
    #[serde(default)]
    pub duration_unit: Option<DurationUnit>,
    /// Files written before goals carried a creation time load with the
    /// Unix epoch here until [`Goal::stamp_created_at`] fills it in.
    #[serde(default = "unset_created_at")]
    pub created_at: DateTime<Utc>,
}

fn unset_created_at() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}

impl Goal {
    pub fn is_terminal(&self) -> bool {
        self.completed || self.failed
    }

    pub fn has_created_at(&self) -> bool {
        self.created_at != unset_created_at()
    }

    /// Set a missing creation time to `now`. Returns whether it was missing.
    pub fn stamp_created_at(&mut self, now: DateTime<Utc>) -> bool {
        if self.has_created_at() {
            return false;
        }
        self.created_at = now;
        true
    }

    pub fn status(&self) -> GoalStatus {
        if self.completed {
            GoalStatus::Completed
        } else if self.failed {
            GoalStatus::Failed
        } else {
            GoalStatus::Active
        }
    }

    /// Key used to detect duplicates on merge import.
    pub fn merge_key(&self) -> (String, GoalKind) {
        (self.name.clone(), self.kind)
    }

    /// The instant the goal expires, if it has one.
    ///
    /// An explicit deadline wins. A date-only deadline means 00:00 UTC of that
    /// day. An unparsable deadline is ignored, leaving the duration (if any)
    /// as the only source.
    pub fn resolved_deadline(&self) -> Option<DateTime<Utc>> {
        if let Some(deadline) = self.deadline.as_deref().and_then(parse_deadline) {
            return Some(deadline);
        }
        let amount = self.duration_amount?;
        let unit = self.duration_unit?;
        unit.add_to(self.created_at, amount)
    }
}

pub fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal_json(target: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "name": "Double up",
            "type": "depositTarget",
            "targetValue": target,
            "createdAt": "2024-01-01T00:00:00Z",
        })
    }

    #[test]
    fn non_numeric_target_becomes_nan() {
        let goal: Goal = serde_json::from_value(goal_json(serde_json::json!("lots"))).unwrap();
        assert!(goal.target_value.is_nan());
        let goal: Goal = serde_json::from_value(goal_json(serde_json::json!("120.5"))).unwrap();
        assert!((goal.target_value - 120.5).abs() < 1e-9);
    }

    #[test]
    fn date_deadline_resolves_to_utc_midnight() {
        let mut goal: Goal = serde_json::from_value(goal_json(serde_json::json!(100))).unwrap();
        goal.deadline = Some("2024-02-01".to_string());
        let deadline = goal.resolved_deadline().unwrap();
        assert_eq!(deadline.to_rfc3339(), "2024-02-01T00:00:00+00:00");
    }

    #[test]
    fn unparsable_deadline_falls_back_to_duration() {
        let mut goal: Goal = serde_json::from_value(goal_json(serde_json::json!(100))).unwrap();
        goal.deadline = Some("next friday".to_string());
        assert!(goal.resolved_deadline().is_none());

        goal.duration_amount = Some(2);
        goal.duration_unit = Some(DurationUnit::Weeks);
        let deadline = goal.resolved_deadline().unwrap();
        assert_eq!(deadline.to_rfc3339(), "2024-01-15T00:00:00+00:00");
    }

    #[test]
    fn months_are_calendar_months() {
        let start = DateTime::parse_from_rfc3339("2024-01-31T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let end = DurationUnit::Months.add_to(start, 1).unwrap();
        assert_eq!(end.to_rfc3339(), "2024-02-29T00:00:00+00:00");
    }

    #[test]
    fn missing_created_at_is_stable_until_stamped() {
        let raw = serde_json::json!({"name": "Old", "type": "depositTarget", "targetValue": 50});
        let first: Goal = serde_json::from_value(raw.clone()).unwrap();
        let second: Goal = serde_json::from_value(raw).unwrap();
        assert!(!first.has_created_at());
        assert_eq!(first.created_at, second.created_at);

        let mut goal = first;
        let now = DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(goal.stamp_created_at(now));
        assert_eq!(goal.created_at, now);
        assert!(!goal.stamp_created_at(now + Duration::days(1)));
        assert_eq!(goal.created_at, now);
    }

    #[test]
    fn kind_parses_short_names() {
        assert_eq!(GoalKind::from_str_loose("streak"), Some(GoalKind::ConsecutiveProfitableDaysTarget));
        assert_eq!(GoalKind::from_str_loose("depositTarget"), Some(GoalKind::DepositTarget));
        assert_eq!(GoalKind::from_str_loose("moon"), None);
    }
}
