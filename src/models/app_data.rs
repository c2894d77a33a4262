use serde::{Deserialize, Serialize};

use super::day::{ArchivedDayEntry, DayEntry};
use super::goal::Goal;

pub const DEFAULT_DEPOSIT: f64 = 30.0;
pub const DEFAULT_LEVERAGE: f64 = 10.0;
pub const DEFAULT_DAILY_TARGET: f64 = 3.0;

/// The whole persisted state, in the shape the web client and the
/// persistence server exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppData {
    /// Current balance. Mirrors the last day's balance, or the initial
    /// deposit when the ledger is empty.
    pub deposit: f64,
    pub leverage: f64,
    /// Daily percentage the user aims for; used by projections and stats.
    pub daily_target: f64,
    pub initial_deposit: f64,
    pub days: Vec<DayEntry>,
    pub archived_days: Vec<ArchivedDayEntry>,
    pub goals: Vec<Goal>,
}

impl Default for AppData {
    fn default() -> Self {
        Self {
            deposit: DEFAULT_DEPOSIT,
            leverage: DEFAULT_LEVERAGE,
            daily_target: DEFAULT_DAILY_TARGET,
            initial_deposit: DEFAULT_DEPOSIT,
            days: Vec::new(),
            archived_days: Vec::new(),
            goals: Vec::new(),
        }
    }
}

impl AppData {
    pub fn with_settings(initial_deposit: f64, leverage: f64, daily_target: f64) -> Self {
        Self {
            deposit: initial_deposit,
            leverage,
            daily_target,
            initial_deposit,
            ..Self::default()
        }
    }

    pub fn current_balance(&self) -> f64 {
        self.days
            .last()
            .map(|d| d.balance)
            .unwrap_or(self.initial_deposit)
    }

    /// Net profit relative to the initial deposit.
    pub fn profit(&self) -> f64 {
        self.current_balance() - self.initial_deposit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let data: AppData = serde_json::from_str(r#"{"deposit": 45}"#).unwrap();
        assert_eq!(data.deposit, 45.0);
        assert_eq!(data.leverage, DEFAULT_LEVERAGE);
        assert_eq!(data.daily_target, DEFAULT_DAILY_TARGET);
        assert_eq!(data.initial_deposit, DEFAULT_DEPOSIT);
        assert!(data.days.is_empty());
    }

    #[test]
    fn default_blob_shape() {
        let json = serde_json::to_value(AppData::default()).unwrap();
        for key in [
            "deposit",
            "leverage",
            "dailyTarget",
            "initialDeposit",
            "days",
            "archivedDays",
            "goals",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }
}
