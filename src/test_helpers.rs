use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::config::{Config, StorageKind};
use crate::ledger::{append, EntryInput};
use crate::models::{DayEntry, Goal, GoalKind};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Fixed clock for goal tests: 2024-06-15T00:00:00Z.
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-06-15T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Build a consistent ledger by appending each percentage in turn, one day
/// apart starting 2024-01-01.
pub fn ledger_from_percentages(percentages: &[f64], initial: f64, leverage: f64) -> Vec<DayEntry> {
    let start = date(2024, 1, 1);
    percentages
        .iter()
        .enumerate()
        .fold(Vec::new(), |days, (i, &p)| {
            let day = start + Duration::days(i as i64);
            append(&days, initial, leverage, EntryInput::Percentage(p), day)
                .unwrap()
                .days
        })
}

/// Panics unless numbering, amounts and balances all follow from the
/// percentages and `initial`.
pub fn assert_ledger_consistent(days: &[DayEntry], initial: f64, leverage: f64) {
    let mut previous = initial;
    for (i, d) in days.iter().enumerate() {
        assert_eq!(d.sequence_number as usize, i + 1, "numbering at index {}", i);
        let amount = previous * leverage * d.percentage / 100.0;
        assert!(
            (d.amount - amount).abs() < 1e-9,
            "amount at index {}: {} != {}",
            i,
            d.amount,
            amount
        );
        assert!(
            (d.balance - (previous + d.amount)).abs() < 1e-9,
            "balance at index {}",
            i
        );
        previous = d.balance;
    }
}

pub fn make_goal(kind: GoalKind, target: f64) -> Goal {
    Goal {
        name: "Test goal".to_string(),
        kind,
        target_value: target,
        completed: false,
        completed_at: None,
        failed: false,
        failed_at: None,
        deadline: None,
        duration_amount: None,
        duration_unit: None,
        created_at: fixed_now() - Duration::days(1),
    }
}

/// A Config suitable for testing: local storage in the temp dir, no rate polling.
pub fn default_test_config() -> Config {
    let dir = std::env::temp_dir().join("deposit_tracker_test");
    Config {
        server_addr: "127.0.0.1:0".to_string(),
        data_file: dir.join("data.json").to_string_lossy().to_string(),
        storage: StorageKind::Local,
        local_store_file: dir.join("local_store.json").to_string_lossy().to_string(),
        api_url: "http://localhost:3001".to_string(),
        default_deposit: 30.0,
        default_leverage: 10.0,
        default_daily_target: 3.0,
        rates_url: String::new(),
        rates_base: "USD".to_string(),
        rates_poll_secs: 3600,
        log_level: "ERROR".to_string(),
    }
}
