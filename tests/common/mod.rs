#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};
use deposit_tracker::ledger::EntryInput;
use deposit_tracker::models::{AppData, DayEntry};
use deposit_tracker::tracker::Tracker;

pub fn test_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-06-15T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Tracker on default settings (30 deposit, x10) with the clock pinned to
/// `test_time()` and one day per percentage starting 2024-01-01.
pub fn tracker_with(percentages: &[f64]) -> Tracker {
    let mut tracker = Tracker::new(AppData::default());
    tracker.sim_time = Some(test_time());
    for (i, &p) in percentages.iter().enumerate() {
        let date = day(2024, 1, 1) + chrono::Duration::days(i as i64);
        tracker
            .add_day(EntryInput::Percentage(p), Some(date))
            .unwrap();
    }
    tracker
}

pub fn assert_consistent(days: &[DayEntry], initial: f64, leverage: f64) {
    let mut previous = initial;
    for (i, d) in days.iter().enumerate() {
        assert_eq!(d.sequence_number as usize, i + 1);
        assert!((d.amount - previous * leverage * d.percentage / 100.0).abs() < 1e-9);
        assert!((d.balance - (previous + d.amount)).abs() < 1e-9);
        previous = d.balance;
    }
}
