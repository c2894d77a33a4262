mod common;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Duration;

use deposit_tracker::goals::GoalDraft;
use deposit_tracker::ledger::EntryInput;
use deposit_tracker::models::{AppData, GoalKind, GoalStatus};
use deposit_tracker::storage::{export_json, parse_import, ImportMode, LocalStore, Storage};
use deposit_tracker::tracker::Tracker;

use common::{assert_consistent, day, test_time, tracker_with};

/// Storage that keeps the last saved state in memory.
#[derive(Default)]
struct MockStorage {
    saved: Option<AppData>,
    saves: usize,
}

#[async_trait]
impl Storage for MockStorage {
    async fn load(&mut self) -> Result<AppData> {
        Ok(self.saved.clone().unwrap_or_default())
    }

    async fn save(&mut self, data: &AppData) -> Result<()> {
        self.saved = Some(data.clone());
        self.saves += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[test]
fn test_scenarios_append_and_edit() {
    let mut t = tracker_with(&[5.0]);
    let first = &t.data.days[0];
    assert_eq!(first.sequence_number, 1);
    assert!((first.amount - 15.0).abs() < 1e-9);
    assert!((first.balance - 45.0).abs() < 1e-9);

    t.add_day(EntryInput::Percentage(-2.0), Some(day(2024, 1, 2))).unwrap();
    let second = &t.data.days[1];
    assert_eq!(second.sequence_number, 2);
    assert!((second.amount + 9.0).abs() < 1e-9);
    assert!((second.balance - 36.0).abs() < 1e-9);

    t.edit_day(0, EntryInput::Percentage(10.0)).unwrap();
    assert!((t.data.days[0].amount - 30.0).abs() < 1e-9);
    assert!((t.data.days[0].balance - 60.0).abs() < 1e-9);
    assert!((t.data.days[1].amount + 12.0).abs() < 1e-9);
    assert!((t.data.days[1].balance - 48.0).abs() < 1e-9);
    assert!((t.data.deposit - 48.0).abs() < 1e-9);
}

#[test]
fn test_balance_invariant_through_a_session() {
    let mut t = tracker_with(&[5.0, -2.0, 1.5, 3.0, -0.5, 2.0]);
    t.edit_day(2, EntryInput::Amount(-3.0)).unwrap();
    t.archive_day(1).unwrap();
    t.delete_day(3).unwrap();
    t.set_leverage(5.0).unwrap();
    t.restore_day(0).unwrap();
    t.set_initial_deposit(50.0).unwrap();

    assert_consistent(&t.data.days, 50.0, 5.0);
    assert!((t.data.deposit - t.data.days.last().unwrap().balance).abs() < 1e-9);
    // restored 2024-01-02 lands back in date order
    assert_eq!(t.data.days[1].date, day(2024, 1, 2));
}

#[test]
fn test_goal_lifecycle() {
    let mut t = tracker_with(&[]);
    t.add_goal(GoalDraft::new("Double", GoalKind::DepositTarget, 60.0)).unwrap();

    let mut streak = GoalDraft::new("Three in a row", GoalKind::ConsecutiveProfitableDaysTarget, 3.0);
    streak.duration = Some((1, deposit_tracker::models::DurationUnit::Weeks));
    t.add_goal(streak).unwrap();

    t.add_day(EntryInput::Percentage(1.0), None).unwrap();
    t.add_day(EntryInput::Percentage(2.0), None).unwrap();
    let summaries = t.goal_summaries();
    assert!((summaries[0].progress - (39.6 - 30.0) / 30.0 * 100.0).abs() < 1e-6);
    assert_eq!(summaries[1].days_remaining, Some(7));

    // a week and a day later the streak goal has expired
    t.sim_time = Some(test_time() + Duration::days(8));
    t.refresh_goals();
    assert_eq!(t.data.goals[1].status(), GoalStatus::Failed);
    assert_eq!(t.data.goals[0].status(), GoalStatus::Active);

    // editing brings it back to life
    t.edit_goal(1, GoalDraft::new("Three in a row", GoalKind::ConsecutiveProfitableDaysTarget, 2.0))
        .unwrap();
    assert_eq!(t.data.goals[1].status(), GoalStatus::Completed);

    t.complete_goal(0).unwrap();
    assert_eq!(t.data.goals[0].status(), GoalStatus::Completed);
    t.delete_goal(0).unwrap();
    assert_eq!(t.data.goals.len(), 1);
}

#[test]
fn test_export_import_merge() {
    let source = tracker_with(&[5.0, -2.0]);
    let exported = export_json(&source.data).unwrap();

    let mut target = tracker_with(&[1.0]);
    target.data.days[0].date = day(2023, 12, 31);
    let imported = parse_import(&exported).unwrap();
    target.import(imported, ImportMode::Merge).unwrap();

    // 2023-12-31 is day 1, then both imported days; the imported day 1 has
    // a different date, so it is not a duplicate
    assert_eq!(target.data.days.len(), 3);
    assert_eq!(target.data.days[0].date, day(2023, 12, 31));
    assert_consistent(&target.data.days, 30.0, 10.0);
}

#[test]
fn test_import_replace_and_bad_file() {
    let mut t = tracker_with(&[5.0]);
    let before = t.data.clone();
    assert!(parse_import(r#"{"days": []}"#).is_err());
    assert_eq!(t.data, before);

    let replacement = parse_import(r#"{"deposit": 100, "initialDeposit": 100, "leverage": 2}"#).unwrap();
    t.import(replacement, ImportMode::Replace).unwrap();
    assert!(t.data.days.is_empty());
    assert_eq!(t.data.leverage, 2.0);
    assert_eq!(t.data.deposit, 100.0);
}

#[tokio::test]
async fn test_persist_after_each_action() {
    let mut store = MockStorage::default();
    let mut t = Tracker::new(store.load().await.unwrap());
    t.sim_time = Some(test_time());

    t.add_day(EntryInput::Percentage(5.0), None).unwrap();
    store.save(&t.data).await.unwrap();
    t.add_day(EntryInput::Amount(-9.0), None).unwrap();
    store.save(&t.data).await.unwrap();

    let reloaded = Tracker::new(store.load().await.unwrap());
    assert_eq!(store.saves, 2);
    assert_eq!(reloaded.data.days.len(), 2);
    assert!((reloaded.data.deposit - 36.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_local_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local_store.json");

    let t = tracker_with(&[5.0, -2.0]);
    let mut store = LocalStore::new(&path, AppData::default());
    store.save(&t.data).await.unwrap();

    let mut reopened = LocalStore::new(&path, AppData::default());
    let loaded = reopened.load().await.unwrap();
    assert_eq!(loaded.days, t.data.days);
    assert_eq!(loaded.deposit, 36.0);
}
