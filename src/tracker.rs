use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use crate::analytics::{days_to_reach, project, LedgerStats, ProjectionPoint};
use crate::errors::{LedgerError, Result};
use crate::goals::{self, GoalDraft, GoalSummary};
use crate::ledger::{self, Confirm, EntryInput, LedgerSet, Recalculation};
use crate::models::{AppData, DayEntry, GoalStatus};
use crate::storage::ImportMode;

/// Owns one snapshot of the state and applies user actions to it.
///
/// Every action runs the ledger recalculation first, then sets the current
/// balance, then re-evaluates all goals. Persisting is left to the caller.
pub struct Tracker {
    pub data: AppData,
    /// When set, used instead of Utc::now() (tests and replays)
    pub sim_time: Option<DateTime<Utc>>,
}

impl Tracker {
    pub fn new(data: AppData) -> Self {
        let mut tracker = Self {
            data,
            sim_time: None,
        };
        tracker.data.deposit = tracker.data.current_balance();
        tracker
    }

    /// Get the current time (sim_time when set, Utc::now() otherwise)
    fn now(&self) -> DateTime<Utc> {
        self.sim_time.unwrap_or_else(Utc::now)
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    pub fn balance(&self) -> f64 {
        self.data.deposit
    }

    fn apply(&mut self, r: Recalculation) {
        self.data.days = r.days;
        self.data.deposit = r.balance;
        self.refresh_goals();
    }

    // ── Days ────────────────────────────────────────────

    /// Append a day. `date` defaults to today.
    pub fn add_day(&mut self, input: EntryInput, date: Option<NaiveDate>) -> Result<&DayEntry> {
        let date = date.unwrap_or_else(|| self.today());
        let d = &self.data;
        let r = ledger::append(&d.days, d.initial_deposit, d.leverage, input, date)?;
        self.apply(r);

        let last = self.data.days.len() - 1;
        let entry = &self.data.days[last];
        info!(
            "Day #{} {} | {:+.2}% | ${:+.2} | Balance: ${:.2}",
            entry.sequence_number, entry.date, entry.percentage, entry.amount, entry.balance
        );
        Ok(entry)
    }

    pub fn edit_day(&mut self, index: usize, input: EntryInput) -> Result<()> {
        let d = &self.data;
        let r = ledger::edit(&d.days, d.initial_deposit, d.leverage, index, input)?;
        self.apply(r);
        info!("Day #{} edited | Balance: ${:.2}", index + 1, self.data.deposit);
        Ok(())
    }

    pub fn redate_day(&mut self, index: usize, date: NaiveDate) -> Result<()> {
        self.data.days = ledger::redate(&self.data.days, index, date)?;
        info!("Day #{} moved to {}", index + 1, date);
        Ok(())
    }

    pub fn delete_day(&mut self, index: usize) -> Result<()> {
        let d = &self.data;
        let r = ledger::delete(&d.days, d.initial_deposit, d.leverage, index)?;
        self.apply(r);
        info!("Day #{} deleted | Balance: ${:.2}", index + 1, self.data.deposit);
        Ok(())
    }

    pub fn archive_day(&mut self, index: usize) -> Result<()> {
        let now = self.now();
        let d = &self.data;
        let r = ledger::archive(
            &d.days,
            &d.archived_days,
            d.initial_deposit,
            d.leverage,
            index,
            Some(now),
        )?;
        self.data.archived_days = r.archive;
        self.apply(Recalculation {
            days: r.days,
            balance: r.balance,
        });
        info!("Day #{} archived | Balance: ${:.2}", index + 1, self.data.deposit);
        Ok(())
    }

    pub fn restore_day(&mut self, archive_index: usize) -> Result<()> {
        let d = &self.data;
        let r = ledger::restore(
            &d.days,
            &d.archived_days,
            d.initial_deposit,
            d.leverage,
            archive_index,
        )?;
        self.data.archived_days = r.archive;
        self.apply(Recalculation {
            days: r.days,
            balance: r.balance,
        });
        info!("Archived day restored | Balance: ${:.2}", self.data.deposit);
        Ok(())
    }

    /// Permanently drop an archived day.
    pub fn purge_archived(&mut self, archive_index: usize) -> Result<()> {
        self.data.archived_days = ledger::delete_archived(&self.data.archived_days, archive_index)?;
        info!("Archived entry {} deleted", archive_index + 1);
        Ok(())
    }

    // ── Settings ────────────────────────────────────────

    pub fn set_initial_deposit(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(LedgerError::InvalidInput(
                "initial deposit must be a non-negative number".to_string(),
            ));
        }
        let r = ledger::rebase(&self.data.days, value, self.data.leverage)?;
        self.data.initial_deposit = value;
        self.apply(r);
        info!("Initial deposit set to ${:.2} | Balance: ${:.2}", value, self.data.deposit);
        Ok(())
    }

    pub fn set_leverage(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() || value <= 0.0 {
            return Err(LedgerError::InvalidInput(
                "leverage must be a positive number".to_string(),
            ));
        }
        let r = ledger::rebase(&self.data.days, self.data.initial_deposit, value)?;
        self.data.leverage = value;
        self.apply(r);
        info!("Leverage set to x{} | Balance: ${:.2}", value, self.data.deposit);
        Ok(())
    }

    pub fn set_daily_target(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(LedgerError::InvalidInput(
                "daily target must be a finite number".to_string(),
            ));
        }
        self.data.daily_target = value;
        info!("Daily target set to {}%", value);
        Ok(())
    }

    // ── Goals ───────────────────────────────────────────

    pub fn add_goal(&mut self, draft: GoalDraft) -> Result<()> {
        let name = draft.name.clone();
        self.data.goals = goals::add_goal(&self.data.goals, draft, self.now())?;
        info!("Goal added: {}", name.trim());
        self.refresh_goals();
        Ok(())
    }

    pub fn edit_goal(&mut self, index: usize, draft: GoalDraft) -> Result<()> {
        self.data.goals = goals::edit_goal(&self.data.goals, index, draft)?;
        info!("Goal {} edited", index + 1);
        self.refresh_goals();
        Ok(())
    }

    pub fn delete_goal(&mut self, index: usize) -> Result<()> {
        self.data.goals = goals::delete_goal(&self.data.goals, index)?;
        info!("Goal {} deleted", index + 1);
        Ok(())
    }

    pub fn complete_goal(&mut self, index: usize) -> Result<()> {
        self.data.goals = goals::complete_goal(&self.data.goals, index, self.now())?;
        info!("Goal {} marked complete", index + 1);
        Ok(())
    }

    /// Re-run the status check over every goal and log what changed.
    pub fn refresh_goals(&mut self) {
        let now = self.now();
        let d = &self.data;
        let next = goals::evaluate_all(&d.goals, d.deposit, d.initial_deposit, &d.days, now);

        for (before, after) in self.data.goals.iter().zip(&next) {
            if before.status() == after.status() {
                continue;
            }
            match after.status() {
                GoalStatus::Completed => info!("Goal completed: {}", after.name),
                GoalStatus::Failed => warn!("Goal failed: {} (deadline passed)", after.name),
                GoalStatus::Active => {}
            }
        }
        self.data.goals = next;
    }

    /// Give goals loaded without a creation time the current time, so
    /// duration deadlines stop moving. Returns whether any goal changed and
    /// the state should be saved.
    pub fn stamp_missing_created_at(&mut self) -> bool {
        let now = self.now();
        let mut stamped = 0;
        for goal in &mut self.data.goals {
            if goal.stamp_created_at(now) {
                stamped += 1;
            }
        }
        if stamped > 0 {
            info!("Stamped creation time on {} goal(s)", stamped);
        }
        stamped > 0
    }

    pub fn goal_summaries(&self) -> Vec<GoalSummary> {
        let now = self.now();
        let d = &self.data;
        d.goals
            .iter()
            .map(|g| goals::goal_summary(g, d.deposit, d.initial_deposit, &d.days, now))
            .collect()
    }

    // ── Import ──────────────────────────────────────────

    pub fn import(&mut self, imported: AppData, mode: ImportMode) -> Result<()> {
        match mode {
            ImportMode::Replace => {
                self.data = imported;
                self.data.deposit = self.data.current_balance();
                self.stamp_missing_created_at();
                self.refresh_goals();
            }
            ImportMode::Merge => {
                let d = &self.data;
                let out = ledger::merge_import(
                    LedgerSet {
                        days: &d.days,
                        archive: &d.archived_days,
                        goals: &d.goals,
                    },
                    LedgerSet {
                        days: &imported.days,
                        archive: &imported.archived_days,
                        goals: &imported.goals,
                    },
                    d.initial_deposit,
                    d.leverage,
                )?;
                self.data.archived_days = out.archive;
                self.data.goals = out.goals;
                self.stamp_missing_created_at();
                self.apply(Recalculation {
                    days: out.days,
                    balance: out.balance,
                });
            }
        }
        info!(
            "Imported ({}) | {} days | Balance: ${:.2}",
            mode,
            self.data.days.len(),
            self.data.deposit
        );
        Ok(())
    }

    /// Merge imported days one by one, asking `confirm` about every date
    /// that already has entries. Archive and goals merge as in [`Tracker::import`].
    pub fn import_interactive(&mut self, imported: AppData, confirm: &mut dyn Confirm) -> Result<()> {
        let d = &self.data;
        let rest = ledger::merge_import(
            LedgerSet {
                days: &[],
                archive: &d.archived_days,
                goals: &d.goals,
            },
            LedgerSet {
                days: &[],
                archive: &imported.archived_days,
                goals: &imported.goals,
            },
            d.initial_deposit,
            d.leverage,
        )?;
        let r = ledger::interactive_merge(
            &d.days,
            &imported.days,
            d.initial_deposit,
            d.leverage,
            confirm,
        )?;

        self.data.archived_days = rest.archive;
        self.data.goals = rest.goals;
        self.stamp_missing_created_at();
        self.apply(r);
        info!(
            "Imported (interactive) | {} days | Balance: ${:.2}",
            self.data.days.len(),
            self.data.deposit
        );
        Ok(())
    }

    // ── Analytics ───────────────────────────────────────

    pub fn stats(&self) -> LedgerStats {
        LedgerStats::from_data(&self.data)
    }

    pub fn projection(&self, days: u32) -> Vec<ProjectionPoint> {
        project(self.data.deposit, self.data.leverage, self.data.daily_target, days)
    }

    pub fn days_to_reach(&self, target: f64) -> Option<u32> {
        days_to_reach(self.data.deposit, self.data.leverage, self.data.daily_target, target)
    }
}
