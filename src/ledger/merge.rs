use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::errors::Result;
use crate::ledger::recalculator::{insert_by_date, rebase, Recalculation};
use crate::models::{ArchivedDayEntry, DayEntry, Goal};

/// Borrowed view of the three mergeable collections.
#[derive(Debug, Clone, Copy)]
pub struct LedgerSet<'a> {
    pub days: &'a [DayEntry],
    pub archive: &'a [ArchivedDayEntry],
    pub goals: &'a [Goal],
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub days: Vec<DayEntry>,
    pub archive: Vec<ArchivedDayEntry>,
    pub goals: Vec<Goal>,
    pub balance: f64,
}

/// Union of the current state and an imported file.
///
/// Days and archived days are de-duplicated on `(day number, date)` and goals
/// on `(name, kind)`; the current state wins. These keys are weak: two
/// unrelated entries that happen to share a number and a date are treated as
/// the same entry, and the same trade renumbered elsewhere is not detected.
/// Kept as-is for compatibility with files exported by the web client.
pub fn merge_import(
    current: LedgerSet<'_>,
    imported: LedgerSet<'_>,
    initial_balance: f64,
    leverage: f64,
) -> Result<MergeOutcome> {
    let mut seen = HashSet::new();
    let mut days: Vec<DayEntry> = current
        .days
        .iter()
        .chain(imported.days)
        .filter(|d| seen.insert(d.merge_key()))
        .cloned()
        .collect();
    days.sort_by_key(|d| d.date);
    let recalculated = rebase(&days, initial_balance, leverage)?;

    let mut seen = HashSet::new();
    let archive = current
        .archive
        .iter()
        .chain(imported.archive)
        .filter(|d| seen.insert(d.merge_key()))
        .cloned()
        .collect();

    let mut seen = HashSet::new();
    let goals = current
        .goals
        .iter()
        .chain(imported.goals)
        .filter(|g| seen.insert(g.merge_key()))
        .cloned()
        .collect();

    Ok(MergeOutcome {
        days: recalculated.days,
        archive,
        goals,
        balance: recalculated.balance,
    })
}

/// What the user wants done when an imported day lands on a date that
/// already has entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictChoice {
    Replace,
    AddNew,
    Skip,
}

impl ConflictChoice {
    pub const ALL: [ConflictChoice; 3] = [
        ConflictChoice::Replace,
        ConflictChoice::AddNew,
        ConflictChoice::Skip,
    ];

    pub fn from_str_loose(s: &str) -> Option<ConflictChoice> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Some(ConflictChoice::Replace),
            "add" | "add-new" | "addnew" => Some(ConflictChoice::AddNew),
            "skip" => Some(ConflictChoice::Skip),
            _ => None,
        }
    }
}

impl fmt::Display for ConflictChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictChoice::Replace => write!(f, "replace"),
            ConflictChoice::AddNew => write!(f, "add-new"),
            ConflictChoice::Skip => write!(f, "skip"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MergeAction {
    Insert(DayEntry),
    /// Drop every existing entry on `date` and put `with` in their place.
    Replace { date: NaiveDate, with: DayEntry },
    Skip,
}

/// Existing entries sharing `date`.
pub fn conflict_group(days: &[DayEntry], date: NaiveDate) -> Vec<DayEntry> {
    days.iter().filter(|d| d.date == date).cloned().collect()
}

pub fn resolve_conflict(
    existing_group: &[DayEntry],
    imported: &DayEntry,
    choice: ConflictChoice,
) -> MergeAction {
    if existing_group.is_empty() {
        return MergeAction::Insert(imported.clone());
    }
    match choice {
        ConflictChoice::Replace => MergeAction::Replace {
            date: imported.date,
            with: imported.clone(),
        },
        ConflictChoice::AddNew => MergeAction::Insert(imported.clone()),
        ConflictChoice::Skip => MergeAction::Skip,
    }
}

/// Apply resolved actions in order, then recompute the whole ledger.
///
/// Only the first replacement on a date removes the existing group; later
/// replacements on the same date are added next to it.
pub fn apply_merge_actions(
    days: &[DayEntry],
    initial_balance: f64,
    leverage: f64,
    actions: Vec<MergeAction>,
) -> Result<Recalculation> {
    let mut next = days.to_vec();
    let mut replaced = HashSet::new();

    for action in actions {
        match action {
            MergeAction::Insert(entry) => insert_by_date(&mut next, entry),
            MergeAction::Replace { date, with } => {
                if replaced.insert(date) {
                    next.retain(|d| d.date != date);
                }
                insert_by_date(&mut next, with);
            }
            MergeAction::Skip => {}
        }
    }

    rebase(&next, initial_balance, leverage)
}

/// Asks the user how to handle one date conflict. The ledger code never
/// waits on it; implementations decide how (and whether) to prompt.
pub trait Confirm {
    fn confirm(&mut self, title: &str, message: &str, options: &[ConflictChoice]) -> ConflictChoice;
}

/// Answers every conflict the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedChoice(pub ConflictChoice);

impl Confirm for FixedChoice {
    fn confirm(&mut self, _title: &str, _message: &str, _options: &[ConflictChoice]) -> ConflictChoice {
        self.0
    }
}

/// Merge imported days one by one, consulting `confirm` for each date that
/// already exists in the current ledger.
pub fn interactive_merge(
    days: &[DayEntry],
    imported: &[DayEntry],
    initial_balance: f64,
    leverage: f64,
    confirm: &mut dyn Confirm,
) -> Result<Recalculation> {
    let actions = imported
        .iter()
        .map(|entry| {
            let group = conflict_group(days, entry.date);
            if group.is_empty() {
                return MergeAction::Insert(entry.clone());
            }
            let message = format!(
                "{} existing entr{} on {}; imported day has {:+.2}%",
                group.len(),
                if group.len() == 1 { "y" } else { "ies" },
                entry.date,
                entry.percentage
            );
            let choice = confirm.confirm("Date conflict", &message, &ConflictChoice::ALL);
            resolve_conflict(&group, entry, choice)
        })
        .collect();

    apply_merge_actions(days, initial_balance, leverage, actions)
}
