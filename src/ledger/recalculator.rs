use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::{check_index, LedgerError, Result};
use crate::ledger::input::EntryInput;
use crate::models::{ArchivedDayEntry, DayEntry};

/// Active days plus the balance they produce.
#[derive(Debug, Clone, PartialEq)]
pub struct Recalculation {
    pub days: Vec<DayEntry>,
    pub balance: f64,
}

/// Result of an operation that moves entries between the ledger and the archive.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveRecalculation {
    pub days: Vec<DayEntry>,
    pub archive: Vec<ArchivedDayEntry>,
    pub balance: f64,
}

pub fn amount_for(previous_balance: f64, leverage: f64, percentage: f64) -> f64 {
    previous_balance * leverage * percentage / 100.0
}

/// Balance the entry at `index` starts from.
pub fn previous_balance_at(days: &[DayEntry], index: usize, initial_balance: f64) -> f64 {
    if index == 0 {
        initial_balance
    } else {
        days.get(index - 1)
            .map(|d| d.balance)
            .unwrap_or(initial_balance)
    }
}

pub fn current_balance(days: &[DayEntry], initial_balance: f64) -> f64 {
    days.last().map(|d| d.balance).unwrap_or(initial_balance)
}

/// Re-derive numbering, amount and balance for `entries[start..]`.
///
/// Percentages are the only input; everything else downstream of `start`
/// is rebuilt from them and `previous_balance`.
pub fn recompute_forward(
    entries: &mut [DayEntry],
    start: usize,
    previous_balance: f64,
    leverage: f64,
) {
    let mut previous = previous_balance;
    for (index, entry) in entries.iter_mut().enumerate().skip(start) {
        entry.sequence_number = (index + 1) as u32;
        entry.amount = amount_for(previous, leverage, entry.percentage);
        entry.balance = previous + entry.amount;
        previous = entry.balance;
    }
}

fn ensure_settings(initial_balance: f64, leverage: f64) -> Result<()> {
    if !initial_balance.is_finite() {
        return Err(LedgerError::InvalidInput(
            "initial balance must be a finite number".to_string(),
        ));
    }
    if !leverage.is_finite() {
        return Err(LedgerError::InvalidInput(
            "leverage must be a finite number".to_string(),
        ));
    }
    Ok(())
}

fn finish(days: Vec<DayEntry>, initial_balance: f64) -> Recalculation {
    let balance = current_balance(&days, initial_balance);
    Recalculation { days, balance }
}

/// Add a new day at the end of the ledger.
///
/// A zero percentage is treated as an empty form field here, although edits
/// accept it.
pub fn append(
    days: &[DayEntry],
    initial_balance: f64,
    leverage: f64,
    input: EntryInput,
    date: NaiveDate,
) -> Result<Recalculation> {
    ensure_settings(initial_balance, leverage)?;
    if let EntryInput::Percentage(p) = input {
        if p == 0.0 {
            return Err(LedgerError::InvalidInput("no value entered".to_string()));
        }
    }

    let previous = current_balance(days, initial_balance);
    let percentage = input.to_percentage(previous, leverage)?;

    let mut next = days.to_vec();
    next.push(DayEntry::new(date, percentage));
    let start = next.len() - 1;
    recompute_forward(&mut next, start, previous, leverage);
    Ok(finish(next, initial_balance))
}

/// Replace the result of day `index` and cascade to every later day.
pub fn edit(
    days: &[DayEntry],
    initial_balance: f64,
    leverage: f64,
    index: usize,
    input: EntryInput,
) -> Result<Recalculation> {
    ensure_settings(initial_balance, leverage)?;
    check_index(index, days.len())?;

    let previous = previous_balance_at(days, index, initial_balance);
    let percentage = input.to_percentage(previous, leverage)?;

    let mut next = days.to_vec();
    next[index].percentage = percentage;
    recompute_forward(&mut next, index, previous, leverage);
    Ok(finish(next, initial_balance))
}

/// Change the date of a day. Dates do not take part in the balance chain,
/// so nothing is reordered or recomputed.
pub fn redate(days: &[DayEntry], index: usize, date: NaiveDate) -> Result<Vec<DayEntry>> {
    check_index(index, days.len())?;
    let mut next = days.to_vec();
    next[index].date = date;
    Ok(next)
}

pub fn delete(
    days: &[DayEntry],
    initial_balance: f64,
    leverage: f64,
    index: usize,
) -> Result<Recalculation> {
    ensure_settings(initial_balance, leverage)?;
    check_index(index, days.len())?;

    let mut next = days.to_vec();
    next.remove(index);
    let previous = previous_balance_at(&next, index, initial_balance);
    recompute_forward(&mut next, index, previous, leverage);
    Ok(finish(next, initial_balance))
}

/// Same as [`delete`], but the removed day is kept at the end of `archive`.
pub fn archive(
    days: &[DayEntry],
    archive: &[ArchivedDayEntry],
    initial_balance: f64,
    leverage: f64,
    index: usize,
    archived_at: Option<DateTime<Utc>>,
) -> Result<ArchiveRecalculation> {
    check_index(index, days.len())?;
    let removed = days[index].clone();
    let recalculated = delete(days, initial_balance, leverage, index)?;

    let mut next_archive = archive.to_vec();
    next_archive.push(removed.into_archived(archived_at));

    Ok(ArchiveRecalculation {
        days: recalculated.days,
        archive: next_archive,
        balance: recalculated.balance,
    })
}

/// Drop an archived day for good.
pub fn delete_archived(
    archive: &[ArchivedDayEntry],
    archive_index: usize,
) -> Result<Vec<ArchivedDayEntry>> {
    check_index(archive_index, archive.len())?;
    let mut next = archive.to_vec();
    next.remove(archive_index);
    Ok(next)
}

/// Insert `entry` right after the last day dated on or before it, or first
/// when every day is later. Dated appends and redates can leave the ledger out
/// of date order; the rule still picks one position, but date order is only
/// kept when days were entered in order.
pub(crate) fn insert_by_date(days: &mut Vec<DayEntry>, entry: DayEntry) {
    let position = days
        .iter()
        .rposition(|d| d.date <= entry.date)
        .map_or(0, |i| i + 1);
    days.insert(position, entry);
}

/// Bring an archived day back, placed by [`insert_by_date`]. The whole
/// ledger is renumbered and recomputed.
pub fn restore(
    days: &[DayEntry],
    archive: &[ArchivedDayEntry],
    initial_balance: f64,
    leverage: f64,
    archive_index: usize,
) -> Result<ArchiveRecalculation> {
    ensure_settings(initial_balance, leverage)?;
    check_index(archive_index, archive.len())?;

    let mut next_archive = archive.to_vec();
    let entry = next_archive.remove(archive_index).into_active();

    let mut next = days.to_vec();
    insert_by_date(&mut next, entry);
    recompute_forward(&mut next, 0, initial_balance, leverage);

    let balance = current_balance(&next, initial_balance);
    Ok(ArchiveRecalculation {
        days: next,
        archive: next_archive,
        balance,
    })
}

/// Recompute the whole ledger, e.g. after the initial deposit or leverage changed.
pub fn rebase(days: &[DayEntry], initial_balance: f64, leverage: f64) -> Result<Recalculation> {
    ensure_settings(initial_balance, leverage)?;
    let mut next = days.to_vec();
    recompute_forward(&mut next, 0, initial_balance, leverage);
    Ok(finish(next, initial_balance))
}
