use chrono::NaiveDate;
use serde::Serialize;

use crate::goals::trailing_streak;
use crate::models::{AppData, DayEntry};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayHighlight {
    pub sequence_number: u32,
    pub date: NaiveDate,
    pub percentage: f64,
    pub amount: f64,
}

impl From<&DayEntry> for DayHighlight {
    fn from(d: &DayEntry) -> Self {
        Self {
            sequence_number: d.sequence_number,
            date: d.date,
            percentage: d.percentage,
            amount: d.amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStats {
    // Performance
    pub initial_balance: f64,
    pub current_balance: f64,
    pub total_profit: f64,
    pub total_return_pct: f64,

    // Days
    pub total_days: usize,
    pub profitable_days: usize,
    pub losing_days: usize,
    pub win_rate: f64,
    pub avg_percentage: f64,
    pub best_day: Option<DayHighlight>,
    pub worst_day: Option<DayHighlight>,

    // Risk
    pub max_drawdown: f64,
    pub max_drawdown_pct: f64,

    // Consistency
    pub current_streak: usize,
    pub longest_streak: usize,
    pub target_hits: usize,
    pub target_hit_rate: f64,
}

impl LedgerStats {
    pub fn from_days(days: &[DayEntry], initial_balance: f64, daily_target: f64) -> Self {
        let current_balance = days.last().map(|d| d.balance).unwrap_or(initial_balance);
        let total_profit = current_balance - initial_balance;
        let total_days = days.len();

        let profitable_days = days.iter().filter(|d| d.is_profitable()).count();
        let losing_days = days.iter().filter(|d| d.percentage < 0.0).count();
        let win_rate = if total_days > 0 {
            profitable_days as f64 / total_days as f64 * 100.0
        } else {
            0.0
        };
        let avg_percentage = if total_days > 0 {
            days.iter().map(|d| d.percentage).sum::<f64>() / total_days as f64
        } else {
            0.0
        };

        // Ties go to the earliest day
        let best_day = days
            .iter()
            .reduce(|best, d| if d.amount > best.amount { d } else { best })
            .map(DayHighlight::from);
        let worst_day = days
            .iter()
            .reduce(|worst, d| if d.amount < worst.amount { d } else { worst })
            .map(DayHighlight::from);

        let (max_drawdown, max_drawdown_pct) = max_drawdown(days, initial_balance);

        let mut longest_streak = 0;
        let mut run = 0;
        for d in days {
            if d.is_profitable() {
                run += 1;
                longest_streak = longest_streak.max(run);
            } else {
                run = 0;
            }
        }

        let target_hits = days.iter().filter(|d| d.percentage >= daily_target).count();
        let target_hit_rate = if total_days > 0 {
            target_hits as f64 / total_days as f64 * 100.0
        } else {
            0.0
        };

        LedgerStats {
            initial_balance,
            current_balance,
            total_profit,
            total_return_pct: if initial_balance > 0.0 {
                total_profit / initial_balance * 100.0
            } else {
                0.0
            },
            total_days,
            profitable_days,
            losing_days,
            win_rate,
            avg_percentage,
            best_day,
            worst_day,
            max_drawdown,
            max_drawdown_pct,
            current_streak: trailing_streak(days),
            longest_streak,
            target_hits,
            target_hit_rate,
        }
    }

    pub fn from_data(data: &AppData) -> Self {
        Self::from_days(&data.days, data.initial_deposit, data.daily_target)
    }

    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(50));
        println!("  LEDGER STATS");
        println!("{}", "=".repeat(50));
        println!("  Initial:     ${:.2}", self.initial_balance);
        println!("  Current:     ${:.2}", self.current_balance);
        println!("  Profit:      ${:+.2}", self.total_profit);
        println!("  Return:      {:+.1}%", self.total_return_pct);
        println!();
        println!("  DAYS");
        println!("  ───────────────────────────────────");
        println!("  Total:       {}", self.total_days);
        println!("  Win/Loss:    {} / {}", self.profitable_days, self.losing_days);
        println!("  Win Rate:    {:.1}%", self.win_rate);
        println!("  Avg Day:     {:+.2}%", self.avg_percentage);
        if let Some(best) = &self.best_day {
            println!(
                "  Best:        #{} {} ${:+.2} ({:+.2}%)",
                best.sequence_number, best.date, best.amount, best.percentage
            );
        }
        if let Some(worst) = &self.worst_day {
            println!(
                "  Worst:       #{} {} ${:+.2} ({:+.2}%)",
                worst.sequence_number, worst.date, worst.amount, worst.percentage
            );
        }
        println!();
        println!("  RISK");
        println!("  ───────────────────────────────────");
        println!("  Max DD:      ${:.2} ({:.1}%)", self.max_drawdown, self.max_drawdown_pct);
        println!();
        println!("  CONSISTENCY");
        println!("  ───────────────────────────────────");
        println!("  Streak:      {} (best {})", self.current_streak, self.longest_streak);
        println!(
            "  Target hits: {} ({:.1}%)",
            self.target_hits, self.target_hit_rate
        );
        println!("{}", "=".repeat(50));
    }
}

/// Largest peak-to-trough fall of the balance curve, starting from the
/// initial balance. Returns the absolute fall and its share of the peak.
pub fn max_drawdown(days: &[DayEntry], initial_balance: f64) -> (f64, f64) {
    let mut peak = initial_balance;
    let mut max_dd = 0.0f64;
    let mut max_dd_pct = 0.0f64;

    for d in days {
        if d.balance > peak {
            peak = d.balance;
        }
        let dd = peak - d.balance;
        if dd > max_dd {
            max_dd = dd;
            max_dd_pct = if peak > 0.0 { dd / peak * 100.0 } else { 0.0 };
        }
    }

    (max_dd, max_dd_pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ledger_from_percentages;

    #[test]
    fn empty_ledger() {
        let stats = LedgerStats::from_days(&[], 30.0, 3.0);
        assert_eq!(stats.total_days, 0);
        assert_eq!(stats.current_balance, 30.0);
        assert_eq!(stats.win_rate, 0.0);
        assert!(stats.best_day.is_none());
        assert_eq!(stats.max_drawdown, 0.0);
    }

    #[test]
    fn counts_and_extremes() {
        // balances: 45, 36, 46.8, 42.12
        let days = ledger_from_percentages(&[5.0, -2.0, 3.0, -1.0], 30.0, 10.0);
        let stats = LedgerStats::from_days(&days, 30.0, 3.0);

        assert_eq!(stats.total_days, 4);
        assert_eq!(stats.profitable_days, 2);
        assert_eq!(stats.losing_days, 2);
        assert!((stats.win_rate - 50.0).abs() < 1e-9);
        assert_eq!(stats.best_day.as_ref().unwrap().sequence_number, 1);
        assert_eq!(stats.worst_day.as_ref().unwrap().sequence_number, 2);
        assert_eq!(stats.target_hits, 2);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 1);
        assert!((stats.total_profit - 12.12).abs() < 1e-9);
    }

    #[test]
    fn drawdown_from_peak() {
        let days = ledger_from_percentages(&[5.0, -2.0, 3.0, -1.0], 30.0, 10.0);
        let (dd, pct) = max_drawdown(&days, 30.0);
        // peak 46.8 -> 42.12 is 4.68; peak 45 -> 36 is 9.0
        assert!((dd - 9.0).abs() < 1e-9);
        assert!((pct - 20.0).abs() < 1e-9);
    }
}
