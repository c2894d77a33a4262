use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One trading day's result in the active ledger.
///
/// `balance` is derived: it is always the previous entry's balance (or the
/// initial deposit) plus `amount`, and `amount` is always derived from
/// `percentage`. Only the ledger recalculator writes these two fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayEntry {
    #[serde(rename = "day")]
    pub sequence_number: u32,
    pub date: NaiveDate,
    pub percentage: f64,
    #[serde(default)]
    pub amount: f64,
    #[serde(rename = "deposit", default)]
    pub balance: f64,
}

impl DayEntry {
    pub fn new(date: NaiveDate, percentage: f64) -> Self {
        Self {
            sequence_number: 0,
            date,
            percentage,
            amount: 0.0,
            balance: 0.0,
        }
    }

    pub fn is_profitable(&self) -> bool {
        self.percentage > 0.0
    }

    /// Key used to detect duplicates on merge import.
    pub fn merge_key(&self) -> (u32, NaiveDate) {
        (self.sequence_number, self.date)
    }

    /// Move out of the active ledger. The balance is dropped since it stops
    /// meaning anything once the entry no longer participates in the chain.
    pub fn into_archived(self, archived_at: Option<DateTime<Utc>>) -> ArchivedDayEntry {
        ArchivedDayEntry {
            sequence_number: self.sequence_number,
            date: self.date,
            percentage: self.percentage,
            amount: self.amount,
            archived_at,
        }
    }
}

/// A day moved out of the active ledger. Inert until restored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedDayEntry {
    #[serde(rename = "day")]
    pub sequence_number: u32,
    pub date: NaiveDate,
    pub percentage: f64,
    #[serde(default)]
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl ArchivedDayEntry {
    pub fn merge_key(&self) -> (u32, NaiveDate) {
        (self.sequence_number, self.date)
    }

    /// Balance and amount are placeholders until the ledger recomputes them.
    pub fn into_active(self) -> DayEntry {
        DayEntry {
            sequence_number: self.sequence_number,
            date: self.date,
            percentage: self.percentage,
            amount: self.amount,
            balance: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_legacy_field_names() {
        let entry = DayEntry {
            sequence_number: 2,
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            percentage: -2.0,
            amount: -9.0,
            balance: 36.0,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["day"], 2);
        assert_eq!(json["date"], "2024-03-05");
        assert_eq!(json["deposit"], 36.0);
    }

    #[test]
    fn archiving_drops_balance() {
        let entry = DayEntry {
            sequence_number: 1,
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            percentage: 5.0,
            amount: 15.0,
            balance: 45.0,
        };
        let archived = entry.clone().into_archived(None);
        let json = serde_json::to_value(&archived).unwrap();
        assert!(json.get("deposit").is_none());
        assert_eq!(archived.merge_key(), entry.merge_key());
    }
}
