use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::errors::{LedgerError, Result};
use crate::models::AppData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// The file becomes the whole state.
    Replace,
    /// The file is merged into the current state.
    Merge,
}

impl ImportMode {
    pub fn from_str_loose(s: &str) -> Option<ImportMode> {
        match s.trim().to_lowercase().as_str() {
            "replace" | "overwrite" => Some(ImportMode::Replace),
            "merge" => Some(ImportMode::Merge),
            _ => None,
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Replace => write!(f, "replace"),
            ImportMode::Merge => write!(f, "merge"),
        }
    }
}

fn invalid(msg: impl Into<String>) -> LedgerError {
    LedgerError::InvalidImportFormat(msg.into())
}

/// Validate and decode an exported file.
///
/// The file must be a JSON object with a `deposit` field; `days`,
/// `archivedDays` and `goals` must be arrays when present. Everything
/// missing takes its default.
pub fn parse_import(text: &str) -> Result<AppData> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| invalid(format!("not valid JSON: {}", e)))?;
    let Some(obj) = value.as_object() else {
        return Err(invalid("expected a JSON object"));
    };
    if !obj.contains_key("deposit") {
        return Err(invalid("missing 'deposit' field"));
    }
    for key in ["days", "archivedDays", "goals"] {
        if let Some(v) = obj.get(key) {
            if !v.is_array() {
                return Err(invalid(format!("'{}' must be an array", key)));
            }
        }
    }
    serde_json::from_value(value).map_err(|e| invalid(e.to_string()))
}

pub fn export_json(data: &AppData) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

pub fn export_file_name(today: NaiveDate) -> String {
    format!("deposit-tracker-{}.json", today.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{date, ledger_from_percentages};

    #[test]
    fn export_then_import() {
        let mut data = AppData::default();
        data.days = ledger_from_percentages(&[5.0, -2.0], 30.0, 10.0);
        data.deposit = data.current_balance();
        let text = export_json(&data).unwrap();
        assert_eq!(parse_import(&text).unwrap(), data);
    }

    #[test]
    fn rejects_bad_shapes() {
        for bad in [
            "not json",
            "[]",
            r#"{"days": []}"#,
            r#"{"deposit": 30, "days": {}}"#,
            r#"{"deposit": 30, "goals": "none"}"#,
            r#"{"deposit": 30, "days": [{"day": 1}]}"#,
        ] {
            assert!(
                matches!(parse_import(bad), Err(LedgerError::InvalidImportFormat(_))),
                "accepted {}",
                bad
            );
        }
    }

    #[test]
    fn minimal_file_takes_defaults() {
        let data = parse_import(r#"{"deposit": 50}"#).unwrap();
        assert_eq!(data.deposit, 50.0);
        assert!(data.goals.is_empty());
    }

    #[test]
    fn file_name_is_dated() {
        assert_eq!(export_file_name(date(2024, 3, 9)), "deposit-tracker-2024-03-09.json");
    }
}
