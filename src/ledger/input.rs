use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{LedgerError, Result};

/// Which half of (percentage, amount) the user typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Percentage,
    Amount,
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMode::Percentage => write!(f, "percentage"),
            InputMode::Amount => write!(f, "amount"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryInput {
    Percentage(f64),
    Amount(f64),
}

impl EntryInput {
    /// Parse a form field. Accepts a comma as decimal separator.
    pub fn parse(mode: InputMode, raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::InvalidInput("no value entered".to_string()));
        }
        let value: f64 = trimmed
            .replace(',', ".")
            .parse()
            .map_err(|_| LedgerError::InvalidInput(format!("'{}' is not a number", trimmed)))?;
        let input = match mode {
            InputMode::Percentage => EntryInput::Percentage(value),
            InputMode::Amount => EntryInput::Amount(value),
        };
        input.ensure_finite()?;
        Ok(input)
    }

    pub fn mode(&self) -> InputMode {
        match self {
            EntryInput::Percentage(_) => InputMode::Percentage,
            EntryInput::Amount(_) => InputMode::Amount,
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            EntryInput::Percentage(v) | EntryInput::Amount(v) => v,
        }
    }

    pub fn ensure_finite(&self) -> Result<()> {
        if self.value().is_finite() {
            Ok(())
        } else {
            Err(LedgerError::InvalidInput(format!(
                "{} must be a finite number",
                self.mode()
            )))
        }
    }

    /// The percentage this input stands for against `previous_balance`.
    ///
    /// Amounts are converted with `amount * 100 / (previous_balance * leverage)`,
    /// which is undefined on an empty balance.
    pub fn to_percentage(&self, previous_balance: f64, leverage: f64) -> Result<f64> {
        self.ensure_finite()?;
        match *self {
            EntryInput::Percentage(p) => Ok(p),
            EntryInput::Amount(a) => {
                let exposure = previous_balance * leverage;
                if exposure == 0.0 || !exposure.is_finite() {
                    return Err(LedgerError::InvalidInput(
                        "cannot derive a percentage from a zero balance".to_string(),
                    ));
                }
                Ok(a * 100.0 / exposure)
            }
        }
    }
}
