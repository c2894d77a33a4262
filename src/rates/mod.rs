pub mod http;
pub mod poller;
pub mod static_rates;

pub use http::HttpRateSource;
pub use poller::{spawn_poller, SharedRates};
pub use static_rates::StaticRates;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Units of each currency per one unit of `base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateTable {
    pub base: String,
    pub rates: HashMap<String, f64>,
    pub fetched_at: DateTime<Utc>,
}

impl RateTable {
    pub fn new(base: &str, rates: HashMap<String, f64>, fetched_at: DateTime<Utc>) -> Self {
        let base = base.to_uppercase();
        let mut rates: HashMap<String, f64> = rates
            .into_iter()
            .filter(|(_, r)| r.is_finite() && *r > 0.0)
            .map(|(code, r)| (code.to_uppercase(), r))
            .collect();
        rates.insert(base.clone(), 1.0);
        Self {
            base,
            rates,
            fetched_at,
        }
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(&code.to_uppercase()).copied()
    }

    /// Convert through the base currency. `None` if either code is unknown.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Option<f64> {
        let from_rate = self.rate(from)?;
        let to_rate = self.rate(to)?;
        Some(amount / from_rate * to_rate)
    }

    /// The same table expressed against another base.
    pub fn rebased(&self, base: &str) -> Option<RateTable> {
        let pivot = self.rate(base)?;
        let rates = self
            .rates
            .iter()
            .map(|(code, r)| (code.clone(), r / pivot))
            .collect();
        Some(RateTable::new(base, rates, self.fetched_at))
    }
}

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&mut self, base: &str) -> Result<RateTable>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::fixed_now;

    fn table() -> RateTable {
        let rates = HashMap::from([("eur".to_string(), 0.5), ("JPY".to_string(), 100.0)]);
        RateTable::new("usd", rates, fixed_now())
    }

    #[test]
    fn convert_through_base() {
        let t = table();
        assert_eq!(t.rate("USD"), Some(1.0));
        assert!((t.convert(10.0, "USD", "EUR").unwrap() - 5.0).abs() < 1e-9);
        assert!((t.convert(5.0, "eur", "jpy").unwrap() - 1000.0).abs() < 1e-9);
        assert_eq!(t.convert(1.0, "USD", "GBP"), None);
    }

    #[test]
    fn rebase_keeps_cross_rates() {
        let t = table().rebased("EUR").unwrap();
        assert_eq!(t.base, "EUR");
        assert!((t.rate("USD").unwrap() - 2.0).abs() < 1e-9);
        assert!((t.rate("JPY").unwrap() - 200.0).abs() < 1e-9);
    }
}
