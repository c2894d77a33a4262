use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::rates::{RateSource, RateTable};

/// A RateSource that serves a fixed table, rebased on request.
/// Used offline and in tests.
pub struct StaticRates {
    table: RateTable,
}

impl StaticRates {
    pub fn new(table: RateTable) -> Self {
        Self { table }
    }

    /// Load a table saved as JSON (the shape `/api/rates` returns).
    pub fn from_json(text: &str) -> Result<Self> {
        let table: RateTable = serde_json::from_str(text).context("Failed to parse rate table")?;
        Ok(Self::new(table))
    }
}

#[async_trait]
impl RateSource for StaticRates {
    async fn fetch_rates(&mut self, base: &str) -> Result<RateTable> {
        self.table
            .rebased(base)
            .with_context(|| format!("No rate for {}", base))
    }
}
