use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::rates::{RateSource, RateTable};

const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(1000);
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Accepts both `{"base": .., "rates": ..}` and `{"base_code": .., "rates": ..}`.
#[derive(Debug, Deserialize)]
struct RatesResponse {
    #[serde(alias = "base_code")]
    base: Option<String>,
    rates: HashMap<String, f64>,
}

/// Fetches rate tables from a JSON HTTP endpoint.
///
/// A `{base}` placeholder in the url is replaced by the base currency;
/// otherwise the base is sent as a `base` query parameter.
pub struct HttpRateSource {
    client: Client,
    url: String,
    last_request: Option<Instant>,
    cache: HashMap<String, (Instant, RateTable)>,
    cache_ttl: Duration,
}

impl HttpRateSource {
    pub fn new(url: &str) -> Self {
        Self::with_timeout(url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            url: url.to_string(),
            last_request: None,
            cache: HashMap::new(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    async fn rate_limit(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < MIN_REQUEST_INTERVAL {
                tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }

    fn request(&self, base: &str) -> reqwest::RequestBuilder {
        if self.url.contains("{base}") {
            self.client.get(self.url.replace("{base}", base))
        } else {
            self.client.get(&self.url).query(&[("base", base)])
        }
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch_rates(&mut self, base: &str) -> Result<RateTable> {
        let base = base.to_uppercase();
        if let Some((cached_at, table)) = self.cache.get(&base) {
            if cached_at.elapsed() < self.cache_ttl {
                return Ok(table.clone());
            }
        }

        self.rate_limit().await;

        let resp = self
            .request(&base)
            .send()
            .await
            .context("Failed to fetch rates")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Rates API error {}: {}", status, body);
        }

        let data: RatesResponse = resp.json().await.context("Failed to parse rates response")?;
        let table = RateTable::new(data.base.as_deref().unwrap_or(&base), data.rates, Utc::now());
        let table = if table.base == base {
            table
        } else {
            table
                .rebased(&base)
                .with_context(|| format!("Rates response has no rate for {}", base))?
        };
        debug!("Fetched {} rates for {}", table.rates.len(), base);

        self.cache.insert(base, (Instant::now(), table.clone()));
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn base_goes_into_placeholder_or_query() {
        let source = HttpRateSource::new("http://rates.local/latest/{base}");
        let req = source.request("EUR").build().unwrap();
        assert_eq!(req.url().as_str(), "http://rates.local/latest/EUR");

        let source = HttpRateSource::new("http://rates.local/latest");
        let req = source.request("EUR").build().unwrap();
        assert_eq!(req.url().as_str(), "http://rates.local/latest?base=EUR");
    }

    #[tokio::test]
    async fn stalled_endpoint_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // accept and hold connections without ever answering
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let url = format!("http://{}/latest", addr);
        let mut source = HttpRateSource::with_timeout(&url, Duration::from_millis(200));
        let result = tokio::time::timeout(Duration::from_secs(5), source.fetch_rates("USD")).await;
        assert!(matches!(result, Ok(Err(_))));
    }
}
