use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::rates::{RateSource, RateTable};

/// Latest table, `None` until the first successful fetch.
pub type SharedRates = Arc<RwLock<Option<RateTable>>>;

/// Fetch rates every `interval` in the background. A failed fetch keeps the
/// previous table.
pub fn spawn_poller(
    mut source: Box<dyn RateSource>,
    base: String,
    interval: Duration,
) -> (SharedRates, JoinHandle<()>) {
    let shared: SharedRates = Arc::new(RwLock::new(None));
    let state = shared.clone();

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match source.fetch_rates(&base).await {
                Ok(table) => {
                    info!("Rates updated: {} currencies against {}", table.rates.len(), table.base);
                    *state.write().await = Some(table);
                }
                Err(e) => warn!("Rate fetch failed: {:#}", e),
            }
        }
    });

    (shared, handle)
}
