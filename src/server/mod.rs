pub mod error;
pub mod routes;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::rates::{spawn_poller, HttpRateSource, SharedRates};
use crate::storage::DataFile;

#[derive(Clone)]
pub struct AppState {
    pub data: Arc<DataFile>,
    /// One request touches the file at a time.
    pub lock: Arc<Mutex<()>>,
    pub rates: Option<SharedRates>,
}

impl AppState {
    pub fn new(data: DataFile, rates: Option<SharedRates>) -> Self {
        Self {
            data: Arc::new(data),
            lock: Arc::new(Mutex::new(())),
            rates,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/data", get(routes::get_data).post(routes::post_data))
        .route("/api/rates", get(routes::get_rates))
        .route("/health", get(routes::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the persistence server until the process is stopped.
pub async fn serve(cfg: &Config) -> Result<()> {
    let data = DataFile::new(&cfg.data_file, cfg.default_data());

    let rates = if cfg.rates_enabled() {
        let source = Box::new(HttpRateSource::new(&cfg.rates_url));
        let interval = Duration::from_secs(cfg.rates_poll_secs.max(1));
        let (shared, _handle) = spawn_poller(source, cfg.rates_base.clone(), interval);
        info!("Polling rates every {}s against {}", interval.as_secs(), cfg.rates_base);
        Some(shared)
    } else {
        None
    };

    let app = router(AppState::new(data, rates));

    let listener = TcpListener::bind(&cfg.server_addr)
        .await
        .with_context(|| format!("Failed to bind {}", cfg.server_addr))?;
    info!("Data server listening on http://{}", listener.local_addr()?);
    info!("Data file: {}", cfg.data_file);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
