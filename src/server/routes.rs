use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::rates::RateTable;
use crate::server::error::{ApiError, ApiResult};
use crate::server::AppState;

pub async fn get_data(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let _guard = state.lock.lock().await;
    let value = state.data.read().await?;
    debug!("GET /api/data");
    Ok(Json(value))
}

/// Stores the body as-is. Shape checks belong to the client.
pub async fn post_data(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let _guard = state.lock.lock().await;
    state.data.write(&body).await?;
    info!("POST /api/data - saved to {}", state.data.path().display());
    Ok(Json(json!({ "success": true })))
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn get_rates(State(state): State<AppState>) -> ApiResult<Json<RateTable>> {
    let Some(rates) = &state.rates else {
        return Err(ApiError::Unavailable("rate polling is disabled".to_string()));
    };
    match rates.read().await.clone() {
        Some(table) => Ok(Json(table)),
        None => Err(ApiError::Unavailable("no rates fetched yet".to_string())),
    }
}
