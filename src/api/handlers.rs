use crate::api::AppState;
use crate::error::{PredictionError, Result};
use crate::ml::ModelMetadata;
use crate::models::{ProfitabilityLabel, StartupRecord};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        model_type: state.bundle.metadata().model_type.to_string(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub model_type: String,
}

/// Predict profitability for one startup
pub async fn predict(
    State(state): State<AppState>,
    payload: std::result::Result<Json<StartupRecord>, JsonRejection>,
) -> Result<Json<PredictionResponse>> {
    // Malformed or out-of-type fields belong to the same taxonomy as range violations
    let Json(record) = payload
        .map_err(|rejection| state.reject(PredictionError::InvalidInput(rejection.body_text())))?;

    let result = state.predict(&record)?;

    Ok(Json(PredictionResponse {
        label: result.label,
        profitable: result.label.is_profitable(),
        probability: result.probability,
        probability_display: result.probability_display(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub label: ProfitabilityLabel,
    pub profitable: bool,
    pub probability: f64,
    pub probability_display: String,
}

/// Known categorical labels, in encoder order
pub async fn list_categories(State(state): State<AppState>) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        industries: state.bundle.industries().to_vec(),
        regions: state.bundle.regions().to_vec(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub industries: Vec<String>,
    pub regions: Vec<String>,
}

/// Loaded model description
pub async fn model_info(State(state): State<AppState>) -> Json<ModelMetadata> {
    Json(state.bundle.metadata().clone())
}

/// Prometheus metrics endpoint
///
/// Returns metrics in Prometheus text exposition format
pub async fn metrics(State(state): State<AppState>) -> (StatusCode, String) {
    if !state.prometheus_enabled {
        return (StatusCode::NOT_FOUND, "Prometheus metrics are disabled\n".to_string());
    }
    (StatusCode::OK, crate::metrics::gather_metrics())
}
