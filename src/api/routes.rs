use crate::api::{handlers, views, AppState};
use crate::metrics::MetricsLayer;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main router: HTML form, JSON API, health and metrics
pub fn build_router(state: AppState) -> Router {
    let metrics_layer = MetricsLayer::new(state.prometheus_enabled);

    Router::new()
        // Form UI
        .route("/", get(views::index))
        .route("/predict", post(views::submit))
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::health_check))
        .route("/health/ready", get(handlers::health_check))
        // Prediction API
        .route("/v1/predictions", post(handlers::predict))
        .route("/v1/categories", get(handlers::list_categories))
        .route("/v1/model", get(handlers::model_info))
        // Metrics
        .route("/metrics", get(handlers::metrics))
        // Route-level so the matched path is available as a label
        .route_layer(metrics_layer)
        // Add state
        .with_state(state)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(false))
                .on_response(DefaultOnResponse::new()),
        )
        .layer(CorsLayer::permissive())
}
