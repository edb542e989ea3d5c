//! Prometheus metrics for the prediction service.
//!
//! Covers HTTP traffic (recorded by [`MetricsLayer`]) and prediction outcomes
//! (recorded by the API handlers through [`record_prediction`] and
//! [`record_prediction_error`]).
//!
//! # Example
//! ```no_run
//! use startup_predictor::metrics::{gather_metrics, init_metrics};
//!
//! init_metrics().expect("metrics registered once");
//! println!("{}", gather_metrics());
//! ```

mod middleware;

pub use middleware::{MetricsLayer, MetricsService};

use crate::error::PredictionError;
use crate::models::PredictionResult;
use lazy_static::lazy_static;
use prometheus::{CounterVec, Histogram, HistogramOpts, HistogramVec, Opts, Registry};

const NAMESPACE: &str = "startup_predictor";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Total number of HTTP requests received
    ///
    /// Labels: method, path, status_code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace(NAMESPACE),
        &["method", "path", "status_code"]
    ).expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// HTTP request duration in seconds
    ///
    /// Labels: method, path
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
        &["method", "path"]
    ).expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric");

    /// Successful predictions
    ///
    /// Labels: label (profitable, not_profitable)
    pub static ref PREDICTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("predictions_total", "Total number of successful predictions")
            .namespace(NAMESPACE),
        &["label"]
    ).expect("Failed to create PREDICTIONS_TOTAL metric");

    /// Failed predictions
    ///
    /// Labels: kind (unknown_category, invalid_input, classifier, model_mismatch)
    pub static ref PREDICTION_ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("prediction_errors_total", "Total number of failed predictions")
            .namespace(NAMESPACE),
        &["kind"]
    ).expect("Failed to create PREDICTION_ERRORS_TOTAL metric");

    /// Time spent inside the prediction adapter
    pub static ref PREDICTION_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "prediction_duration_seconds",
            "Time spent encoding features and calling the classifier"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01])
    ).expect("Failed to create PREDICTION_DURATION_SECONDS metric");
}

/// Register all metrics with the global registry.
///
/// Call once at startup; a second call fails with `AlreadyReg`.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(PREDICTIONS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(PREDICTION_ERRORS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(PREDICTION_DURATION_SECONDS.clone()))?;

    Ok(())
}

/// Record a successful prediction and how long it took
pub fn record_prediction(result: &PredictionResult, duration_secs: f64) {
    PREDICTIONS_TOTAL
        .with_label_values(&[result.label.as_metric_label()])
        .inc();
    PREDICTION_DURATION_SECONDS.observe(duration_secs);
}

/// Record a failed prediction
pub fn record_prediction_error(error: &PredictionError) {
    PREDICTION_ERRORS_TOTAL
        .with_label_values(&[error.kind()])
        .inc();
}

/// Gather all metrics in Prometheus text exposition format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProfitabilityLabel;

    #[test]
    fn test_metrics_initialization_and_export() {
        // Global registry: another test in this process may have registered first
        let _ = init_metrics();

        record_prediction(
            &PredictionResult::new(ProfitabilityLabel::Profitable, 0.9),
            0.0001,
        );
        record_prediction_error(&PredictionError::unknown_category("region", "Mars"));

        let output = gather_metrics();
        assert!(output.contains("startup_predictor_predictions_total"));
        assert!(output.contains("label=\"profitable\""));
        assert!(output.contains("kind=\"unknown_category\""));
    }
}
