pub mod handlers;
pub mod routes;
pub mod views;

pub use routes::*;

use crate::error::PredictionError;
use crate::metrics;
use crate::ml::{ModelBundle, PredictionAdapter};
use crate::models::{PredictionResult, StartupRecord};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub bundle: Arc<ModelBundle>,
    pub adapter: PredictionAdapter,
    pub started_at: Instant,
    pub prometheus_enabled: bool,
}

impl AppState {
    pub fn new(bundle: Arc<ModelBundle>) -> Self {
        let adapter = bundle.adapter();
        Self {
            bundle,
            adapter,
            started_at: Instant::now(),
            prometheus_enabled: true,
        }
    }

    /// Enable or disable the Prometheus endpoint and HTTP metrics
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.prometheus_enabled = enabled;
        self
    }

    /// Run one prediction, recording its outcome
    pub fn predict(&self, record: &StartupRecord) -> Result<PredictionResult, PredictionError> {
        let prediction_id = Uuid::new_v4();
        let _span = tracing::info_span!("prediction", %prediction_id).entered();
        let start = Instant::now();

        match self.adapter.predict(record) {
            Ok(result) => {
                tracing::info!(
                    label = %result.label,
                    probability = result.probability,
                    "Prediction served"
                );
                metrics::record_prediction(&result, start.elapsed().as_secs_f64());
                Ok(result)
            }
            Err(e) => Err(self.reject(e)),
        }
    }

    /// Log and count a failed prediction, including input rejected before it
    /// reached the adapter
    pub fn reject(&self, error: PredictionError) -> PredictionError {
        tracing::warn!(kind = error.kind(), error = %error, "Prediction failed");
        metrics::record_prediction_error(&error);
        error
    }
}
