use crate::error::PredictionError;
use crate::ml::classifier::Classifier;
use crate::ml::encoder::CategoryEncoder;
use crate::ml::features::FeatureVector;
use crate::models::{PredictionResult, ProfitabilityLabel, StartupRecord};
use std::sync::Arc;
use tracing::debug;

/// Turns a startup record into a profitability prediction.
///
/// The classifier and both encoders are injected and only ever read, so one
/// adapter can be cloned into every request handler.
#[derive(Clone)]
pub struct PredictionAdapter {
    classifier: Arc<dyn Classifier>,
    industry_encoder: Arc<CategoryEncoder>,
    region_encoder: Arc<CategoryEncoder>,
}

impl PredictionAdapter {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        industry_encoder: Arc<CategoryEncoder>,
        region_encoder: Arc<CategoryEncoder>,
    ) -> Self {
        Self {
            classifier,
            industry_encoder,
            region_encoder,
        }
    }

    /// Encode the record's categories, check its numeric bounds and assemble
    /// the feature vector.
    ///
    /// A label outside either vocabulary is reported as `UnknownCategory` even
    /// when numeric fields are also out of range.
    pub fn encode(&self, record: &StartupRecord) -> Result<FeatureVector, PredictionError> {
        let industry_code = self.industry_encoder.transform(&record.industry)?;
        let region_code = self.region_encoder.transform(&record.region)?;

        record.check()?;

        Ok(FeatureVector::assemble(record, industry_code, region_code))
    }

    /// Predict whether the startup is profitable.
    ///
    /// The label comes from the classifier's own class prediction; the
    /// probability is its estimate for the profitable class.
    pub fn predict(&self, record: &StartupRecord) -> Result<PredictionResult, PredictionError> {
        let features = self.encode(record)?.to_matrix();

        let classes = self.classifier.predict(&features)?;
        let proba = self.classifier.predict_proba(&features)?;

        let class = classes.first().copied().ok_or_else(|| {
            PredictionError::Classifier("classifier returned no prediction".to_string())
        })?;

        if proba.nrows() == 0 || proba.ncols() < 2 {
            return Err(PredictionError::ModelMismatch(format!(
                "probability output has shape {:?}, expected a positive-class column",
                proba.shape()
            )));
        }

        let probability = proba[[0, 1]];
        if !(0.0..=1.0).contains(&probability) {
            return Err(PredictionError::Classifier(format!(
                "probability {} is outside [0, 1]",
                probability
            )));
        }

        let label = ProfitabilityLabel::from_class(class).ok_or_else(|| {
            PredictionError::Classifier(format!("unexpected class {}", class))
        })?;

        debug!(
            industry = %record.industry,
            region = %record.region,
            label = %label,
            probability,
            "Prediction computed"
        );

        Ok(PredictionResult::new(label, probability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::classifier::LogisticRegressionClassifier;
    use crate::ml::features::FEATURE_COUNT;
    use crate::ml::models::ModelType;
    use ndarray::Array2;

    /// Classifier returning a fixed answer
    struct FixedClassifier {
        class: usize,
        probability: f64,
    }

    impl Classifier for FixedClassifier {
        fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>, PredictionError> {
            Ok(vec![self.class; features.nrows()])
        }

        fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>, PredictionError> {
            let p = self.probability;
            Ok(Array2::from_shape_fn((features.nrows(), 2), |(_, j)| {
                if j == 1 {
                    p
                } else {
                    1.0 - p
                }
            }))
        }

        fn n_features(&self) -> usize {
            FEATURE_COUNT
        }

        fn n_classes(&self) -> usize {
            2
        }

        fn model_type(&self) -> ModelType {
            ModelType::LogisticRegression
        }
    }

    fn encoders() -> (Arc<CategoryEncoder>, Arc<CategoryEncoder>) {
        let industry = CategoryEncoder::new(
            "industry",
            ["AI", "FinTech", "Health", "Tech"].iter().map(|s| s.to_string()).collect(),
        )
        .unwrap();
        let region = CategoryEncoder::new(
            "region",
            ["EU", "US"].iter().map(|s| s.to_string()).collect(),
        )
        .unwrap();
        (Arc::new(industry), Arc::new(region))
    }

    fn adapter_with(classifier: Arc<dyn Classifier>) -> PredictionAdapter {
        let (industry, region) = encoders();
        PredictionAdapter::new(classifier, industry, region)
    }

    fn record() -> StartupRecord {
        StartupRecord {
            industry: "Tech".to_string(),
            region: "US".to_string(),
            funding_rounds: 2,
            funding_amount: 10.0,
            valuation: 50.0,
            revenue: 5.0,
            employees: 20,
            market_share: 1.5,
            year_founded: 2015,
        }
    }

    #[test]
    fn test_encode_produces_fixed_order() {
        let adapter = adapter_with(Arc::new(FixedClassifier {
            class: 1,
            probability: 0.73,
        }));

        let features = adapter.encode(&record()).unwrap();
        assert_eq!(
            features.as_slice(),
            &[3.0, 2.0, 10.0, 50.0, 5.0, 20.0, 1.5, 2015.0, 1.0]
        );
    }

    #[test]
    fn test_profitable_prediction() {
        let adapter = adapter_with(Arc::new(FixedClassifier {
            class: 1,
            probability: 0.73,
        }));

        let result = adapter.predict(&record()).unwrap();
        assert_eq!(result.label, ProfitabilityLabel::Profitable);
        assert_eq!(result.probability_display(), "73.00%");
    }

    #[test]
    fn test_label_follows_class_not_probability() {
        // Class 0 reported even though probability is above one half
        let adapter = adapter_with(Arc::new(FixedClassifier {
            class: 0,
            probability: 0.6,
        }));

        let result = adapter.predict(&record()).unwrap();
        assert_eq!(result.label, ProfitabilityLabel::NotProfitable);
        assert!((result.probability - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_categories() {
        let adapter = adapter_with(Arc::new(FixedClassifier {
            class: 1,
            probability: 0.5,
        }));

        let mut r = record();
        r.industry = "Mining".to_string();
        assert_eq!(
            adapter.predict(&r).unwrap_err(),
            PredictionError::unknown_category("industry", "Mining")
        );

        let mut r = record();
        r.region = "Antarctica".to_string();
        assert_eq!(
            adapter.predict(&r).unwrap_err(),
            PredictionError::unknown_category("region", "Antarctica")
        );
    }

    #[test]
    fn test_unknown_category_reported_before_bounds() {
        let adapter = adapter_with(Arc::new(FixedClassifier {
            class: 1,
            probability: 0.5,
        }));

        let mut r = record();
        r.industry.clear();
        assert_eq!(
            adapter.predict(&r).unwrap_err(),
            PredictionError::unknown_category("industry", "")
        );

        let mut r = record();
        r.industry = "Mining".to_string();
        r.year_founded = 1850;
        assert_eq!(
            adapter.predict(&r).unwrap_err(),
            PredictionError::unknown_category("industry", "Mining")
        );

        let mut r = record();
        r.region = "Antarctica".to_string();
        r.employees = 0;
        assert_eq!(
            adapter.predict(&r).unwrap_err(),
            PredictionError::unknown_category("region", "Antarctica")
        );
    }

    #[test]
    fn test_invalid_numeric_input() {
        let adapter = adapter_with(Arc::new(FixedClassifier {
            class: 1,
            probability: 0.5,
        }));

        let mut r = record();
        r.market_share = 150.0;
        assert_eq!(
            adapter.predict(&r).unwrap_err(),
            PredictionError::InvalidInput("market_share must be between 0.0 and 100.0".to_string())
        );
    }

    #[test]
    fn test_bad_classifier_output() {
        let adapter = adapter_with(Arc::new(FixedClassifier {
            class: 2,
            probability: 0.5,
        }));
        assert!(matches!(
            adapter.predict(&record()),
            Err(PredictionError::Classifier(_))
        ));

        let adapter = adapter_with(Arc::new(FixedClassifier {
            class: 1,
            probability: 1.5,
        }));
        assert!(matches!(
            adapter.predict(&record()),
            Err(PredictionError::Classifier(_))
        ));

        let adapter = adapter_with(Arc::new(FixedClassifier {
            class: 1,
            probability: f64::NAN,
        }));
        assert!(matches!(
            adapter.predict(&record()),
            Err(PredictionError::Classifier(_))
        ));
    }

    #[test]
    fn test_width_mismatch_surfaces() {
        let adapter = adapter_with(Arc::new(LogisticRegressionClassifier::new(vec![0.1; 4], 0.0)));
        assert!(matches!(
            adapter.predict(&record()),
            Err(PredictionError::ModelMismatch(_))
        ));
    }

    #[test]
    fn test_prediction_is_idempotent() {
        let adapter = adapter_with(Arc::new(LogisticRegressionClassifier::new(
            vec![0.1, 0.2, 0.01, 0.002, 0.3, 0.001, 0.05, -0.0005, -0.2],
            -0.5,
        )));

        let first = adapter.predict(&record()).unwrap();
        let second = adapter.predict(&record()).unwrap();
        assert_eq!(first, second);
        assert!((0.0..=1.0).contains(&first.probability));
    }
}
