use crate::config::ModelsConfig;
use crate::error::{AppError, PredictionError, Result};
use crate::ml::adapter::PredictionAdapter;
use crate::ml::classifier::{Classifier, ClassifierArtifact};
use crate::ml::encoder::{CategoryEncoder, EncoderArtifact};
use crate::ml::features::{check_feature_names, FEATURE_COLUMNS, FEATURE_COUNT};
use crate::ml::models::ModelMetadata;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Classifier and encoders loaded once at startup
pub struct ModelBundle {
    classifier: Arc<dyn Classifier>,
    industry_encoder: Arc<CategoryEncoder>,
    region_encoder: Arc<CategoryEncoder>,
    metadata: ModelMetadata,
}

impl ModelBundle {
    /// Load all three artifacts from disk
    pub fn load(config: &ModelsConfig) -> Result<Self> {
        let classifier_artifact: ClassifierArtifact = read_artifact(&config.classifier_path)?;
        let classifier = classifier_artifact
            .into_classifier()
            .map_err(|e| AppError::model_load(config.classifier_path.display().to_string(), e.to_string()))?;

        let industry = load_encoder("industry", &config.industry_encoder_path)?;
        let region = load_encoder("region", &config.region_encoder_path)?;

        let bundle = Self::from_parts(classifier, industry, region)?;

        info!(
            model_type = %bundle.metadata.model_type,
            n_features = bundle.metadata.n_features,
            n_industries = bundle.metadata.n_industries,
            n_regions = bundle.metadata.n_regions,
            "Model bundle loaded"
        );

        Ok(bundle)
    }

    /// Assemble a bundle from already-constructed parts, checking they fit together
    pub fn from_parts(
        classifier: Arc<dyn Classifier>,
        industry_encoder: CategoryEncoder,
        region_encoder: CategoryEncoder,
    ) -> std::result::Result<Self, PredictionError> {
        if classifier.n_features() != FEATURE_COUNT {
            return Err(PredictionError::ModelMismatch(format!(
                "classifier expects {} features, adapter supplies {}",
                classifier.n_features(),
                FEATURE_COUNT
            )));
        }
        if classifier.n_classes() != 2 {
            return Err(PredictionError::ModelMismatch(format!(
                "classifier has {} classes, expected a binary model",
                classifier.n_classes()
            )));
        }
        if let Some(names) = classifier.feature_names() {
            check_feature_names(names)?;
        }

        let metadata = ModelMetadata {
            model_type: classifier.model_type(),
            n_features: classifier.n_features(),
            feature_names: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            n_classes: classifier.n_classes(),
            n_industries: industry_encoder.classes().len(),
            n_regions: region_encoder.classes().len(),
            loaded_at: chrono::Utc::now(),
        };

        Ok(Self {
            classifier,
            industry_encoder: Arc::new(industry_encoder),
            region_encoder: Arc::new(region_encoder),
            metadata,
        })
    }

    /// Adapter sharing this bundle's classifier and encoders
    pub fn adapter(&self) -> PredictionAdapter {
        PredictionAdapter::new(
            self.classifier.clone(),
            self.industry_encoder.clone(),
            self.region_encoder.clone(),
        )
    }

    pub fn industries(&self) -> &[String] {
        self.industry_encoder.classes()
    }

    pub fn regions(&self) -> &[String] {
        self.region_encoder.classes()
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AppError::model_load(path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::model_load(path.display().to_string(), e.to_string()))
}

fn load_encoder(field: &str, path: &Path) -> Result<CategoryEncoder> {
    let artifact: EncoderArtifact = read_artifact(path)?;
    CategoryEncoder::from_artifact(field, artifact)
        .map_err(|e| AppError::model_load(path.display().to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::classifier::LogisticRegressionClassifier;

    fn encoder(field: &str, classes: &[&str]) -> CategoryEncoder {
        CategoryEncoder::new(field, classes.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_from_parts_checks_width() {
        let classifier = Arc::new(LogisticRegressionClassifier::new(vec![0.0; 3], 0.0));
        let result = ModelBundle::from_parts(
            classifier,
            encoder("industry", &["AI"]),
            encoder("region", &["EU"]),
        );
        assert!(matches!(result, Err(PredictionError::ModelMismatch(_))));
    }

    #[test]
    fn test_from_parts_checks_feature_names() {
        let mut names: Vec<String> = FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect();
        names.swap(1, 2);
        let classifier = Arc::new(
            LogisticRegressionClassifier::new(vec![0.0; FEATURE_COUNT], 0.0)
                .with_feature_names(names),
        );

        let result = ModelBundle::from_parts(
            classifier,
            encoder("industry", &["AI"]),
            encoder("region", &["EU"]),
        );
        assert!(matches!(result, Err(PredictionError::ModelMismatch(_))));
    }

    #[test]
    fn test_metadata_and_categories() {
        let classifier = Arc::new(LogisticRegressionClassifier::new(vec![0.0; FEATURE_COUNT], 0.0));
        let bundle = ModelBundle::from_parts(
            classifier,
            encoder("industry", &["AI", "FinTech"]),
            encoder("region", &["EU", "US", "APAC"]),
        )
        .unwrap();

        assert_eq!(bundle.industries(), &["AI".to_string(), "FinTech".to_string()]);
        assert_eq!(bundle.regions().len(), 3);
        assert_eq!(bundle.metadata().n_features, FEATURE_COUNT);
        assert_eq!(bundle.metadata().feature_names[0], "Industry");
    }

    #[test]
    fn test_missing_file_is_model_load_error() {
        let config = ModelsConfig::in_dir("/nonexistent/startup-predictor");
        let err = ModelBundle::load(&config).err().unwrap();
        assert_eq!(err.error_code(), "MODEL_LOAD_ERROR");
    }
}
