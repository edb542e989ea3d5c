use serde::{Deserialize, Serialize};
use strum::Display;

/// Classifier families the service can load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ModelType {
    LogisticRegression,
    RandomForest,
}

/// Description of the loaded model bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Classifier family
    pub model_type: ModelType,

    /// Number of input features
    pub n_features: usize,

    /// Input columns in model order
    pub feature_names: Vec<String>,

    /// Number of output classes
    pub n_classes: usize,

    /// Known industry labels
    pub n_industries: usize,

    /// Known region labels
    pub n_regions: usize,

    /// When the bundle was loaded
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_type_names() {
        assert_eq!(ModelType::RandomForest.to_string(), "random_forest");
        assert_eq!(
            serde_json::to_string(&ModelType::LogisticRegression).unwrap(),
            "\"logistic_regression\""
        );
    }
}
