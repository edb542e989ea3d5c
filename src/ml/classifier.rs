use crate::error::PredictionError;
use crate::ml::models::ModelType;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Trait for pre-trained classifiers
///
/// Implementations are immutable once loaded and shared across requests.
pub trait Classifier: Send + Sync {
    /// Predict class labels, one per row
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>, PredictionError>;

    /// Predict class probabilities (n_samples x n_classes)
    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>, PredictionError>;

    /// Number of input columns
    fn n_features(&self) -> usize;

    /// Number of output classes
    fn n_classes(&self) -> usize;

    /// Get model type
    fn model_type(&self) -> ModelType;

    /// Input column names recorded at training time, if any
    fn feature_names(&self) -> Option<&[String]> {
        None
    }
}

fn check_width(features: &Array2<f64>, expected: usize) -> Result<(), PredictionError> {
    if features.ncols() != expected {
        return Err(PredictionError::ModelMismatch(format!(
            "classifier expects {} features, got {}",
            expected,
            features.ncols()
        )));
    }
    Ok(())
}

fn check_names(names: Option<&[String]>, n_features: usize) -> Result<(), PredictionError> {
    match names {
        Some(names) if names.len() != n_features => Err(PredictionError::ModelMismatch(format!(
            "{} feature names recorded for {} features",
            names.len(),
            n_features
        ))),
        _ => Ok(()),
    }
}

/// Serialized classifier, tagged by model family
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    LogisticRegression(LogisticRegressionClassifier),
    RandomForest(RandomForestClassifier),
}

impl ClassifierArtifact {
    /// Validate the artifact's structure and turn it into a shareable classifier
    pub fn into_classifier(self) -> Result<Arc<dyn Classifier>, PredictionError> {
        match self {
            ClassifierArtifact::LogisticRegression(model) => {
                model.validate()?;
                Ok(Arc::new(model))
            }
            ClassifierArtifact::RandomForest(model) => {
                model.validate()?;
                Ok(Arc::new(model))
            }
        }
    }
}

/// Binary logistic regression
///
/// P(class 1) = sigmoid(w . x + b); class 1 iff the decision value is positive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegressionClassifier {
    /// One weight per input column
    pub coefficients: Vec<f64>,

    /// Bias term
    pub intercept: f64,

    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

impl LogisticRegressionClassifier {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
            feature_names: None,
        }
    }

    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }

    /// Structural checks run once at load time
    pub fn validate(&self) -> Result<(), PredictionError> {
        if self.coefficients.is_empty() {
            return Err(PredictionError::ModelMismatch(
                "logistic regression has no coefficients".to_string(),
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|w| !w.is_finite()) {
            return Err(PredictionError::ModelMismatch(
                "logistic regression has non-finite weights".to_string(),
            ));
        }
        check_names(self.feature_names.as_deref(), self.coefficients.len())
    }

    fn decision_function(&self, features: &Array2<f64>) -> Result<Array1<f64>, PredictionError> {
        check_width(features, self.coefficients.len())?;
        let weights = ArrayView1::from(self.coefficients.as_slice());
        Ok(features.dot(&weights) + self.intercept)
    }

    fn sigmoid(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }
}

impl Classifier for LogisticRegressionClassifier {
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>, PredictionError> {
        let decision = self.decision_function(features)?;
        Ok(decision.iter().map(|&z| usize::from(z > 0.0)).collect())
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>, PredictionError> {
        let positive = self.decision_function(features)?.mapv(Self::sigmoid);
        Ok(Array2::from_shape_fn((positive.len(), 2), |(i, j)| {
            if j == 1 {
                positive[i]
            } else {
                1.0 - positive[i]
            }
        }))
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn n_classes(&self) -> usize {
        2
    }

    fn model_type(&self) -> ModelType {
        ModelType::LogisticRegression
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }
}

/// Node of a flattened decision tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Go to `left` when `x[feature] <= threshold`, otherwise `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Per-class weights (sample counts or fractions)
    Leaf { value: Vec<f64> },
}

/// Decision tree stored as a node list rooted at index 0.
/// Children always sit after their parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), PredictionError> {
        if self.nodes.is_empty() {
            return Err(PredictionError::ModelMismatch("empty decision tree".to_string()));
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(PredictionError::ModelMismatch(format!(
                            "node {} splits on feature {} of {}",
                            idx, feature, n_features
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(PredictionError::ModelMismatch(format!(
                            "node {} has a non-finite threshold",
                            idx
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(PredictionError::ModelMismatch(format!(
                                "node {} points to invalid child {}",
                                idx, child
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(PredictionError::ModelMismatch(format!(
                            "leaf {} has {} class weights, expected {}",
                            idx,
                            value.len(),
                            n_classes
                        )));
                    }
                    let total: f64 = value.iter().sum();
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0) || total <= 0.0 {
                        return Err(PredictionError::ModelMismatch(format!(
                            "leaf {} has invalid class weights",
                            idx
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Walk from the root to the leaf that `row` falls into
    fn leaf_for(&self, row: ArrayView1<f64>) -> Result<&[f64], PredictionError> {
        let mut idx = 0;
        // Children are strictly after parents, so a walk never exceeds the node count
        for _ in 0..self.nodes.len() {
            match self.nodes.get(idx) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { value }) => return Ok(value.as_slice()),
                None => break,
            }
        }

        Err(PredictionError::Classifier(format!(
            "tree walk did not reach a leaf (stopped at node {})",
            idx
        )))
    }
}

/// Forest of decision trees; probabilities are the mean of normalised leaf weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    pub n_features: usize,

    #[serde(default = "default_n_classes")]
    pub n_classes: usize,

    pub trees: Vec<DecisionTree>,

    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

fn default_n_classes() -> usize {
    2
}

impl RandomForestClassifier {
    pub fn new(n_features: usize, trees: Vec<DecisionTree>) -> Self {
        Self {
            n_features,
            n_classes: default_n_classes(),
            trees,
            feature_names: None,
        }
    }

    /// Structural checks run once at load time
    pub fn validate(&self) -> Result<(), PredictionError> {
        if self.n_classes < 2 {
            return Err(PredictionError::ModelMismatch(format!(
                "random forest needs at least 2 classes, has {}",
                self.n_classes
            )));
        }
        if self.trees.is_empty() {
            return Err(PredictionError::ModelMismatch(
                "random forest has no trees".to_string(),
            ));
        }
        for tree in &self.trees {
            tree.validate(self.n_features, self.n_classes)?;
        }
        check_names(self.feature_names.as_deref(), self.n_features)
    }
}

impl Classifier for RandomForestClassifier {
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>, PredictionError> {
        let proba = self.predict_proba(features)?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| {
                // First maximum wins on ties
                row.iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |best, (k, &p)| {
                        if p > best.1 {
                            (k, p)
                        } else {
                            best
                        }
                    })
                    .0
            })
            .collect())
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>, PredictionError> {
        check_width(features, self.n_features)?;

        let mut proba = Array2::<f64>::zeros((features.nrows(), self.n_classes));
        for (i, row) in features.rows().into_iter().enumerate() {
            for tree in &self.trees {
                let leaf = tree.leaf_for(row)?;
                let total: f64 = leaf.iter().sum();
                for (k, weight) in leaf.iter().enumerate() {
                    proba[[i, k]] += weight / total;
                }
            }
        }

        let n_trees = self.trees.len() as f64;
        proba.mapv_inplace(|p| p / n_trees);
        Ok(proba)
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn model_type(&self) -> ModelType {
        ModelType::RandomForest
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[f64]) -> Array2<f64> {
        Array2::from_shape_vec((1, values.len()), values.to_vec()).unwrap()
    }

    /// Single stump on feature 0: <= 5.0 -> mostly class 0, else mostly class 1
    fn stump(left: [f64; 2], right: [f64; 2]) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 5.0,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf {
                    value: left.to_vec(),
                },
                TreeNode::Leaf {
                    value: right.to_vec(),
                },
            ],
        }
    }

    #[test]
    fn test_logistic_regression_probabilities() {
        let model = LogisticRegressionClassifier::new(vec![1.0, -1.0], 0.0);
        model.validate().unwrap();

        let proba = model.predict_proba(&row(&[2.0, 2.0])).unwrap();
        assert!((proba[[0, 1]] - 0.5).abs() < 1e-12);
        assert!((proba[[0, 0]] + proba[[0, 1]] - 1.0).abs() < 1e-12);

        let proba = model.predict_proba(&row(&[3.0, 1.0])).unwrap();
        let expected = 1.0 / (1.0 + (-2.0f64).exp());
        assert!((proba[[0, 1]] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_logistic_regression_predict_matches_decision_sign() {
        let model = LogisticRegressionClassifier::new(vec![1.0, -1.0], 0.0);
        assert_eq!(model.predict(&row(&[3.0, 1.0])).unwrap(), vec![1]);
        assert_eq!(model.predict(&row(&[1.0, 3.0])).unwrap(), vec![0]);
        // Zero decision value is not positive
        assert_eq!(model.predict(&row(&[2.0, 2.0])).unwrap(), vec![0]);
    }

    #[test]
    fn test_logistic_regression_width_mismatch() {
        let model = LogisticRegressionClassifier::new(vec![1.0, -1.0], 0.0);
        assert!(matches!(
            model.predict(&row(&[1.0, 2.0, 3.0])),
            Err(PredictionError::ModelMismatch(_))
        ));
    }

    #[test]
    fn test_logistic_regression_rejects_bad_weights() {
        assert!(LogisticRegressionClassifier::new(vec![], 0.0).validate().is_err());
        assert!(LogisticRegressionClassifier::new(vec![f64::NAN], 0.0)
            .validate()
            .is_err());
        assert!(LogisticRegressionClassifier::new(vec![1.0, 2.0], 0.0)
            .with_feature_names(vec!["only one".to_string()])
            .validate()
            .is_err());
    }

    #[test]
    fn test_random_forest_averages_trees() {
        let forest = RandomForestClassifier::new(
            1,
            vec![stump([8.0, 2.0], [1.0, 3.0]), stump([1.0, 0.0], [0.0, 1.0])],
        );
        forest.validate().unwrap();

        let proba = forest.predict_proba(&row(&[7.0])).unwrap();
        // (0.75 + 1.0) / 2
        assert!((proba[[0, 1]] - 0.875).abs() < 1e-12);
        assert_eq!(forest.predict(&row(&[7.0])).unwrap(), vec![1]);

        let proba = forest.predict_proba(&row(&[5.0])).unwrap();
        // threshold is inclusive on the left: (0.2 + 0.0) / 2
        assert!((proba[[0, 1]] - 0.1).abs() < 1e-12);
        assert_eq!(forest.predict(&row(&[5.0])).unwrap(), vec![0]);
    }

    #[test]
    fn test_random_forest_tie_picks_first_class() {
        let forest = RandomForestClassifier::new(1, vec![stump([1.0, 1.0], [1.0, 1.0])]);
        assert_eq!(forest.predict(&row(&[0.0])).unwrap(), vec![0]);
    }

    #[test]
    fn test_random_forest_rejects_bad_structure() {
        let backwards = DecisionTree {
            nodes: vec![
                TreeNode::Leaf {
                    value: vec![1.0, 0.0],
                },
                TreeNode::Split {
                    feature: 0,
                    threshold: 1.0,
                    left: 0,
                    right: 0,
                },
            ],
        };
        assert!(RandomForestClassifier::new(1, vec![backwards]).validate().is_err());

        let wide_split = stump([1.0, 0.0], [0.0, 1.0]);
        assert!(RandomForestClassifier::new(0, vec![wide_split]).validate().is_err());

        let wrong_leaf = DecisionTree {
            nodes: vec![TreeNode::Leaf {
                value: vec![1.0, 0.0, 0.0],
            }],
        };
        assert!(RandomForestClassifier::new(1, vec![wrong_leaf]).validate().is_err());

        assert!(RandomForestClassifier::new(1, vec![]).validate().is_err());
    }

    #[test]
    fn test_artifact_deserialization() {
        let json = r#"{
            "type": "random_forest",
            "n_features": 1,
            "trees": [
                {"nodes": [
                    {"feature": 0, "threshold": 5, "left": 1, "right": 2},
                    {"value": [3, 1]},
                    {"value": [0, 4]}
                ]}
            ]
        }"#;

        let artifact: ClassifierArtifact = serde_json::from_str(json).unwrap();
        let classifier = artifact.into_classifier().unwrap();
        assert_eq!(classifier.model_type(), ModelType::RandomForest);
        assert_eq!(classifier.n_classes(), 2);
        assert_eq!(classifier.predict(&row(&[9.0])).unwrap(), vec![1]);

        let json = r#"{"type": "logistic_regression", "coefficients": [0.5], "intercept": -1.0}"#;
        let artifact: ClassifierArtifact = serde_json::from_str(json).unwrap();
        let classifier = artifact.into_classifier().unwrap();
        assert_eq!(classifier.model_type(), ModelType::LogisticRegression);
        assert_eq!(classifier.n_features(), 1);
        assert!(classifier.feature_names().is_none());
    }

    #[test]
    fn test_unknown_artifact_type() {
        let json = r#"{"type": "gradient_boosting", "trees": []}"#;
        assert!(serde_json::from_str::<ClassifierArtifact>(json).is_err());
    }
}
