//! Profitability prediction
//!
//! This module provides:
//! - Label encoders for the categorical inputs
//! - The fixed feature layout the classifier was trained on
//! - Pre-trained classifiers (logistic regression, random forest)
//! - The prediction adapter tying encoders and classifier together
//! - Loading of the model bundle from disk

pub mod adapter;
pub mod bundle;
pub mod classifier;
pub mod encoder;
pub mod features;
pub mod models;

pub use adapter::PredictionAdapter;
pub use bundle::ModelBundle;
pub use classifier::{
    Classifier, ClassifierArtifact, DecisionTree, LogisticRegressionClassifier,
    RandomForestClassifier, TreeNode,
};
pub use encoder::{CategoryEncoder, EncoderArtifact};
pub use features::{FeatureVector, FEATURE_COLUMNS, FEATURE_COUNT};
pub use models::{ModelMetadata, ModelType};
