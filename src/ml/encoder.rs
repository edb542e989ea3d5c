use crate::error::PredictionError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Closed-vocabulary mapping from category labels to integer codes.
///
/// The code of a label is its position in `classes`, which is the layout a
/// label encoder fitted at training time produces. The vocabulary is fixed
/// once constructed.
#[derive(Debug, Clone)]
pub struct CategoryEncoder {
    /// Feature this encoder belongs to ("industry", "region")
    field: String,

    /// Known labels, ordered by code
    classes: Vec<String>,

    /// Label -> code lookup
    index: HashMap<String, usize>,
}

/// On-disk form of an encoder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderArtifact {
    /// Field the encoder was fitted on; checked against the expected field when present
    #[serde(default)]
    pub field: Option<String>,

    /// Labels ordered by code
    pub classes: Vec<String>,
}

impl CategoryEncoder {
    /// Build an encoder; classes must be non-empty and unique
    pub fn new(field: impl Into<String>, classes: Vec<String>) -> Result<Self, PredictionError> {
        let field = field.into();

        if classes.is_empty() {
            return Err(PredictionError::ModelMismatch(format!(
                "{} encoder has no classes",
                field
            )));
        }

        let mut index = HashMap::with_capacity(classes.len());
        for (code, label) in classes.iter().enumerate() {
            if index.insert(label.clone(), code).is_some() {
                return Err(PredictionError::ModelMismatch(format!(
                    "{} encoder lists '{}' more than once",
                    field, label
                )));
            }
        }

        Ok(Self {
            field,
            classes,
            index,
        })
    }

    /// Build an encoder from its artifact, rejecting artifacts fitted on another field
    pub fn from_artifact(
        field: impl Into<String>,
        artifact: EncoderArtifact,
    ) -> Result<Self, PredictionError> {
        let field = field.into();

        if let Some(stored) = artifact.field.as_deref() {
            if stored != field {
                return Err(PredictionError::ModelMismatch(format!(
                    "expected a {} encoder, found one fitted on '{}'",
                    field, stored
                )));
            }
        }

        Self::new(field, artifact.classes)
    }

    /// Encode a label to its integer code
    pub fn transform(&self, label: &str) -> Result<usize, PredictionError> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| PredictionError::unknown_category(&self.field, label))
    }

    /// Known labels, ordered by code
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}
