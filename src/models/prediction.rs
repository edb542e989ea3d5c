use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Binary outcome reported to the user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display)]
pub enum ProfitabilityLabel {
    #[strum(serialize = "Profitable")]
    #[serde(rename = "Profitable")]
    Profitable,

    #[strum(serialize = "Not Profitable")]
    #[serde(rename = "Not Profitable")]
    NotProfitable,
}

impl ProfitabilityLabel {
    /// Map a classifier class index to a label; only 0 and 1 are valid
    pub fn from_class(class: usize) -> Option<Self> {
        match class {
            1 => Some(ProfitabilityLabel::Profitable),
            0 => Some(ProfitabilityLabel::NotProfitable),
            _ => None,
        }
    }

    pub fn is_profitable(&self) -> bool {
        matches!(self, ProfitabilityLabel::Profitable)
    }

    /// Stable lowercase value for metric labels
    pub fn as_metric_label(&self) -> &'static str {
        match self {
            ProfitabilityLabel::Profitable => "profitable",
            ProfitabilityLabel::NotProfitable => "not_profitable",
        }
    }
}

/// Outcome of one prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Class reported by the classifier
    pub label: ProfitabilityLabel,

    /// Probability of the profitable class (0.0 - 1.0)
    pub probability: f64,
}

impl PredictionResult {
    pub fn new(label: ProfitabilityLabel, probability: f64) -> Self {
        Self { label, probability }
    }

    /// Probability as a percentage with two decimals, e.g. "73.00%"
    pub fn probability_display(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }
}
