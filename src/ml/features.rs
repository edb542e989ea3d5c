use crate::error::PredictionError;
use crate::models::StartupRecord;
use ndarray::Array2;

/// Column layout the classifier was trained on. Order is significant.
pub const FEATURE_COLUMNS: [&str; 9] = [
    "Industry",
    "Funding Rounds",
    "Funding Amount (M USD)",
    "Valuation (M USD)",
    "Revenue (M USD)",
    "Employees",
    "Market Share (%)",
    "Year Founded",
    "Region",
];

/// Number of model inputs
pub const FEATURE_COUNT: usize = FEATURE_COLUMNS.len();

/// Fixed-order numeric input for the classifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Assemble the vector from a record and its already-encoded categories
    pub fn assemble(record: &StartupRecord, industry_code: usize, region_code: usize) -> Self {
        Self([
            industry_code as f64,
            f64::from(record.funding_rounds),
            record.funding_amount,
            record.valuation,
            record.revenue,
            f64::from(record.employees),
            record.market_share,
            f64::from(record.year_founded),
            region_code as f64,
        ])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Single-row matrix (1 x FEATURE_COUNT)
    pub fn to_matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((1, FEATURE_COUNT), |(_, j)| self.0[j])
    }
}

/// Verify that a model's recorded input columns match [`FEATURE_COLUMNS`]
pub fn check_feature_names(names: &[String]) -> Result<(), PredictionError> {
    if names.len() != FEATURE_COUNT {
        return Err(PredictionError::ModelMismatch(format!(
            "model expects {} features, adapter supplies {}",
            names.len(),
            FEATURE_COUNT
        )));
    }

    for (i, (actual, expected)) in names.iter().zip(FEATURE_COLUMNS.iter()).enumerate() {
        if actual != expected {
            return Err(PredictionError::ModelMismatch(format!(
                "feature {} is '{}', expected '{}'",
                i, actual, expected
            )));
        }
    }

    Ok(())
}
