use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::PredictionError;

/// Earliest founding year the model was trained on
pub const MIN_YEAR_FOUNDED: i32 = 1900;

/// Latest founding year the model was trained on
pub const MAX_YEAR_FOUNDED: i32 = 2025;

/// Attributes of a single startup submitted for prediction
///
/// Monetary amounts are in millions of USD. A record is built per
/// submission and dropped once the prediction has been rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StartupRecord {
    /// Industry label, checked against the industry encoder
    pub industry: String,

    /// Region label, checked against the region encoder
    pub region: String,

    /// Number of funding rounds raised
    pub funding_rounds: u32,

    /// Total funding raised (M USD)
    #[validate(range(min = 0.0))]
    pub funding_amount: f64,

    /// Latest valuation (M USD)
    #[validate(range(min = 0.0))]
    pub valuation: f64,

    /// Annual revenue (M USD)
    #[validate(range(min = 0.0))]
    pub revenue: f64,

    /// Headcount
    #[validate(range(min = 1))]
    pub employees: u32,

    /// Market share in percent
    #[validate(range(min = 0.0, max = 100.0))]
    pub market_share: f64,

    /// Year the company was founded
    #[validate(range(min = 1900, max = 2025))]
    pub year_founded: i32,
}

impl StartupRecord {
    /// Check every numeric field against its declared bounds.
    ///
    /// Categorical labels are left to the encoders.
    ///
    /// Non-finite floats are rejected up front since range checks let NaN through.
    pub fn check(&self) -> Result<(), PredictionError> {
        for (name, value) in [
            ("funding_amount", self.funding_amount),
            ("valuation", self.valuation),
            ("revenue", self.revenue),
            ("market_share", self.market_share),
        ] {
            if !value.is_finite() {
                return Err(PredictionError::InvalidInput(format!(
                    "{} must be a finite number",
                    name
                )));
            }
        }

        self.validate()?;
        Ok(())
    }
}
