//! Startup profitability predictor.
//!
//! Serves a single-form web UI and a JSON API that encode a startup's
//! attributes, run them through a pre-trained binary classifier and report
//! whether the startup is predicted to be profitable, with a probability.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod ml;
pub mod models;

pub use error::{AppError, PredictionError, Result};
