use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors raised while turning a startup record into a prediction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    /// Categorical label outside the encoder's vocabulary
    #[error("Unknown {field} category: '{label}'")]
    UnknownCategory { field: String, label: String },

    /// Numeric field missing, unparsable or out of bounds
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Failure inside the classifier call
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// Encoders, feature layout and model disagree
    #[error("Model mismatch: {0}")]
    ModelMismatch(String),
}

impl PredictionError {
    /// Short machine-readable kind, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            PredictionError::UnknownCategory { .. } => "unknown_category",
            PredictionError::InvalidInput(_) => "invalid_input",
            PredictionError::Classifier(_) => "classifier",
            PredictionError::ModelMismatch(_) => "model_mismatch",
        }
    }

    pub fn unknown_category(field: impl Into<String>, label: impl Into<String>) -> Self {
        PredictionError::UnknownCategory {
            field: field.into(),
            label: label.into(),
        }
    }
}

/// Conversion from validator::ValidationErrors, one readable line per field
impl From<validator::ValidationErrors> for PredictionError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = err.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);

        let messages: Vec<String> = fields
            .into_iter()
            .flat_map(|(field, errors)| errors.iter().map(move |e| describe_violation(field, e)))
            .collect();

        PredictionError::InvalidInput(messages.join("; "))
    }
}

fn describe_violation(field: &str, error: &validator::ValidationError) -> String {
    match (error.params.get("min"), error.params.get("max")) {
        (Some(min), Some(max)) => format!("{} must be between {} and {}", field, min, max),
        (Some(min), None) => format!("{} must be at least {}", field, min),
        (None, Some(max)) => format!("{} must be at most {}", field, max),
        (None, None) => format!("{} is invalid ({})", field, error.code),
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Prediction errors
    #[error(transparent)]
    Prediction(#[from] PredictionError),

    /// Model artifact could not be loaded
    #[error("Model load error ({path}): {message}")]
    ModelLoad { path: String, message: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AppError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Prediction(PredictionError::UnknownCategory { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Prediction(PredictionError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            AppError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ModelLoad { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            AppError::Prediction(PredictionError::UnknownCategory { .. }) => "UNKNOWN_CATEGORY",
            AppError::Prediction(PredictionError::InvalidInput(_)) => "INVALID_INPUT",
            AppError::Prediction(PredictionError::Classifier(_)) => "CLASSIFIER_ERROR",
            AppError::Prediction(PredictionError::ModelMismatch(_)) => "MODEL_MISMATCH",
            AppError::ModelLoad { .. } => "MODEL_LOAD_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    pub fn model_load(path: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::ModelLoad {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Convert AppError to HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(
                error_code = error_code,
                status_code = status.as_u16(),
                message = %message,
                "Request error"
            );
        } else {
            tracing::warn!(
                error_code = error_code,
                status_code = status.as_u16(),
                message = %message,
                "Request rejected"
            );
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}

/// Conversion from config::ConfigError
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::from(PredictionError::unknown_category("industry", "Mining")).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::from(PredictionError::InvalidInput("x".to_string())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(PredictionError::Classifier("x".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::model_load("models/x.json", "missing").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::from(PredictionError::unknown_category("region", "Mars")).error_code(),
            "UNKNOWN_CATEGORY"
        );
        assert_eq!(
            AppError::from(PredictionError::ModelMismatch("x".to_string())).error_code(),
            "MODEL_MISMATCH"
        );
        assert_eq!(
            AppError::Configuration("missing port".to_string()).error_code(),
            "CONFIGURATION_ERROR"
        );
    }

    #[test]
    fn test_prediction_error_message() {
        let err = PredictionError::unknown_category("industry", "Mining");
        assert_eq!(err.to_string(), "Unknown industry category: 'Mining'");
        assert_eq!(err.kind(), "unknown_category");
    }

    #[test]
    fn test_validation_errors_are_readable() {
        let mut errors = validator::ValidationErrors::new();
        let mut year = validator::ValidationError::new("range");
        year.add_param("min".into(), &1900);
        year.add_param("max".into(), &2025);
        year.add_param("value".into(), &1850);
        errors.add("year_founded", year);
        let mut employees = validator::ValidationError::new("range");
        employees.add_param("min".into(), &1);
        errors.add("employees", employees);

        let err = PredictionError::from(errors);
        assert_eq!(
            err,
            PredictionError::InvalidInput(
                "employees must be at least 1; year_founded must be between 1900 and 2025"
                    .to_string()
            )
        );
    }
}
