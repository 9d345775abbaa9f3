//! Displayable failures of the prediction pipeline
//!
//! None of these abort the process; each one degrades a single dashboard
//! section and is rendered as a message.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DashboardError {
    /// Model artifact missing or corrupt at startup
    #[error("Error loading model {}: {reason}", .path.display())]
    ModelLoadFailure { path: PathBuf, reason: String },

    /// Prediction requested but no model was loaded
    #[error("Model not loaded. Prediction features are disabled")]
    ModelUnavailable,

    /// The model failed while predicting
    #[error("Prediction error: {0}")]
    InferenceError(String),

    /// Historical log could not be used
    #[error("Could not read traffic log {}: {reason}", .path.display())]
    LogReadFailure { path: PathBuf, reason: String },

    #[error("Model {model} does not expose feature importances")]
    ImportancesUnavailable { model: String },

    #[error("Model reported {got} feature importances, expected {expected}")]
    ImportanceLengthMismatch { got: usize, expected: usize },

    #[error("Invalid labeled data: {0}")]
    InvalidLabeledData(String),
}

pub type DashboardResult<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_displayable() {
        let err = DashboardError::ModelLoadFailure {
            path: PathBuf::from("models/best_model.onnx"),
            reason: "file not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Error loading model models/best_model.onnx: file not found"
        );

        let err = DashboardError::InferenceError("shape mismatch".to_string());
        assert_eq!(err.to_string(), "Prediction error: shape mismatch");
    }
}
