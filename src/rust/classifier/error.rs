use std::path::PathBuf;

use crate::schema::FeatureField;

/// Represents the different types of errors that can occur while rating an employee.
///
/// Every variant is recoverable: the dispatcher reports it and returns to idle.
#[derive(Debug, thiserror::Error)]
pub enum RatingError {
    /// The model artifact is missing, unreadable or not a valid model
    #[error("Model artifact unavailable at {}: {reason}", .path.display())]
    ArtifactNotFound { path: PathBuf, reason: String },
    /// A form field was not supplied
    #[error("Missing value for field '{0}'")]
    MissingField(FeatureField),
    /// The feature vector length differs from the model's input arity
    #[error("Feature mismatch: Model expects {expected} features, but received {actual}.")]
    FeatureMismatch { expected: usize, actual: usize },
    /// The classifier failed while running
    #[error("Inference error: {0}")]
    Inference(String),
    /// The classifier produced a class outside its training output space
    #[error("Internal error: model returned unknown class index {0}")]
    UnknownClass(i64),
}

impl RatingError {
    pub(crate) fn artifact(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ArtifactNotFound {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
