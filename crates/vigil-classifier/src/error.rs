//! Error types for classification.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for classifier operations.
pub type ClassifierResult<T> = Result<T, ClassifierError>;

/// Errors that can occur while loading or running the classifier.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Label manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    #[error("Label manifest parse error: {0}")]
    ManifestParse(String),

    #[error("Label manifest is empty")]
    EmptyManifest,

    #[error("Model file not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Model output width {outputs} does not match label manifest size {labels}")]
    LabelCountMismatch { labels: usize, outputs: usize },

    #[error("Inference failed: {0}")]
    Inference(String),
}

impl ClassifierError {
    /// Create an inference failure error.
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference(message.into())
    }
}
