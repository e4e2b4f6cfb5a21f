//! Pipeline error taxonomy.

use thiserror::Error;

use crate::store::StoreError;
use vigil_classifier::ClassifierError;
use vigil_media::MediaError;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that can abort a detection or dispatch.
///
/// Client-input errors (bad clip) are distinguished from internal failures
/// (inference, persistence) and configuration errors (missing camera or
/// recipient) so the HTTP layer can map them to distinct status codes.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Inference(#[from] ClassifierError),

    #[error("Camera not found: {0}")]
    CameraNotFound(i64),

    #[error("No user configured to receive alerts")]
    NoRecipientConfigured,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PipelineError {
    /// Whether the caller's input caused this error, as opposed to an
    /// internal or configuration failure.
    pub fn is_client_error(&self) -> bool {
        match self {
            PipelineError::Media(e) => e.is_client_error(),
            _ => false,
        }
    }
}
