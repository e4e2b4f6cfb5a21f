//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use vigil_pipeline::PipelineError;
use vigil_storage::StorageError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(e) => match e {
                _ if e.is_client_error() => StatusCode::BAD_REQUEST,
                PipelineError::CameraNotFound(_) => StatusCode::NOT_FOUND,
                PipelineError::NoRecipientConfigured => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) | ApiError::Storage(_) | ApiError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR
            && std::env::var("ENVIRONMENT").unwrap_or_default() == "production"
        {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_media::MediaError;

    #[test]
    fn test_status_mapping() {
        let invalid_clip = ApiError::Pipeline(PipelineError::Media(
            MediaError::DurationOutOfRange {
                min: 5.0,
                max: 10.0,
                actual: 2.3,
            },
        ));
        assert_eq!(invalid_clip.status_code(), StatusCode::BAD_REQUEST);

        let missing_camera = ApiError::Pipeline(PipelineError::CameraNotFound(9));
        assert_eq!(missing_camera.status_code(), StatusCode::NOT_FOUND);

        let no_recipient = ApiError::Pipeline(PipelineError::NoRecipientConfigured);
        assert_eq!(no_recipient.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let ffmpeg_missing =
            ApiError::Pipeline(PipelineError::Media(MediaError::FfmpegNotFound));
        assert_eq!(ffmpeg_missing.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
