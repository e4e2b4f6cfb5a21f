//! Error types for media operations.

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while validating, sampling or decoding a clip.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("Invalid clip: unable to determine FPS or frame count")]
    InvalidMetadata,

    #[error("Clip must be between {min:.0}s and {max:.0}s (received {actual:.2}s)")]
    DurationOutOfRange { min: f64, max: f64, actual: f64 },

    #[error("Clip does not contain enough frames")]
    InsufficientFrames,

    #[error("Unable to decode frames from the clip")]
    DecodeFailure,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Whether this error was caused by the submitted clip rather than by
    /// the host environment.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MediaError::InvalidMetadata
                | MediaError::DurationOutOfRange { .. }
                | MediaError::InsufficientFrames
                | MediaError::DecodeFailure
                | MediaError::InvalidVideo(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_error_message_carries_bounds_and_actual() {
        let err = MediaError::DurationOutOfRange {
            min: 5.0,
            max: 10.0,
            actual: 2.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("5s"));
        assert!(msg.contains("10s"));
        assert!(msg.contains("2.00s"));
    }

    #[test]
    fn test_client_error_classification() {
        assert!(MediaError::InvalidMetadata.is_client_error());
        assert!(MediaError::DecodeFailure.is_client_error());
        assert!(!MediaError::FfmpegNotFound.is_client_error());
        assert!(!MediaError::Timeout(30).is_client_error());
    }
}
