//! Clip detection handler.

use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use vigil_models::{AlertCategory, AlertStatus};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Camera the clip came from can also be passed as a query parameter.
#[derive(Debug, Deserialize)]
pub struct DetectParams {
    pub camera_id: Option<i64>,
}

/// Persisted-alert summary included when the clip produced one.
#[derive(Debug, Serialize)]
pub struct AlertSummary {
    pub alert_id: i64,
    pub status: AlertStatus,
}

/// Response for a classified clip.
#[derive(Debug, Serialize)]
pub struct DetectResponse {
    /// Raw model label
    pub prediction: String,
    pub alert_category: AlertCategory,
    pub confidence: f32,
    pub clip_duration_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<AlertSummary>,
}

/// POST /api/v1/detect
///
/// Accepts a multipart form with a required `video` file part and an
/// optional `camera_id` text part (query parameter also accepted; the form
/// part wins). Runs the clip through validation, sampling and the
/// classifier, dispatching an alert for non-normal categories.
pub async fn detect(
    State(state): State<AppState>,
    Query(params): Query<DetectParams>,
    mut multipart: Multipart,
) -> ApiResult<Json<DetectResponse>> {
    let mut video: Option<Vec<u8>> = None;
    let mut form_camera_id: Option<i64> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart request: {e}")))?
    {
        match field.name() {
            Some("video") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read video: {e}")))?;
                video = Some(bytes.to_vec());
            }
            Some("camera_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read camera_id: {e}")))?;
                form_camera_id = Some(
                    text.trim()
                        .parse()
                        .map_err(|_| ApiError::bad_request("camera_id must be an integer"))?,
                );
            }
            _ => {}
        }
    }

    let video = video.ok_or_else(|| ApiError::bad_request("Missing 'video' file part"))?;
    if video.is_empty() {
        return Err(ApiError::bad_request("Uploaded video is empty"));
    }
    let camera_id = form_camera_id.or(params.camera_id).unwrap_or(1);

    info!(camera_id, bytes = video.len(), "Received clip for detection");

    let detection = state.pipeline.detect(&video, camera_id).await?;

    Ok(Json(DetectResponse {
        prediction: detection.prediction.label,
        alert_category: detection.category,
        confidence: detection.prediction.confidence,
        clip_duration_seconds: detection.clip.duration_rounded(),
        alert: detection.alert.map(|a| AlertSummary {
            alert_id: a.id,
            status: a.status,
        }),
    }))
}
