//! Alert media upload and presigned retrieval handlers.

use std::time::Duration;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;

use vigil_db::{AlertRepo, EventMediaRepo};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const UPLOAD_FOLDER: &str = "uploads";
const PRESIGN_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Serialize)]
pub struct UploadMediaResponse {
    pub key: String,
}

/// POST /api/v1/media
///
/// Multipart upload with a required `file` part and `alert_id` part. The
/// object is stored under `uploads/` with a generated name and attached to
/// the alert as an `event_media` row.
pub async fn upload_media(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadMediaResponse>)> {
    let mut file: Option<(Vec<u8>, String)> = None;
    let mut alert_id: Option<i64> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart request: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;
                file = Some((bytes.to_vec(), content_type));
            }
            Some("alert_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read alert_id: {e}")))?;
                alert_id = Some(
                    text.trim()
                        .parse()
                        .map_err(|_| ApiError::bad_request("alert_id must be an integer"))?,
                );
            }
            _ => {}
        }
    }

    let (data, content_type) = file.ok_or_else(|| ApiError::bad_request("Missing 'file' part"))?;
    let alert_id = alert_id.ok_or_else(|| ApiError::bad_request("Missing 'alert_id' part"))?;
    if data.is_empty() {
        return Err(ApiError::bad_request("Uploaded file is empty"));
    }

    let alert = AlertRepo::find_by_id(&state.pool, alert_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Alert {alert_id} not found")))?;

    let key = state
        .storage
        .upload_media(data, &content_type, UPLOAD_FOLDER)
        .await?;

    let media_type = content_type
        .split('/')
        .next()
        .unwrap_or("video")
        .to_string();
    let mut conn = state.pool.acquire().await?;
    EventMediaRepo::insert_many(&mut *conn, alert.id, std::slice::from_ref(&key), &media_type)
        .await?;

    info!(alert_id = alert.id, key = %key, "Attached media to alert");

    Ok((StatusCode::CREATED, Json(UploadMediaResponse { key })))
}

#[derive(Debug, Serialize)]
pub struct MediaUrlResponse {
    pub url: String,
}

/// GET /api/v1/media/{alert_id}
///
/// Short-lived presigned GET URL for the alert's first media item.
pub async fn get_media_url(
    State(state): State<AppState>,
    Path(alert_id): Path<i64>,
) -> ApiResult<Json<MediaUrlResponse>> {
    let media = EventMediaRepo::first_for_alert(&state.pool, alert_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No media for alert {alert_id}")))?;

    let url = state.storage.presign_get(&media.media_url, PRESIGN_TTL).await?;

    Ok(Json(MediaUrlResponse { url }))
}
