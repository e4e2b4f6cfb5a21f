//! Manual alert trigger and alert listing handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use vigil_db::{AlertRepo, EventMediaRepo};
use vigil_models::AlertCategory;
use vigil_pipeline::ManualAlert;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Request body for an operator-submitted alert.
#[derive(Debug, Deserialize, Validate)]
pub struct TriggerAlertRequest {
    pub camera_id: i64,
    pub event_type: AlertCategory,
    #[validate(range(min = 0.0, max = 1.0, message = "confidence must be within [0, 1]"))]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub media_urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TriggerAlertResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_id: Option<i64>,
    pub status: String,
}

/// POST /api/v1/trigger-alert
///
/// A `normal` event type is accepted but only acknowledged; anything else
/// creates and delivers an alert through the same dispatch path as the
/// detection pipeline.
pub async fn trigger_alert(
    State(state): State<AppState>,
    Json(request): Json<TriggerAlertRequest>,
) -> ApiResult<(StatusCode, Json<TriggerAlertResponse>)> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    info!(
        camera_id = request.camera_id,
        event_type = %request.event_type,
        "Manual alert trigger"
    );

    let alert = state
        .pipeline
        .trigger(ManualAlert {
            camera_id: request.camera_id,
            event_type: request.event_type,
            confidence: request.confidence,
            media_urls: request.media_urls,
        })
        .await?;

    let response = match alert {
        Some(alert) => TriggerAlertResponse {
            alert_id: Some(alert.id),
            status: alert.status.as_str().to_string(),
        },
        None => TriggerAlertResponse {
            alert_id: None,
            status: "acknowledged".to_string(),
        },
    };

    Ok((StatusCode::CREATED, Json(response)))
}

#[derive(Debug, Deserialize)]
pub struct ListAlertsParams {
    pub limit: Option<i64>,
}

/// One media item attached to an alert.
#[derive(Debug, Serialize)]
pub struct MediaView {
    pub media_url: String,
    pub media_type: String,
}

/// An alert with its media, as returned by the listing endpoint.
#[derive(Debug, Serialize)]
pub struct AlertView {
    pub id: i64,
    pub camera_id: i64,
    pub event_type: String,
    pub confidence_score: Option<f32>,
    pub method: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub media: Vec<MediaView>,
}

/// GET /api/v1/alerts
///
/// Recent alerts with their media, newest first.
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(params): Query<ListAlertsParams>,
) -> ApiResult<Json<Vec<AlertView>>> {
    let limit = params.limit.unwrap_or(20).clamp(1, 100);

    let alerts = AlertRepo::list_recent(&state.pool, limit).await?;

    let mut views = Vec::with_capacity(alerts.len());
    for alert in alerts {
        let media = EventMediaRepo::list_for_alert(&state.pool, alert.id).await?;
        views.push(AlertView {
            id: alert.id,
            camera_id: alert.camera_id,
            event_type: alert.event_type,
            confidence_score: alert.confidence_score,
            method: alert.method,
            status: alert.status,
            created_at: alert.created_at,
            sent_at: alert.sent_at,
            media: media
                .into_iter()
                .map(|m| MediaView {
                    media_url: m.media_url,
                    media_type: m.media_type,
                })
                .collect(),
        });
    }

    Ok(Json(views))
}
