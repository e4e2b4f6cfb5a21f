//! Database row types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A registered user. The first user by id doubles as the default alert
/// recipient in single-tenant deployments.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub fcm_token: Option<String>,
}

/// A surveillance camera.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Camera {
    pub id: i64,
    pub location: String,
    pub stream_url: String,
    pub status: String,
}

/// A persisted alert row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Alert {
    pub id: i64,
    pub camera_id: i64,
    pub event_type: String,
    pub confidence_score: Option<f32>,
    pub method: Option<String>,
    pub recipient_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub status: String,
}

/// Insert payload for an alert. Status is always `pending` at insert; the
/// terminal update happens through `AlertRepo::mark_result`.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub camera_id: i64,
    pub event_type: String,
    pub confidence_score: Option<f32>,
    pub method: String,
    pub recipient_id: i64,
}

/// A media object attached to an alert. Owned by exactly one alert and
/// cascade-deleted with it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventMedia {
    pub id: i64,
    pub alert_id: i64,
    pub media_url: String,
    pub media_type: String,
}
