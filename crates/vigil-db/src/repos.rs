//! Repositories for the Vigil tables.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crate::models::{Alert, Camera, EventMedia, NewAlert, User};

/// Column list shared across alert queries to avoid repetition.
const ALERT_COLUMNS: &str = "id, camera_id, event_type, confidence_score, method, \
                             recipient_id, created_at, sent_at, status";

/// Read access to cameras.
pub struct CameraRepo;

impl CameraRepo {
    /// Find a camera by id.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Camera>, sqlx::Error> {
        sqlx::query_as::<_, Camera>(
            "SELECT id, location, stream_url, status FROM cameras WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}

/// Read access to users.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by id.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, role, fcm_token FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// The first user by id, used as the default alert recipient.
    pub async fn first(pool: &PgPool) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, role, fcm_token FROM users ORDER BY id LIMIT 1",
        )
        .fetch_optional(pool)
        .await
    }
}

/// CRUD operations for alerts.
pub struct AlertRepo;

impl AlertRepo {
    /// Insert a new alert with `status = 'pending'`, returning the created
    /// row. Runs inside the caller's transaction so the alert and its media
    /// commit together.
    pub async fn insert(conn: &mut PgConnection, input: &NewAlert) -> Result<Alert, sqlx::Error> {
        let query = format!(
            "INSERT INTO alerts (camera_id, event_type, confidence_score, method, recipient_id, status)
             VALUES ($1, $2, $3, $4, $5, 'pending')
             RETURNING {ALERT_COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(input.camera_id)
            .bind(&input.event_type)
            .bind(input.confidence_score)
            .bind(&input.method)
            .bind(input.recipient_id)
            .fetch_one(conn)
            .await
    }

    /// Record the terminal delivery outcome for an alert.
    pub async fn mark_result(
        pool: &PgPool,
        id: i64,
        status: &str,
        sent_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!(
            "UPDATE alerts SET status = $2, sent_at = $3 WHERE id = $1 RETURNING {ALERT_COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .bind(status)
            .bind(sent_at)
            .fetch_optional(pool)
            .await
    }

    /// Find an alert by id.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!("SELECT {ALERT_COLUMNS} FROM alerts WHERE id = $1");
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the most recent alerts, newest first.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<Alert>, sqlx::Error> {
        let query =
            format!("SELECT {ALERT_COLUMNS} FROM alerts ORDER BY created_at DESC LIMIT $1");
        sqlx::query_as::<_, Alert>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}

/// CRUD operations for alert media.
pub struct EventMediaRepo;

impl EventMediaRepo {
    /// Attach media URLs to an alert inside the caller's transaction.
    pub async fn insert_many(
        conn: &mut PgConnection,
        alert_id: i64,
        urls: &[String],
        media_type: &str,
    ) -> Result<Vec<EventMedia>, sqlx::Error> {
        let mut items = Vec::with_capacity(urls.len());
        for url in urls {
            let item = sqlx::query_as::<_, EventMedia>(
                "INSERT INTO event_media (alert_id, media_url, media_type)
                 VALUES ($1, $2, $3)
                 RETURNING id, alert_id, media_url, media_type",
            )
            .bind(alert_id)
            .bind(url)
            .bind(media_type)
            .fetch_one(&mut *conn)
            .await?;
            items.push(item);
        }
        Ok(items)
    }

    /// List media for an alert in insertion order.
    pub async fn list_for_alert(
        pool: &PgPool,
        alert_id: i64,
    ) -> Result<Vec<EventMedia>, sqlx::Error> {
        sqlx::query_as::<_, EventMedia>(
            "SELECT id, alert_id, media_url, media_type FROM event_media
             WHERE alert_id = $1 ORDER BY id",
        )
        .bind(alert_id)
        .fetch_all(pool)
        .await
    }

    /// First media item for an alert, if any.
    pub async fn first_for_alert(
        pool: &PgPool,
        alert_id: i64,
    ) -> Result<Option<EventMedia>, sqlx::Error> {
        sqlx::query_as::<_, EventMedia>(
            "SELECT id, alert_id, media_url, media_type FROM event_media
             WHERE alert_id = $1 ORDER BY id LIMIT 1",
        )
        .bind(alert_id)
        .fetch_optional(pool)
        .await
    }
}
