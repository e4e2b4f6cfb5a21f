//! Persistence seam for the dispatcher.
//!
//! The dispatcher only needs a narrow slice of the database: camera and
//! recipient lookups, transactional alert creation and the terminal status
//! update. [`PgAlertStore`] provides it over Postgres; tests substitute
//! in-memory fakes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use vigil_db::{AlertRepo, CameraRepo, EventMediaRepo, NewAlert, UserRepo};
use vigil_models::{AlertCategory, AlertMethod, AlertStatus};

/// Errors from the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store error: {0}")]
    Internal(String),
}

/// Which user receives alerts.
///
/// Single-recipient delivery is a deliberate simplification; representing
/// the choice as configuration (rather than a hard-coded "first user" query)
/// keeps multi-recipient support an extension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientSelector {
    /// The first user by id.
    Default,
    /// A specific user.
    User(i64),
}

impl RecipientSelector {
    /// Create from the `ALERT_RECIPIENT_USER_ID` environment variable.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var("ALERT_RECIPIENT_USER_ID").ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Self {
        value
            .and_then(|s| s.parse().ok())
            .map(RecipientSelector::User)
            .unwrap_or(RecipientSelector::Default)
    }
}

/// Camera fields the dispatcher needs.
#[derive(Debug, Clone)]
pub struct CameraRecord {
    pub id: i64,
    pub location: String,
}

/// Recipient fields the dispatcher needs.
#[derive(Debug, Clone)]
pub struct RecipientRecord {
    pub id: i64,
    pub fcm_token: Option<String>,
}

/// Insert payload for an alert and its media, committed as one unit.
#[derive(Debug, Clone)]
pub struct NewAlertRecord {
    pub camera_id: i64,
    pub category: AlertCategory,
    pub confidence: Option<f32>,
    pub method: AlertMethod,
    pub recipient_id: i64,
    pub media_urls: Vec<String>,
    pub media_type: String,
}

/// A persisted alert as seen by the pipeline and the API.
#[derive(Debug, Clone, Serialize)]
pub struct AlertRecord {
    pub id: i64,
    pub camera_id: i64,
    pub event_type: String,
    pub confidence_score: Option<f32>,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub recipient_id: Option<i64>,
    pub media_urls: Vec<String>,
}

/// Narrow persistence interface for alert dispatch.
#[async_trait::async_trait]
pub trait AlertStore: Send + Sync {
    /// Look up a camera by id.
    async fn get_camera(&self, id: i64) -> Result<Option<CameraRecord>, StoreError>;

    /// Resolve the configured alert recipient.
    async fn get_recipient(
        &self,
        selector: &RecipientSelector,
    ) -> Result<Option<RecipientRecord>, StoreError>;

    /// Create an alert with `status = pending` and attach its media in one
    /// transaction. A failure here persists nothing.
    async fn create_alert(&self, record: NewAlertRecord) -> Result<AlertRecord, StoreError>;

    /// Record the terminal delivery outcome.
    async fn mark_result(
        &self,
        alert_id: i64,
        status: AlertStatus,
        sent_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError>;
}

/// Postgres-backed alert store.
pub struct PgAlertStore {
    pool: PgPool,
}

impl PgAlertStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AlertStore for PgAlertStore {
    async fn get_camera(&self, id: i64) -> Result<Option<CameraRecord>, StoreError> {
        let camera = CameraRepo::find_by_id(&self.pool, id).await?;
        Ok(camera.map(|c| CameraRecord {
            id: c.id,
            location: c.location,
        }))
    }

    async fn get_recipient(
        &self,
        selector: &RecipientSelector,
    ) -> Result<Option<RecipientRecord>, StoreError> {
        let user = match selector {
            RecipientSelector::Default => UserRepo::first(&self.pool).await?,
            RecipientSelector::User(id) => UserRepo::find_by_id(&self.pool, *id).await?,
        };
        Ok(user.map(|u| RecipientRecord {
            id: u.id,
            fcm_token: u.fcm_token,
        }))
    }

    async fn create_alert(&self, record: NewAlertRecord) -> Result<AlertRecord, StoreError> {
        let mut tx = self.pool.begin().await?;

        let alert = AlertRepo::insert(
            &mut *tx,
            &NewAlert {
                camera_id: record.camera_id,
                event_type: record.category.as_str().to_string(),
                confidence_score: record.confidence,
                method: record.method.as_str().to_string(),
                recipient_id: record.recipient_id,
            },
        )
        .await?;

        let media = if record.media_urls.is_empty() {
            Vec::new()
        } else {
            EventMediaRepo::insert_many(
                &mut *tx,
                alert.id,
                &record.media_urls,
                &record.media_type,
            )
            .await?
        };

        tx.commit().await?;

        let status = AlertStatus::parse(&alert.status)
            .ok_or_else(|| StoreError::Internal(format!("Unknown status: {}", alert.status)))?;

        Ok(AlertRecord {
            id: alert.id,
            camera_id: alert.camera_id,
            event_type: alert.event_type,
            confidence_score: alert.confidence_score,
            status,
            created_at: alert.created_at,
            sent_at: alert.sent_at,
            recipient_id: alert.recipient_id,
            media_urls: media.into_iter().map(|m| m.media_url).collect(),
        })
    }

    async fn mark_result(
        &self,
        alert_id: i64,
        status: AlertStatus,
        sent_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        AlertRepo::mark_result(&self.pool, alert_id, status.as_str(), sent_at).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_selector_parsing() {
        assert_eq!(
            RecipientSelector::from_value(None),
            RecipientSelector::Default
        );
        assert_eq!(
            RecipientSelector::from_value(Some("42")),
            RecipientSelector::User(42)
        );
        assert_eq!(
            RecipientSelector::from_value(Some("not-a-number")),
            RecipientSelector::Default
        );
    }
}
