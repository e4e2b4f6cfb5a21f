//! Alert dispatch: persist, notify once, record the outcome.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use tracing::{info, warn};

use vigil_models::{AlertCategory, AlertMethod, AlertStatus};
use vigil_notify::{DeliveryOutcome, Notifier};

use crate::error::{PipelineError, PipelineResult};
use crate::store::{AlertRecord, AlertStore, NewAlertRecord, RecipientSelector};

/// Request to create and deliver one alert.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub camera_id: i64,
    pub category: AlertCategory,
    pub confidence: Option<f32>,
    pub media_urls: Vec<String>,
    pub media_type: String,
    pub method: AlertMethod,
}

/// Persists alerts and makes exactly one best-effort delivery attempt.
///
/// Delivery is at-most-once: a failed or rejected push is logged and the
/// alert is marked `failed`, but the dispatch itself still succeeds. The
/// status update is unconditional, so every dispatched alert ends in a
/// terminal state before control returns to the caller.
pub struct AlertDispatcher {
    store: Arc<dyn AlertStore>,
    notifier: Arc<dyn Notifier>,
    recipient: RecipientSelector,
}

impl AlertDispatcher {
    pub fn new(
        store: Arc<dyn AlertStore>,
        notifier: Arc<dyn Notifier>,
        recipient: RecipientSelector,
    ) -> Self {
        Self {
            store,
            notifier,
            recipient,
        }
    }

    /// Create an alert, attempt delivery once, and record the outcome.
    ///
    /// Preconditions: the camera must exist and a recipient must be
    /// configured; both are checked before anything is persisted. `Normal`
    /// never reaches this method; the pipeline short-circuits upstream.
    pub async fn dispatch(&self, request: DispatchRequest) -> PipelineResult<AlertRecord> {
        debug_assert!(
            request.category.is_dispatchable(),
            "Normal must be short-circuited before dispatch"
        );

        let camera = self
            .store
            .get_camera(request.camera_id)
            .await?
            .ok_or(PipelineError::CameraNotFound(request.camera_id))?;

        let recipient = self
            .store
            .get_recipient(&self.recipient)
            .await?
            .ok_or(PipelineError::NoRecipientConfigured)?;

        // Alert row and media commit together; a store failure here
        // persists nothing and propagates to the caller.
        let alert = self
            .store
            .create_alert(NewAlertRecord {
                camera_id: camera.id,
                category: request.category,
                confidence: request.confidence,
                method: request.method,
                recipient_id: recipient.id,
                media_urls: request.media_urls,
                media_type: request.media_type,
            })
            .await?;

        let title = request.category.notification_title();
        let body = match request.confidence {
            Some(confidence) => format!("Camera {} | confidence {:.2}", camera.location, confidence),
            None => String::new(),
        };
        let data = HashMap::from([
            ("alert_id".to_string(), alert.id.to_string()),
            ("camera_id".to_string(), camera.id.to_string()),
            ("event_type".to_string(), request.category.as_str().to_string()),
        ]);

        // Exactly one delivery attempt; rejection and transport errors are
        // equivalent failures and never propagate.
        let token = recipient.fcm_token.as_deref().unwrap_or("");
        let (status, sent_at) = match self.notifier.send(token, &title, &body, &data).await {
            Ok(DeliveryOutcome::Delivered) => (AlertStatus::Sent, Some(Utc::now())),
            Ok(DeliveryOutcome::Rejected) => {
                warn!(alert_id = alert.id, "Notification rejected");
                (AlertStatus::Failed, None)
            }
            Err(e) => {
                warn!(alert_id = alert.id, error = %e, "Notification delivery failed");
                (AlertStatus::Failed, None)
            }
        };

        self.store.mark_result(alert.id, status, sent_at).await?;

        counter!(
            "vigil_alerts_dispatched_total",
            "category" => request.category.as_str(),
            "status" => status.as_str(),
        )
        .increment(1);

        info!(
            alert_id = alert.id,
            camera_id = camera.id,
            category = %request.category,
            status = %status,
            "Alert dispatched"
        );

        Ok(AlertRecord {
            status,
            sent_at,
            ..alert
        })
    }
}
